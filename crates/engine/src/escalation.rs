use serde_json::json;
use tracing::error;

use tutormatch_core::{
    MatchError,
    models::{
        match_log::MatchAttemptLog,
        registration::{RegistrationStatus, RegistrationType},
    },
    notify::{NotificationKind, Recipient},
};

use crate::{MatchEngine, audit::AutoAttempt};

impl MatchEngine {
    /// Best-effort recovery after the automatic pipeline failed: make sure the attempt left
    /// exactly one registration and an audit entry, and tell the coordinators why. Recovery
    /// writes that fail are logged and swallowed; the caller re-raises `err`.
    pub(crate) async fn escalate_failure(&self, attempt: &AutoAttempt, err: &MatchError) {
        error!(
            registration_id = %attempt.registration_id,
            student_id = %attempt.student_id,
            "automatic match failed, escalating to coordinators: {err}"
        );
        let reason = err.to_string();

        if !attempt.registration_saved() {
            let registration = attempt.registration(
                RegistrationType::Auto,
                RegistrationStatus::CoordinatorReview,
            );
            if let Err(write_err) = self.store.insert_registration(&registration).await {
                error!(
                    registration_id = %attempt.registration_id,
                    "recovery registration could not be saved: {write_err}"
                );
            }
        }

        if !attempt.attempt_logged() {
            let log = MatchAttemptLog::failed(
                attempt.registration_id,
                0,
                attempt.elapsed_ms(),
                reason.clone(),
                Vec::new(),
            );
            if let Err(write_err) = self.store.append_match_log(&log).await {
                error!(
                    registration_id = %attempt.registration_id,
                    "failed attempt could not be logged: {write_err}"
                );
            }
        }

        self.notifier.notify(
            NotificationKind::MatchFailed,
            Recipient::Coordinators,
            json!({
                "registration_id": attempt.registration_id,
                "student_id": attempt.student_id,
                "subject": attempt.subject,
                "priority_level": attempt.priority_level,
                "reason": reason,
            }),
        );
    }
}
