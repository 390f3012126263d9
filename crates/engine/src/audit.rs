//! Bookkeeping for one automatic-match attempt: what has been persisted so far, so the
//! escalation path never writes a second registration or skips the audit entry.

use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use tutormatch_core::{
    MatchResult,
    models::{
        match_log::MatchAttemptLog,
        registration::{PriorityLevel, Registration, RegistrationStatus, RegistrationType},
        time_slot::RequestedSlot,
    },
};

use tutormatch_db::EnrollOutcome;

use crate::MatchEngine;

#[derive(Debug)]
pub struct AutoAttempt {
    pub registration_id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub requested: Vec<RequestedSlot>,
    pub description: Option<String>,
    pub priority_level: PriorityLevel,
    started: Instant,
    registration_saved: bool,
    attempt_logged: bool,
}

impl AutoAttempt {
    pub fn new(
        student_id: Uuid,
        subject: impl Into<String>,
        requested: Vec<RequestedSlot>,
        description: Option<String>,
        priority_level: PriorityLevel,
    ) -> Self {
        Self {
            registration_id: Uuid::new_v4(),
            student_id,
            subject: subject.into(),
            requested,
            description,
            priority_level,
            started: Instant::now(),
            registration_saved: false,
            attempt_logged: false,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn registration_saved(&self) -> bool {
        self.registration_saved
    }

    pub fn attempt_logged(&self) -> bool {
        self.attempt_logged
    }

    /// Registration skeleton carrying the request fields; the caller sets the outcome.
    pub fn registration(
        &self,
        registration_type: RegistrationType,
        status: RegistrationStatus,
    ) -> Registration {
        let mut registration = Registration::new(
            self.registration_id,
            self.student_id,
            self.subject.clone(),
            registration_type,
            status,
        );
        registration.preferred_time_slots = self.requested.clone();
        registration.description = self.description.clone();
        registration.priority_level = self.priority_level;
        registration.processing_time_ms = self.elapsed_ms();
        registration
    }
}

impl MatchEngine {
    pub(crate) async fn save_attempt_registration(
        &self,
        attempt: &mut AutoAttempt,
        registration: &Registration,
    ) -> MatchResult<()> {
        self.store.insert_registration(registration).await?;
        attempt.registration_saved = true;
        debug!(registration_id = %registration.id, status = %registration.status, "registration saved");
        Ok(())
    }

    /// Seats the student and saves `registration` together. Only an `Enrolled` outcome
    /// counts as a saved registration.
    pub(crate) async fn enroll_attempt(
        &self,
        attempt: &mut AutoAttempt,
        session_id: Uuid,
        registration: &Registration,
    ) -> MatchResult<EnrollOutcome> {
        let outcome = self.store.enroll_and_register(session_id, registration).await?;
        if matches!(outcome, EnrollOutcome::Enrolled(_)) {
            attempt.registration_saved = true;
            debug!(registration_id = %registration.id, %session_id, "enrolled with registration saved");
        }
        Ok(outcome)
    }

    pub(crate) async fn log_attempt(&self, attempt: &mut AutoAttempt, log: MatchAttemptLog) -> MatchResult<()> {
        self.store.append_match_log(&log).await?;
        attempt.attempt_logged = true;
        debug!(success = log.success, score = log.match_score, "match attempt logged");
        Ok(())
    }
}
