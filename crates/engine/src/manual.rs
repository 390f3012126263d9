use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use tutormatch_core::{
    MatchError, MatchResult,
    booking::SessionPlan,
    models::{
        identity::{Caller, Role},
        matching::CreateManualMatchRequest,
        registration::{Registration, RegistrationStatus, RegistrationType},
    },
    notify::{NotificationKind, Recipient},
};
use tutormatch_db::Confirmation;

use crate::MatchEngine;

pub(crate) fn required_subject(subject: &str) -> MatchResult<&str> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(MatchError::InvalidInput("subject is required".to_string()));
    }
    Ok(subject)
}

impl MatchEngine {
    /// Student picks a tutor and a dated window. The request is held against the tutor's
    /// calendar until the tutor confirms or someone rejects it.
    #[instrument(skip(self, request), fields(student_id = %caller.id, tutor_id = %request.tutor_id))]
    pub async fn create_manual_request(
        &self,
        caller: &Caller,
        request: CreateManualMatchRequest,
    ) -> MatchResult<Registration> {
        caller.require(Role::Student)?;
        let subject = required_subject(&request.subject)?;
        let slot = request.selected_slot;
        let window = slot.window()?;
        self.config.calendar.check_bounds(&window)?;

        let tutor = self
            .store
            .get_tutor(request.tutor_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("tutor {}", request.tutor_id)))?;
        if !tutor.teaches(subject) {
            return Err(MatchError::InvalidInput(format!(
                "tutor {} does not teach '{subject}'",
                tutor.id
            )));
        }

        let mut registration = Registration::new(
            Uuid::new_v4(),
            caller.id,
            subject,
            RegistrationType::Manual,
            RegistrationStatus::Pending,
        );
        registration.tutor_id = Some(tutor.id);
        registration.requested_slot = Some(slot);
        registration.preferred_time_slots = vec![slot.as_requested()];
        registration.description = request.description;

        self.store.place_manual_hold(&registration).await?;
        info!(registration_id = %registration.id, "manual request placed on {} {window}", slot.date);

        self.notifier.notify(
            NotificationKind::ManualRequestReceived,
            Recipient::Tutor(tutor.id),
            json!({
                "registration_id": registration.id,
                "student_id": caller.id,
                "subject": registration.subject,
                "date": slot.date,
                "start": slot.start,
                "end": slot.end,
            }),
        );

        Ok(registration)
    }

    /// Only the tutor the request was addressed to may confirm it.
    #[instrument(skip(self), fields(tutor_id = %caller.id))]
    pub async fn confirm_manual_request(
        &self,
        caller: &Caller,
        registration_id: Uuid,
    ) -> MatchResult<Confirmation> {
        caller.require(Role::Tutor)?;
        let registration = self.load_registration(registration_id).await?;
        if registration.tutor_id != Some(caller.id) {
            return Err(MatchError::Forbidden(format!(
                "registration {registration_id} is not addressed to tutor {}",
                caller.id
            )));
        }

        let plan = SessionPlan {
            new_session_id: Uuid::new_v4(),
            capacity: self.config.session_capacity,
        };
        let confirmation = self.store.confirm_manual(registration_id, plan).await?;
        info!(
            session_id = %confirmation.session.id,
            enrolled = confirmation.session.enrolled(),
            "manual request confirmed"
        );

        self.notifier.notify(
            NotificationKind::MatchConfirmed,
            Recipient::Student(confirmation.registration.student_id),
            json!({
                "registration_id": registration_id,
                "tutor_id": caller.id,
                "session_id": confirmation.session.id,
            }),
        );

        Ok(confirmation)
    }

    /// The addressed tutor or any coordinator may reject. Rejecting releases the hold.
    #[instrument(skip(self), fields(caller_id = %caller.id, role = %caller.role))]
    pub async fn reject_request(&self, caller: &Caller, registration_id: Uuid) -> MatchResult<Registration> {
        let registration = self.load_registration(registration_id).await?;
        let allowed = match caller.role {
            Role::Coordinator => true,
            Role::Tutor => registration.tutor_id == Some(caller.id),
            Role::Student => false,
        };
        if !allowed {
            return Err(MatchError::Forbidden(format!(
                "{} {} cannot reject registration {registration_id}",
                caller.role, caller.id
            )));
        }

        let rejected = self.store.reject_registration(registration_id).await?;
        info!("registration rejected");

        self.notifier.notify(
            NotificationKind::MatchRejected,
            Recipient::Student(rejected.student_id),
            json!({
                "registration_id": registration_id,
                "rejected_by": caller.role,
            }),
        );

        Ok(rejected)
    }

    async fn load_registration(&self, registration_id: Uuid) -> MatchResult<Registration> {
        self.store
            .get_registration(registration_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("registration {registration_id}")))
    }
}
