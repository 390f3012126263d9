use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

use tutormatch_core::{
    MatchResult,
    booking::SessionPlan,
    models::{
        match_log::MatchAttemptLog, registration::Registration, session::Session,
        time_slot::TimeSlot, tutor::Tutor,
    },
};

use crate::store::{Confirmation, EnrollOutcome, MatchStore, TutorFilter};

// Mock store for exercising failure paths in callers
mock! {
    pub Store {}

    #[async_trait]
    impl MatchStore for Store {
        async fn save_tutor(&self, tutor: &Tutor) -> MatchResult<()>;
        async fn get_tutor(&self, id: Uuid) -> MatchResult<Option<Tutor>>;
        async fn find_tutors(&self, filter: &TutorFilter) -> MatchResult<Vec<Tutor>>;
        async fn replace_tutor_availability(
            &self,
            tutor_id: Uuid,
            date: NaiveDate,
            slots: Vec<TimeSlot>,
        ) -> MatchResult<Tutor>;
        async fn save_session(&self, session: &Session) -> MatchResult<()>;
        async fn get_session(&self, id: Uuid) -> MatchResult<Option<Session>>;
        async fn open_sessions(&self, subject: &str) -> MatchResult<Vec<Session>>;
        async fn enroll_and_register(
            &self,
            session_id: Uuid,
            registration: &Registration,
        ) -> MatchResult<EnrollOutcome>;
        async fn insert_registration(&self, registration: &Registration) -> MatchResult<()>;
        async fn get_registration(&self, id: Uuid) -> MatchResult<Option<Registration>>;
        async fn registrations_for_student(&self, student_id: Uuid) -> MatchResult<Vec<Registration>>;
        async fn place_manual_hold(&self, registration: &Registration) -> MatchResult<()>;
        async fn confirm_manual(&self, registration_id: Uuid, plan: SessionPlan) -> MatchResult<Confirmation>;
        async fn reject_registration(&self, registration_id: Uuid) -> MatchResult<Registration>;
        async fn append_match_log(&self, log: &MatchAttemptLog) -> MatchResult<()>;
        async fn match_logs(&self) -> MatchResult<Vec<MatchAttemptLog>>;
    }
}
