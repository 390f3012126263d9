//! The persistence boundary of the matcher.
//!
//! Every method is one atomic unit against the backing store. Methods that mutate a tutor's
//! booked calendar or a session roster re-check the relevant invariant at write time, so
//! callers may decide on stale snapshots and still never double-book.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use uuid::Uuid;

use tutormatch_core::{
    MatchResult,
    booking::SessionPlan,
    models::{
        match_log::MatchAttemptLog, registration::Registration, session::Session,
        time_slot::TimeSlot, tutor::Tutor,
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TutorFilter {
    pub subject: Option<String>,
    pub min_rating: Option<f64>,
}

impl TutorFilter {
    pub fn matches(&self, tutor: &Tutor) -> bool {
        self.subject.as_deref().is_none_or(|subject| tutor.teaches(subject))
            && self.min_rating.is_none_or(|min| tutor.rating >= min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollRefusal {
    Missing,
    NotScheduled,
    Full,
    AlreadyEnrolled,
}

impl EnrollRefusal {
    /// Why `student` could not be added to `session` (or to a session that no longer exists).
    pub fn diagnose(session: Option<&Session>, student: Uuid) -> Self {
        match session {
            None => EnrollRefusal::Missing,
            Some(session) if session.students.contains(&student) => EnrollRefusal::AlreadyEnrolled,
            Some(session) if session.seats_left() == 0 => EnrollRefusal::Full,
            Some(_) => EnrollRefusal::NotScheduled,
        }
    }
}

impl fmt::Display for EnrollRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            EnrollRefusal::Missing => "session no longer exists",
            EnrollRefusal::NotScheduled => "session is no longer scheduled",
            EnrollRefusal::Full => "session is full",
            EnrollRefusal::AlreadyEnrolled => "student is already enrolled",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrollOutcome {
    Enrolled(Session),
    Refused(EnrollRefusal),
}

/// Everything a confirmation committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub registration: Registration,
    pub session: Session,
    pub tutor: Tutor,
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn save_tutor(&self, tutor: &Tutor) -> MatchResult<()>;

    async fn get_tutor(&self, id: Uuid) -> MatchResult<Option<Tutor>>;

    /// Ordered by rating descending, then id ascending.
    async fn find_tutors(&self, filter: &TutorFilter) -> MatchResult<Vec<Tutor>>;

    /// Replaces one date of the tutor's availability. `NotFound` for an unknown tutor,
    /// `InvalidInput` when the slots overlap each other.
    async fn replace_tutor_availability(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    ) -> MatchResult<Tutor>;

    async fn save_session(&self, session: &Session) -> MatchResult<()>;

    async fn get_session(&self, id: Uuid) -> MatchResult<Option<Session>>;

    /// Scheduled sessions with a free seat whose subject contains `subject`.
    async fn open_sessions(&self, subject: &str) -> MatchResult<Vec<Session>>;

    /// Adds the registration's student to the session and inserts the registration in one
    /// transaction. The push happens iff the session is still scheduled, has a seat and does
    /// not already list the student, checked at write time; on refusal or error nothing is
    /// written.
    async fn enroll_and_register(
        &self,
        session_id: Uuid,
        registration: &Registration,
    ) -> MatchResult<EnrollOutcome>;

    async fn insert_registration(&self, registration: &Registration) -> MatchResult<()>;

    async fn get_registration(&self, id: Uuid) -> MatchResult<Option<Registration>>;

    /// Newest first.
    async fn registrations_for_student(&self, student_id: Uuid) -> MatchResult<Vec<Registration>>;

    /// Inserts a pending manual registration and places its hold on the tutor's booked
    /// calendar in one transaction. `NotFound` for an unknown tutor, `SlotConflict` when the
    /// slot collides with an existing booking; nothing is written in either case.
    async fn place_manual_hold(&self, registration: &Registration) -> MatchResult<()>;

    /// Pending manual registration to `Matched`, together with its session and booking.
    async fn confirm_manual(&self, registration_id: Uuid, plan: SessionPlan) -> MatchResult<Confirmation>;

    /// Moves the registration to `Rejected` and releases its hold.
    async fn reject_registration(&self, registration_id: Uuid) -> MatchResult<Registration>;

    async fn append_match_log(&self, log: &MatchAttemptLog) -> MatchResult<()>;

    async fn match_logs(&self) -> MatchResult<Vec<MatchAttemptLog>>;
}
