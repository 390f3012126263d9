//! In-process store for tests and single-node demos.
//!
//! All state sits behind one [`RwLock`]. Each trait method takes the lock once, works on
//! cloned values and writes them back only when every step succeeded, which gives the same
//! all-or-nothing behaviour as a database transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use tutormatch_core::{
    MatchError, MatchResult,
    booking::{self, SessionPlan},
    models::{
        match_log::MatchAttemptLog,
        registration::Registration,
        session::{Session, SessionStatus},
        time_slot::TimeSlot, tutor::Tutor,
    },
};

use crate::store::{Confirmation, EnrollOutcome, EnrollRefusal, MatchStore, TutorFilter};

#[derive(Debug, Default)]
struct MemoryState {
    tutors: HashMap<Uuid, Tutor>,
    sessions: HashMap<Uuid, Session>,
    registrations: HashMap<Uuid, Registration>,
    match_logs: Vec<MatchAttemptLog>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with tutors and sessions.
    pub fn with_fixtures(
        tutors: impl IntoIterator<Item = Tutor>,
        sessions: impl IntoIterator<Item = Session>,
    ) -> Self {
        let state = MemoryState {
            tutors: tutors.into_iter().map(|tutor| (tutor.id, tutor)).collect(),
            sessions: sessions.into_iter().map(|session| (session.id, session)).collect(),
            ..MemoryState::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }
}

fn sort_tutors(tutors: &mut [Tutor]) {
    tutors.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn save_tutor(&self, tutor: &Tutor) -> MatchResult<()> {
        self.state.write().await.tutors.insert(tutor.id, tutor.clone());
        Ok(())
    }

    async fn get_tutor(&self, id: Uuid) -> MatchResult<Option<Tutor>> {
        Ok(self.state.read().await.tutors.get(&id).cloned())
    }

    async fn find_tutors(&self, filter: &TutorFilter) -> MatchResult<Vec<Tutor>> {
        let state = self.state.read().await;
        let mut tutors: Vec<Tutor> = state
            .tutors
            .values()
            .filter(|tutor| filter.matches(tutor))
            .cloned()
            .collect();
        sort_tutors(&mut tutors);
        Ok(tutors)
    }

    async fn replace_tutor_availability(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    ) -> MatchResult<Tutor> {
        let mut state = self.state.write().await;
        let tutor = state
            .tutors
            .get_mut(&tutor_id)
            .ok_or_else(|| MatchError::NotFound(format!("tutor {tutor_id}")))?;
        tutor.availability.replace_day(date, slots)?;
        Ok(tutor.clone())
    }

    async fn save_session(&self, session: &Session) -> MatchResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> MatchResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(&id).cloned())
    }

    async fn open_sessions(&self, subject: &str) -> MatchResult<Vec<Session>> {
        let state = self.state.read().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|session| {
                session.covers_subject(subject)
                    && session.seats_left() > 0
                    && session.status == SessionStatus::Scheduled
            })
            .cloned()
            .collect();
        sessions.sort_by_key(|session| session.id);
        Ok(sessions)
    }

    async fn enroll_and_register(
        &self,
        session_id: Uuid,
        registration: &Registration,
    ) -> MatchResult<EnrollOutcome> {
        let mut state = self.state.write().await;
        if state.registrations.contains_key(&registration.id) {
            return Err(MatchError::InvalidInput(format!(
                "registration {} already exists",
                registration.id
            )));
        }
        let student_id = registration.student_id;
        let Some(session) = state.sessions.get_mut(&session_id) else {
            return Ok(EnrollOutcome::Refused(EnrollRefusal::Missing));
        };
        if !session.enroll(student_id) {
            return Ok(EnrollOutcome::Refused(EnrollRefusal::diagnose(
                Some(&*session),
                student_id,
            )));
        }
        let enrolled = session.clone();
        state
            .registrations
            .insert(registration.id, registration.clone());
        Ok(EnrollOutcome::Enrolled(enrolled))
    }

    async fn insert_registration(&self, registration: &Registration) -> MatchResult<()> {
        let mut state = self.state.write().await;
        if state.registrations.contains_key(&registration.id) {
            return Err(MatchError::InvalidInput(format!(
                "registration {} already exists",
                registration.id
            )));
        }
        state
            .registrations
            .insert(registration.id, registration.clone());
        Ok(())
    }

    async fn get_registration(&self, id: Uuid) -> MatchResult<Option<Registration>> {
        Ok(self.state.read().await.registrations.get(&id).cloned())
    }

    async fn registrations_for_student(&self, student_id: Uuid) -> MatchResult<Vec<Registration>> {
        let state = self.state.read().await;
        let mut registrations: Vec<Registration> = state
            .registrations
            .values()
            .filter(|registration| registration.student_id == student_id)
            .cloned()
            .collect();
        registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(registrations)
    }

    async fn place_manual_hold(&self, registration: &Registration) -> MatchResult<()> {
        let tutor_id = registration
            .tutor_id
            .ok_or_else(|| MatchError::InvalidInput("manual request has no tutor".to_string()))?;

        let mut state = self.state.write().await;
        let mut tutor = state
            .tutors
            .get(&tutor_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(format!("tutor {tutor_id}")))?;
        booking::apply_manual_hold(&mut tutor, registration)?;

        state.tutors.insert(tutor.id, tutor);
        state
            .registrations
            .insert(registration.id, registration.clone());
        Ok(())
    }

    async fn confirm_manual(&self, registration_id: Uuid, plan: SessionPlan) -> MatchResult<Confirmation> {
        let mut state = self.state.write().await;

        let mut registration = state
            .registrations
            .get(&registration_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(format!("registration {registration_id}")))?;
        let tutor_id = registration.tutor_id.ok_or_else(|| {
            MatchError::InvalidTransition(format!("registration {registration_id} has no tutor"))
        })?;
        let mut tutor = state
            .tutors
            .get(&tutor_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(format!("tutor {tutor_id}")))?;

        let tutor_sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|session| session.tutor_id == tutor_id)
            .cloned()
            .collect();
        let existing = booking::extendable_session(&tutor_sessions, &registration).cloned();

        let session = booking::apply_confirmation(&mut registration, &mut tutor, existing, &plan)?;

        state.sessions.insert(session.id, session.clone());
        state.tutors.insert(tutor.id, tutor.clone());
        state.registrations.insert(registration.id, registration.clone());

        Ok(Confirmation {
            registration,
            session,
            tutor,
        })
    }

    async fn reject_registration(&self, registration_id: Uuid) -> MatchResult<Registration> {
        let mut state = self.state.write().await;

        let mut registration = state
            .registrations
            .get(&registration_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(format!("registration {registration_id}")))?;
        let mut tutor = registration
            .tutor_id
            .and_then(|tutor_id| state.tutors.get(&tutor_id).cloned());

        booking::apply_rejection(&mut registration, tutor.as_mut())?;

        if let Some(tutor) = tutor {
            state.tutors.insert(tutor.id, tutor);
        }
        state.registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn append_match_log(&self, log: &MatchAttemptLog) -> MatchResult<()> {
        self.state.write().await.match_logs.push(log.clone());
        Ok(())
    }

    async fn match_logs(&self) -> MatchResult<Vec<MatchAttemptLog>> {
        Ok(self.state.read().await.match_logs.clone())
    }
}
