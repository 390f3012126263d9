#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc, Weekday};
use eyre::eyre;
use uuid::Uuid;

use tutormatch_core::{
    MatchError, MatchResult,
    booking::SessionPlan,
    models::{
        identity::{Caller, Role},
        match_log::MatchAttemptLog,
        registration::Registration,
        schedule::DaySchedule,
        session::{Session, SessionStatus},
        time_slot::{RequestedSlot, TimeSlot},
        tutor::Tutor,
    },
    notify::{Notification, NotificationKind},
};
use tutormatch_db::{Confirmation, EnrollOutcome, MatchStore, MemoryStore, TutorFilter};
use tutormatch_engine::{EngineConfig, MatchEngine, NotificationQueue, Notifier};

pub struct Harness {
    pub engine: Arc<MatchEngine>,
    pub store: Arc<MemoryStore>,
    pub queue: NotificationQueue,
}

impl Harness {
    pub fn new(tutors: Vec<Tutor>, sessions: Vec<Session>) -> Self {
        let store = Arc::new(MemoryStore::with_fixtures(tutors, sessions));
        let (notifier, queue) = Notifier::channel();
        let shared: Arc<dyn MatchStore> = store.clone();
        let engine = Arc::new(MatchEngine::new(shared, notifier, EngineConfig::default()));
        Self { engine, store, queue }
    }

    /// Engine writing through `shared`, with `store` as the state the assertions read.
    pub fn over(store: Arc<MemoryStore>, shared: Arc<dyn MatchStore>) -> Self {
        let (notifier, queue) = Notifier::channel();
        let engine = Arc::new(MatchEngine::new(shared, notifier, EngineConfig::default()));
        Self { engine, store, queue }
    }

    pub fn notifications(&mut self) -> Vec<Notification> {
        self.queue.drain_pending()
    }

    pub fn notification_kinds(&mut self) -> Vec<NotificationKind> {
        self.notifications().into_iter().map(|n| n.kind).collect()
    }
}

/// 2025-11-28, a Friday.
pub fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
}

/// 2025-12-01, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

pub fn window(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

pub fn student() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Student)
}

pub fn coordinator() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Coordinator)
}

pub fn tutor_caller(tutor: &Tutor) -> Caller {
    Caller::new(tutor.id, Role::Tutor)
}

pub fn tutor(name: &str, rating: f64, active_students: u32, subjects: &[&str]) -> Tutor {
    Tutor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        expertise: subjects.iter().map(|s| s.to_string()).collect(),
        rating,
        active_students,
        availability: Default::default(),
        booked_slots: Default::default(),
    }
}

pub fn available_on(mut tutor: Tutor, date: NaiveDate, slot: TimeSlot) -> Tutor {
    tutor.availability.try_insert(date, slot).unwrap();
    tutor
}

pub fn session(tutor_id: Uuid, subject: &str, date: NaiveDate, slot: TimeSlot, capacity: u32, enrolled: usize) -> Session {
    let schedule: DaySchedule = [(date, slot)].into_iter().collect();
    Session {
        id: Uuid::new_v4(),
        subject: subject.to_string(),
        tutor_id,
        capacity,
        students: (0..enrolled).map(|_| Uuid::new_v4()).collect(),
        schedule,
        status: SessionStatus::Scheduled,
        created_at: Utc::now(),
    }
}

pub fn requested(day_of_week: Weekday, start: &str, end: &str) -> RequestedSlot {
    RequestedSlot {
        day_of_week,
        start: start.parse().unwrap(),
        end: end.parse().unwrap(),
    }
}

/// A [`MemoryStore`] whose session enrollment and audit writes can be made to fail or stall.
pub struct FaultyStore {
    pub inner: Arc<MemoryStore>,
    pub enrollment_fails: bool,
    pub failing_log_writes: AtomicUsize,
    pub log_delay: Option<Duration>,
}

impl FaultyStore {
    pub fn over(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            enrollment_fails: false,
            failing_log_writes: AtomicUsize::new(0),
            log_delay: None,
        }
    }
}

#[async_trait]
impl MatchStore for FaultyStore {
    async fn save_tutor(&self, tutor: &Tutor) -> MatchResult<()> {
        self.inner.save_tutor(tutor).await
    }

    async fn get_tutor(&self, id: Uuid) -> MatchResult<Option<Tutor>> {
        self.inner.get_tutor(id).await
    }

    async fn find_tutors(&self, filter: &TutorFilter) -> MatchResult<Vec<Tutor>> {
        self.inner.find_tutors(filter).await
    }

    async fn replace_tutor_availability(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
    ) -> MatchResult<Tutor> {
        self.inner.replace_tutor_availability(tutor_id, date, slots).await
    }

    async fn save_session(&self, session: &Session) -> MatchResult<()> {
        self.inner.save_session(session).await
    }

    async fn get_session(&self, id: Uuid) -> MatchResult<Option<Session>> {
        self.inner.get_session(id).await
    }

    async fn open_sessions(&self, subject: &str) -> MatchResult<Vec<Session>> {
        self.inner.open_sessions(subject).await
    }

    async fn enroll_and_register(
        &self,
        session_id: Uuid,
        registration: &Registration,
    ) -> MatchResult<EnrollOutcome> {
        if self.enrollment_fails {
            return Err(MatchError::Database(eyre!("connection reset")));
        }
        self.inner.enroll_and_register(session_id, registration).await
    }

    async fn insert_registration(&self, registration: &Registration) -> MatchResult<()> {
        self.inner.insert_registration(registration).await
    }

    async fn get_registration(&self, id: Uuid) -> MatchResult<Option<Registration>> {
        self.inner.get_registration(id).await
    }

    async fn registrations_for_student(&self, student_id: Uuid) -> MatchResult<Vec<Registration>> {
        self.inner.registrations_for_student(student_id).await
    }

    async fn place_manual_hold(&self, registration: &Registration) -> MatchResult<()> {
        self.inner.place_manual_hold(registration).await
    }

    async fn confirm_manual(&self, registration_id: Uuid, plan: SessionPlan) -> MatchResult<Confirmation> {
        self.inner.confirm_manual(registration_id, plan).await
    }

    async fn reject_registration(&self, registration_id: Uuid) -> MatchResult<Registration> {
        self.inner.reject_registration(registration_id).await
    }

    async fn append_match_log(&self, log: &MatchAttemptLog) -> MatchResult<()> {
        if let Some(delay) = self.log_delay {
            tokio::time::sleep(delay).await;
        }
        let fail = self
            .failing_log_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if fail {
            return Err(MatchError::Database(eyre!("connection reset")));
        }
        self.inner.append_match_log(log).await
    }

    async fn match_logs(&self) -> MatchResult<Vec<MatchAttemptLog>> {
        self.inner.match_logs().await
    }
}
