use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tutormatch_api::{ApiState, build_router};
use tutormatch_core::models::{
    identity::Caller,
    schedule::DaySchedule,
    session::{Session, SessionStatus},
    time_slot::TimeSlot,
    tutor::Tutor,
};
use tutormatch_db::{MatchStore, MemoryStore};
use tutormatch_engine::{EngineConfig, MatchEngine, NotificationQueue, Notifier};

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub queue: NotificationQueue,
}

impl TestContext {
    pub fn new(tutors: Vec<Tutor>, sessions: Vec<Session>) -> Self {
        let store = Arc::new(MemoryStore::with_fixtures(tutors, sessions));
        let (notifier, queue) = Notifier::channel();
        let shared: Arc<dyn MatchStore> = store.clone();
        let engine = Arc::new(MatchEngine::new(shared, notifier, EngineConfig::default()));
        let app = build_router(Arc::new(ApiState { engine }));
        Self { app, store, queue }
    }

    /// Sends one request through the router and returns the status with the parsed body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

pub fn get(uri: &str, caller: Option<Caller>) -> Request<Body> {
    with_caller(Request::get(uri), caller).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, caller: Option<Caller>, body: Value) -> Request<Body> {
    with_caller(Request::post(uri), caller)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn put_json(uri: &str, caller: Option<Caller>, body: Value) -> Request<Body> {
    with_caller(Request::put(uri), caller)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_caller(builder: axum::http::request::Builder, caller: Option<Caller>) -> axum::http::request::Builder {
    match caller {
        Some(caller) => builder
            .header("x-user-id", caller.id.to_string())
            .header("x-user-role", caller.role.as_str()),
        None => builder,
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

pub fn tutor(name: &str, rating: f64, subjects: &[&str], date: NaiveDate, start: &str, end: &str) -> Tutor {
    Tutor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        expertise: subjects.iter().map(|s| s.to_string()).collect(),
        rating,
        active_students: 0,
        availability: [(date, TimeSlot::parse(start, end).unwrap())].into_iter().collect(),
        booked_slots: Default::default(),
    }
}

pub fn session(tutor_id: Uuid, subject: &str, date: NaiveDate, start: &str, end: &str, capacity: u32) -> Session {
    let schedule: DaySchedule = [(date, TimeSlot::parse(start, end).unwrap())].into_iter().collect();
    Session {
        id: Uuid::new_v4(),
        subject: subject.to_string(),
        tutor_id,
        capacity,
        students: Default::default(),
        schedule,
        status: SessionStatus::Scheduled,
        created_at: Utc::now(),
    }
}
