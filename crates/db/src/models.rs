use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use tutormatch_core::models::{
    match_log::{CandidateScore, MatchAttemptLog},
    registration::Registration,
    schedule::{DaySchedule, TutorAvailability, TutorBookedSlots},
    session::Session,
    time_slot::{RequestedSlot, SlotBooking},
    tutor::Tutor,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTutor {
    pub id: Uuid,
    pub name: String,
    pub expertise: Vec<String>,
    pub rating: f64,
    pub active_students: i32,
    pub availability: Json<TutorAvailability>,
    pub booked_slots: Json<TutorBookedSlots>,
}

impl From<DbTutor> for Tutor {
    fn from(row: DbTutor) -> Self {
        Tutor {
            id: row.id,
            name: row.name,
            expertise: row.expertise.into_iter().collect(),
            rating: row.rating,
            active_students: row.active_students.max(0) as u32,
            availability: row.availability.0,
            booked_slots: row.booked_slots.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub subject: String,
    pub tutor_id: Uuid,
    pub capacity: i32,
    pub students: Vec<Uuid>,
    pub schedule: Json<DaySchedule>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbSession> for Session {
    type Error = eyre::Report;

    fn try_from(row: DbSession) -> Result<Self> {
        Ok(Session {
            id: row.id,
            subject: row.subject,
            tutor_id: row.tutor_id,
            capacity: row.capacity.max(0) as u32,
            students: row.students.into_iter().collect(),
            schedule: row.schedule.0,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRegistration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub subject: String,
    pub preferred_time_slots: Json<Vec<RequestedSlot>>,
    pub requested_slot: Option<Json<SlotBooking>>,
    pub description: Option<String>,
    pub priority_level: String,
    pub status: String,
    pub registration_type: String,
    pub match_score: i32,
    pub processing_time_ms: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRegistration> for Registration {
    type Error = eyre::Report;

    fn try_from(row: DbRegistration) -> Result<Self> {
        Ok(Registration {
            id: row.id,
            student_id: row.student_id,
            tutor_id: row.tutor_id,
            session_id: row.session_id,
            subject: row.subject,
            preferred_time_slots: row.preferred_time_slots.0,
            requested_slot: row.requested_slot.map(|slot| slot.0),
            description: row.description,
            priority_level: row.priority_level.parse().map_err(|e: String| eyre!(e))?,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            registration_type: row.registration_type.parse().map_err(|e: String| eyre!(e))?,
            match_score: row.match_score.max(0) as u32,
            processing_time_ms: row.processing_time_ms.max(0) as u64,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMatchAttemptLog {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
    pub match_score: i32,
    pub processing_time_ms: i64,
    pub failure_reason: Option<String>,
    pub candidate_tutors: Json<Vec<CandidateScore>>,
    pub selected_tutor_id: Option<Uuid>,
}

impl From<DbMatchAttemptLog> for MatchAttemptLog {
    fn from(row: DbMatchAttemptLog) -> Self {
        MatchAttemptLog {
            id: row.id,
            registration_id: row.registration_id,
            attempted_at: row.attempted_at,
            success: row.success,
            match_score: row.match_score.max(0) as u32,
            processing_time_ms: row.processing_time_ms.max(0) as u64,
            failure_reason: row.failure_reason,
            candidate_tutors: row.candidate_tutors.0,
            selected_tutor_id: row.selected_tutor_id,
        }
    }
}

/// Saturating conversion for counters stored in INTEGER columns.
pub(crate) fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
