use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    registration::{PriorityLevel, Registration},
    schedule::{TutorAvailability, TutorBookedSlots},
    session::Session,
    time_slot::{RequestedSlot, SlotBooking, TimeOfDay},
    tutor::Tutor,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTutorsQuery {
    pub subject: Option<String>,
    pub min_rating: Option<f64>,
    pub day_of_week: Option<Weekday>,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorListing {
    pub id: Uuid,
    pub name: String,
    pub expertise: Vec<String>,
    pub rating: f64,
    pub active_students: u32,
    pub availability: TutorAvailability,
}

impl From<&Tutor> for TutorListing {
    fn from(tutor: &Tutor) -> Self {
        Self {
            id: tutor.id,
            name: tutor.name.clone(),
            expertise: tutor.expertise.iter().cloned().collect(),
            rating: tutor.rating,
            active_students: tutor.active_students,
            availability: tutor.availability.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTutorsResponse {
    pub tutors: Vec<TutorListing>,
    pub pagination: Pagination,
}

/// Manual match body. The student id comes from the authenticated caller, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManualMatchRequest {
    pub tutor_id: Uuid,
    pub subject: String,
    pub selected_slot: SlotBooking,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoMatchRequest {
    pub subject: String,
    pub available_time_slots: Vec<RequestedSlot>,
    pub description: Option<String>,
    pub priority_level: Option<PriorityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchedParty {
    Tutor {
        tutor_id: Uuid,
        name: String,
        rating: f64,
    },
    Session {
        session_id: Uuid,
        tutor_id: Uuid,
        subject: String,
        enrolled: u32,
        capacity: u32,
    },
}

impl From<&Tutor> for MatchedParty {
    fn from(tutor: &Tutor) -> Self {
        MatchedParty::Tutor {
            tutor_id: tutor.id,
            name: tutor.name.clone(),
            rating: tutor.rating,
        }
    }
}

impl From<&Session> for MatchedParty {
    fn from(session: &Session) -> Self {
        MatchedParty::Session {
            session_id: session.id,
            tutor_id: session.tutor_id,
            subject: session.subject.clone(),
            enrolled: session.enrolled(),
            capacity: session.capacity,
        }
    }
}

/// `matched` is present iff the registration is `Matched`; a `CoordinatorReview`
/// registration means the request was queued for a human.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoMatchResponse {
    pub registration: Registration,
    pub matched: Option<MatchedParty>,
    pub match_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyRequest {
    #[serde(flatten)]
    pub registration: Registration,
    pub status_color: String,
}

impl From<Registration> for MyRequest {
    fn from(registration: Registration) -> Self {
        let status_color = registration.status.color().to_string();
        Self {
            registration,
            status_color,
        }
    }
}

/// Unvalidated window from a request body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotInput {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub slots: Vec<SlotInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorAvailabilityResponse {
    pub tutor_id: Uuid,
    pub availability: TutorAvailability,
    pub booked_slots: TutorBookedSlots,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub registration: Registration,
    pub session: Session,
}
