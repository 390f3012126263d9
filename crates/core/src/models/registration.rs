use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::time_slot::{RequestedSlot, SlotBooking};
use crate::errors::{MatchError, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Matched,
    Rejected,
    CoordinatorReview,
}

impl RegistrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Matched => "matched",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::CoordinatorReview => "coordinator_review",
        }
    }

    /// Transitions only move forward. `CoordinatorReview` still allows the human decision.
    pub fn can_transition_to(self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, next),
            (Pending, Matched | Rejected | CoordinatorReview) | (CoordinatorReview, Matched | Rejected)
        )
    }

    /// Display hint returned with a student's own requests.
    pub fn color(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "yellow",
            RegistrationStatus::Matched => "green",
            RegistrationStatus::Rejected => "red",
            RegistrationStatus::CoordinatorReview => "orange",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "matched" => Ok(RegistrationStatus::Matched),
            "rejected" => Ok(RegistrationStatus::Rejected),
            "coordinator_review" => Ok(RegistrationStatus::CoordinatorReview),
            other => Err(format!("unknown registration status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    Manual,
    Auto,
    AutoSessionEnrollment,
}

impl RegistrationType {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationType::Manual => "manual",
            RegistrationType::Auto => "auto",
            RegistrationType::AutoSessionEnrollment => "auto_session_enrollment",
        }
    }
}

impl FromStr for RegistrationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(RegistrationType::Manual),
            "auto" => Ok(RegistrationType::Auto),
            "auto_session_enrollment" => Ok(RegistrationType::AutoSessionEnrollment),
            other => Err(format!("unknown registration type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl PriorityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityLevel::Low => "low",
            PriorityLevel::Normal => "normal",
            PriorityLevel::High => "high",
            PriorityLevel::Urgent => "urgent",
        }
    }
}

impl FromStr for PriorityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(PriorityLevel::Low),
            "normal" => Ok(PriorityLevel::Normal),
            "high" => Ok(PriorityLevel::High),
            "urgent" => Ok(PriorityLevel::Urgent),
            other => Err(format!("unknown priority level '{other}'")),
        }
    }
}

/// One match attempt: created once, then only moved forward through its status machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub subject: String,
    pub preferred_time_slots: Vec<RequestedSlot>,
    pub requested_slot: Option<SlotBooking>,
    pub description: Option<String>,
    pub priority_level: PriorityLevel,
    pub status: RegistrationStatus,
    pub registration_type: RegistrationType,
    pub match_score: u32,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        id: Uuid,
        student_id: Uuid,
        subject: impl Into<String>,
        registration_type: RegistrationType,
        status: RegistrationStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            student_id,
            tutor_id: None,
            session_id: None,
            subject: subject.into(),
            preferred_time_slots: Vec::new(),
            requested_slot: None,
            description: None,
            priority_level: PriorityLevel::default(),
            status,
            registration_type,
            match_score: 0,
            processing_time_ms: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, next: RegistrationStatus) -> MatchResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(MatchError::InvalidTransition(format!(
                "registration {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
