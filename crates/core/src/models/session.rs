use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use uuid::Uuid;

use super::schedule::DaySchedule;
use super::subject_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Rescheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Rescheduled => "rescheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "rescheduled" => Ok(SessionStatus::Rescheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// A group session owned by one tutor. `students.len() <= capacity` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub subject: String,
    pub tutor_id: Uuid,
    pub capacity: u32,
    pub students: BTreeSet<Uuid>,
    pub schedule: DaySchedule,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn enrolled(&self) -> u32 {
        self.students.len() as u32
    }

    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled())
    }

    /// Case-insensitive substring match of the requested subject against the session subject.
    pub fn covers_subject(&self, subject: &str) -> bool {
        let wanted = subject_key(subject);
        !wanted.is_empty() && subject_key(&self.subject).contains(&wanted)
    }

    /// Whether `student` could join right now: scheduled, a free seat, not already a member.
    pub fn accepts(&self, student: Uuid) -> bool {
        self.status == SessionStatus::Scheduled
            && self.seats_left() > 0
            && !self.students.contains(&student)
    }

    /// Capacity-guarded roster push. Returns false and leaves the roster untouched when refused.
    pub fn enroll(&mut self, student: Uuid) -> bool {
        if !self.accepts(student) {
            return false;
        }
        self.students.insert(student)
    }
}
