use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::schedule::{TutorAvailability, TutorBookedSlots};
use super::subject_key;

/// Tutor profile as read by the matcher. Profile CRUD lives elsewhere; only the
/// booking engine writes `booked_slots` and `active_students`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: Uuid,
    pub name: String,
    pub expertise: BTreeSet<String>,
    /// 0.0 to 5.0
    pub rating: f64,
    pub active_students: u32,
    #[serde(default)]
    pub availability: TutorAvailability,
    #[serde(default)]
    pub booked_slots: TutorBookedSlots,
}

impl Tutor {
    /// Expertise match is case-insensitive but otherwise exact.
    pub fn teaches(&self, subject: &str) -> bool {
        let wanted = subject_key(subject);
        self.expertise.iter().any(|topic| subject_key(topic) == wanted)
    }
}
