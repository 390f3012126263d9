use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ManualRequestReceived,
    MatchConfirmed,
    MatchRejected,
    SessionEnrolled,
    TutorMatched,
    CoordinatorReview,
    MatchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Student(Uuid),
    Tutor(Uuid),
    Coordinators,
}

/// Fire-and-forget message for the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: Recipient,
    pub payload: Value,
}

impl Notification {
    pub fn new(kind: NotificationKind, recipient: Recipient, payload: Value) -> Self {
        Self {
            kind,
            recipient,
            payload,
        }
    }
}
