use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::errors::{MatchError, MatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Tutor,
    Coordinator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Coordinator => "coordinator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            "coordinator" => Ok(Role::Coordinator),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Authenticated caller as vouched for by the identity provider. Never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn require(&self, role: Role) -> MatchResult<()> {
        if self.role != role {
            return Err(MatchError::Forbidden(format!(
                "{} {} cannot perform an action reserved for the {} role",
                self.role, self.id, role
            )));
        }
        Ok(())
    }

    /// The given user themselves, or any coordinator.
    pub fn require_self_or_coordinator(&self, user_id: Uuid) -> MatchResult<()> {
        if self.id == user_id || self.role == Role::Coordinator {
            return Ok(());
        }
        Err(MatchError::Forbidden(format!(
            "{} {} cannot act on behalf of {}",
            self.role, self.id, user_id
        )))
    }
}
