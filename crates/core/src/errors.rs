use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl MatchError {
    /// Caller-side errors are detected before any write happens.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            MatchError::NotFound(_)
                | MatchError::InvalidInput(_)
                | MatchError::Authentication(_)
                | MatchError::Forbidden(_)
        )
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
