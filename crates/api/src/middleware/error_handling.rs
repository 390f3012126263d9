//! # Error Handling Middleware
//!
//! Maps [`MatchError`] to HTTP status codes and a JSON body of the form
//! `{"error": "<message>"}`, so every handler reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error, warn};

use tutormatch_core::errors::MatchError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use tutormatch_api::middleware::error_handling::AppError;
/// use tutormatch_core::errors::MatchError;
///
/// async fn handler(subject: String) -> Result<Json<String>, AppError> {
///     if subject.is_empty() {
///         return Err(AppError(MatchError::InvalidInput("subject is required".into())));
///     }
///     Ok(Json(subject))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub MatchError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MatchError::SlotConflict(_) | MatchError::InvalidTransition(_) => StatusCode::CONFLICT,
            MatchError::Authentication(_) => StatusCode::UNAUTHORIZED,
            MatchError::Forbidden(_) => StatusCode::FORBIDDEN,
            MatchError::Database(_) | MatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {:?}", self.0);
        } else if self.0.is_caller_error() {
            debug!(%status, "request rejected: {}", self.0);
        } else {
            warn!(%status, "request refused: {}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Allows `?` on `MatchResult` inside handlers.
impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError(err)
    }
}

/// Infrastructure failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MatchError::Database(err))
    }
}
