//! # Authentication Module
//!
//! Authentication itself happens upstream. The identity provider in front of this service
//! forwards the verified caller as two headers, `x-user-id` and `x-user-role`, and
//! [`CallerIdentity`] turns them into a [`Caller`]. A request without a usable identity is
//! rejected with 401; no default caller is ever substituted.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use tutormatch_core::{
    MatchError,
    models::identity::{Caller, Role},
};

use super::error_handling::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor for the authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Caller);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, MatchError> {
    headers
        .get(name)
        .ok_or_else(|| MatchError::Authentication(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| MatchError::Authentication(format!("{name} header is not valid text")))
}

/// Reads the caller from the forwarded identity headers.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, MatchError> {
    let id = header(headers, USER_ID_HEADER)?;
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| MatchError::Authentication(format!("{USER_ID_HEADER} is not a UUID")))?;
    let role: Role = header(headers, USER_ROLE_HEADER)?
        .parse()
        .map_err(MatchError::Authentication)?;
    Ok(Caller::new(id, role))
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CallerIdentity(caller_from_headers(&parts.headers)?))
    }
}
