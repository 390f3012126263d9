use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use rstest::rstest;
use uuid::Uuid;

use tutormatch_api::middleware::{auth::caller_from_headers, error_handling::AppError};
use tutormatch_core::{errors::MatchError, models::identity::Role};

#[rstest]
#[case::not_found(MatchError::NotFound("tutor".into()), StatusCode::NOT_FOUND)]
#[case::invalid_input(MatchError::InvalidInput("bad slot".into()), StatusCode::BAD_REQUEST)]
#[case::slot_conflict(MatchError::SlotConflict("taken".into()), StatusCode::CONFLICT)]
#[case::invalid_transition(MatchError::InvalidTransition("matched".into()), StatusCode::CONFLICT)]
#[case::authentication(MatchError::Authentication("no header".into()), StatusCode::UNAUTHORIZED)]
#[case::forbidden(MatchError::Forbidden("not yours".into()), StatusCode::FORBIDDEN)]
#[case::database(MatchError::Database(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: MatchError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_internal_error_is_500() {
    let error = MatchError::Internal(Box::new(std::io::Error::other("Internal error")));
    assert_eq!(AppError(error).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(*name, HeaderValue::from_str(value).unwrap());
    }
    headers
}

#[test]
fn test_caller_from_headers() {
    let id = Uuid::new_v4();
    let caller = caller_from_headers(&headers(&[
        ("x-user-id", &id.to_string()),
        ("x-user-role", "Tutor"),
    ]))
    .unwrap();
    assert_eq!(caller.id, id);
    assert_eq!(caller.role, Role::Tutor);
}

#[rstest]
#[case::missing_everything(&[])]
#[case::missing_role(&[("x-user-id", "8f14e45f-ceea-467f-a0e6-0e8b6f4d1c2a")])]
#[case::bad_uuid(&[("x-user-id", "42"), ("x-user-role", "student")])]
#[case::unknown_role(&[("x-user-id", "8f14e45f-ceea-467f-a0e6-0e8b6f4d1c2a"), ("x-user-role", "admin")])]
fn test_missing_or_bad_identity_is_rejected(#[case] pairs: &[(&'static str, &str)]) {
    let err = caller_from_headers(&headers(pairs)).unwrap_err();
    assert!(matches!(err, MatchError::Authentication(_)));
}
