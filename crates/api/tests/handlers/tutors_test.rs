use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use tutormatch_core::models::identity::{Caller, Role};

use crate::test_utils::*;

#[tokio::test]
async fn test_list_tutors_with_filters() {
    let ada = tutor("Ada", 4.8, &["Calculus"], friday(), "08:00", "12:00");
    let grace = tutor("Grace", 4.1, &["Calculus"], monday(), "08:00", "12:00");
    let marie = tutor("Marie", 5.0, &["Chemistry"], friday(), "08:00", "12:00");
    let ctx = TestContext::new(vec![ada, grace, marie], vec![]);

    let (status, body) = ctx.send(get("/api/tutors?subject=calculus", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["tutors"][0]["name"], "Ada");
    assert_eq!(body["tutors"][1]["name"], "Grace");

    let (status, body) = ctx
        .send(get("/api/tutors?day_of_week=Fri&start=09:00&end=10:00&limit=1", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["tutors"][0]["name"], "Marie");

    let (status, _) = ctx.send(get("/api/tutors?page=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tutor_updates_own_availability() {
    let ada = tutor("Ada", 4.8, &["Calculus"], friday(), "08:00", "12:00");
    let ada_caller = Caller::new(ada.id, Role::Tutor);
    let ctx = TestContext::new(vec![ada.clone()], vec![]);
    let uri = format!("/api/tutors/{}/availability/2025-12-01", ada.id);

    let (status, body) = ctx
        .send(put_json(
            &uri,
            Some(ada_caller),
            json!({ "slots": [{ "start": "13:00", "end": "15:00" }] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tutor_id"], ada.id.to_string());

    let (status, body) = ctx
        .send(get(&format!("/api/tutors/{}/availability", ada.id), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["availability"].to_string().contains("13:00"));

    let stranger = Caller::new(Uuid::new_v4(), Role::Tutor);
    let (status, _) = ctx
        .send(put_json(&uri, Some(stranger), json!({ "slots": [] })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(put_json(&uri, None, json!({ "slots": [] }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send(put_json(
            &uri,
            Some(ada_caller),
            json!({ "slots": [{ "start": "13:15", "end": "15:00" }] }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_tutor_availability_is_404() {
    let ctx = TestContext::new(vec![], vec![]);
    let (status, body) = ctx
        .send(get(&format!("/api/tutors/{}/availability", Uuid::new_v4()), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Resource not found"));
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new(vec![], vec![]);
    let (status, body) = ctx.send(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = ctx.send(get("/version", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
