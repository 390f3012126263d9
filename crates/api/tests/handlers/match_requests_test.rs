use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use tutormatch_core::{
    models::identity::{Caller, Role},
    notify::NotificationKind,
};
use tutormatch_db::MatchStore;

use crate::test_utils::*;

fn student() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Student)
}

#[test_log::test(tokio::test)]
async fn test_manual_request_confirm_flow() {
    let ada = tutor("Ada", 4.8, &["Calculus"], monday(), "08:00", "12:00");
    let ada_caller = Caller::new(ada.id, Role::Tutor);
    let mut ctx = TestContext::new(vec![ada.clone()], vec![]);
    let first = student();

    let body = json!({
        "tutor_id": ada.id,
        "subject": "Calculus",
        "selected_slot": { "date": "2025-12-01", "start": "09:00", "end": "10:00" },
        "description": "integration by parts",
    });
    let (status, created) = ctx
        .send(post_json("/api/match-requests/manual", Some(first), body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");

    // the same window is now held for the first student
    let (status, conflict) = ctx
        .send(post_json("/api/match-requests/manual", Some(student()), body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(conflict["error"].as_str().unwrap().starts_with("Slot conflict"));

    let registration_id = created["id"].as_str().unwrap().to_string();
    let confirm_uri = format!("/api/match-requests/{registration_id}/confirm");

    let (status, _) = ctx.send(post_json(&confirm_uri, Some(first), json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, confirmed) = ctx
        .send(post_json(&confirm_uri, Some(ada_caller), json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["registration"]["status"], "matched");
    assert_eq!(confirmed["session"]["tutor_id"], ada.id.to_string());

    let (status, _) = ctx
        .send(post_json(&confirm_uri, Some(ada_caller), json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let kinds: Vec<_> = ctx.queue.drain_pending().into_iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::ManualRequestReceived, NotificationKind::MatchConfirmed]
    );
}

#[tokio::test]
async fn test_manual_request_rejected_by_coordinator() {
    let ada = tutor("Ada", 4.8, &["Calculus"], monday(), "08:00", "12:00");
    let ctx = TestContext::new(vec![ada.clone()], vec![]);

    let (_, created) = ctx
        .send(post_json(
            "/api/match-requests/manual",
            Some(student()),
            json!({
                "tutor_id": ada.id,
                "subject": "Calculus",
                "selected_slot": { "date": "2025-12-01", "start": "10:00", "end": "11:00" },
            }),
        ))
        .await;
    let reject_uri = format!("/api/match-requests/{}/reject", created["id"].as_str().unwrap());

    let coordinator = Caller::new(Uuid::new_v4(), Role::Coordinator);
    let (status, rejected) = ctx.send(post_json(&reject_uri, Some(coordinator), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");

    let tutor = ctx.store.get_tutor(ada.id).await.unwrap().unwrap();
    assert!(tutor.booked_slots.slots_on(monday()).is_empty());
}

#[tokio::test]
async fn test_auto_match_enrolls_in_session() {
    let ada = tutor("Ada", 4.8, &["Calculus"], friday(), "08:00", "12:00");
    let group = session(ada.id, "Calculus", friday(), "09:00", "11:00", 10);
    let ctx = TestContext::new(vec![ada], vec![group.clone()]);
    let caller = student();

    let (status, body) = ctx
        .send(post_json(
            "/api/match-requests/auto",
            Some(caller),
            json!({
                "subject": "Calculus",
                "available_time_slots": [{ "day_of_week": "Fri", "start": "09:00", "end": "10:00" }],
                "priority_level": "urgent",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registration"]["registration_type"], "auto_session_enrollment");
    assert_eq!(body["matched"]["kind"], "session");
    assert_eq!(body["matched"]["session_id"], group.id.to_string());

    let (status, mine) = ctx.send(get("/api/match-requests/mine", Some(caller))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["status_color"], "green");
    assert_eq!(mine[0]["priority_level"], "urgent");
}

#[tokio::test]
async fn test_auto_match_without_candidates_is_queued() {
    let ctx = TestContext::new(vec![], vec![]);

    let (status, body) = ctx
        .send(post_json(
            "/api/match-requests/auto",
            Some(student()),
            json!({
                "subject": "Latin",
                "available_time_slots": [{ "day_of_week": "Mon", "start": "09:00", "end": "10:00" }],
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registration"]["status"], "coordinator_review");
    assert_eq!(body["matched"], serde_json::Value::Null);
    assert_eq!(body["match_score"], 0);
}

#[tokio::test]
async fn test_auto_match_rejects_malformed_requests() {
    let ctx = TestContext::new(vec![], vec![]);

    let (status, _) = ctx
        .send(post_json(
            "/api/match-requests/auto",
            Some(student()),
            json!({ "subject": "Latin", "available_time_slots": [] }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(post_json(
            "/api/match-requests/auto",
            None,
            json!({ "subject": "Latin", "available_time_slots": [] }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
