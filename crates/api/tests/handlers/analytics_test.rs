use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use tutormatch_core::models::identity::{Caller, Role};

use crate::test_utils::*;

#[tokio::test]
async fn test_analytics_are_coordinator_only() {
    let ada = tutor("Ada", 4.8, &["Calculus"], friday(), "08:00", "12:00");
    let ctx = TestContext::new(vec![ada], vec![]);
    let student = Caller::new(Uuid::new_v4(), Role::Student);

    for subject in ["Calculus", "Latin"] {
        let (status, _) = ctx
            .send(post_json(
                "/api/match-requests/auto",
                Some(student),
                json!({
                    "subject": subject,
                    "available_time_slots": [{ "day_of_week": "Fri", "start": "09:00", "end": "10:00" }],
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = ctx.send(get("/api/analytics/matching", Some(student))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let coordinator = Caller::new(Uuid::new_v4(), Role::Coordinator);
    let (status, body) = ctx.send(get("/api/analytics/matching", Some(coordinator))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_attempts"], 2);
    assert_eq!(body["successful_attempts"], 1);
    assert_eq!(body["success_rate"], 0.5);
}
