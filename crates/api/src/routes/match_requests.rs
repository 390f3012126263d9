use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/match-requests/manual",
            post(handlers::match_requests::create_manual),
        )
        .route(
            "/api/match-requests/auto",
            post(handlers::match_requests::create_auto),
        )
        .route(
            "/api/match-requests/mine",
            get(handlers::match_requests::my_requests),
        )
        .route(
            "/api/match-requests/:id/confirm",
            post(handlers::match_requests::confirm),
        )
        .route(
            "/api/match-requests/:id/reject",
            post(handlers::match_requests::reject),
        )
}
