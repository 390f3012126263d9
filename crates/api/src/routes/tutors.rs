use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/tutors", get(handlers::tutors::list_tutors))
        .route(
            "/api/tutors/:id/availability",
            get(handlers::tutors::get_availability),
        )
        .route(
            "/api/tutors/:id/availability/:date",
            put(handlers::tutors::set_availability),
        )
}
