use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use tutormatch_core::models::matching::{
    ListTutorsQuery, ListTutorsResponse, SetAvailabilityRequest, TutorAvailabilityResponse,
};

use crate::{
    ApiState,
    middleware::{auth::CallerIdentity, error_handling::AppError},
};

/// `GET /api/tutors?subject=&min_rating=&day_of_week=&start=&end=&page=&limit=`
pub async fn list_tutors(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListTutorsQuery>,
) -> Result<Json<ListTutorsResponse>, AppError> {
    let response = state.engine.list_tutors(query).await?;
    Ok(Json(response))
}

pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<Uuid>,
) -> Result<Json<TutorAvailabilityResponse>, AppError> {
    let response = state.engine.get_tutor_availability(tutor_id).await?;
    Ok(Json(response))
}

/// Replaces the tutor's windows for one date; the tutor themself or a coordinator.
pub async fn set_availability(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
    Path((tutor_id, date)): Path<(Uuid, NaiveDate)>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> Result<Json<TutorAvailabilityResponse>, AppError> {
    let response = state
        .engine
        .set_tutor_availability(&caller, tutor_id, date, payload)
        .await?;
    Ok(Json(response))
}
