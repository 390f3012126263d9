use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use tutormatch_core::models::{
    matching::{
        AutoMatchRequest, AutoMatchResponse, ConfirmationResponse, CreateManualMatchRequest, MyRequest,
    },
    registration::Registration,
};
use tutormatch_engine::run_detached;

use crate::{
    ApiState,
    middleware::{auth::CallerIdentity, error_handling::AppError},
};

/// Places a pending request on the chosen tutor slot. 409 if the slot is taken.
pub async fn create_manual(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(payload): Json<CreateManualMatchRequest>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let engine = state.engine.clone();
    let registration =
        run_detached(async move { engine.create_manual_request(&caller, payload).await }).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Always answers with the created registration; an unmatched request comes back as
/// `coordinator_review` rather than an error. The match runs to completion even if the
/// request times out.
pub async fn create_auto(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(payload): Json<AutoMatchRequest>,
) -> Result<(StatusCode, Json<AutoMatchResponse>), AppError> {
    let engine = state.engine.clone();
    let response = run_detached(async move { engine.auto_match(&caller, payload).await }).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn my_requests(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<Vec<MyRequest>>, AppError> {
    let requests = state.engine.my_requests(&caller).await?;
    Ok(Json(requests))
}

pub async fn confirm(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<ConfirmationResponse>, AppError> {
    let engine = state.engine.clone();
    let confirmation = run_detached(async move {
        engine.confirm_manual_request(&caller, registration_id).await
    })
    .await?;
    Ok(Json(ConfirmationResponse {
        registration: confirmation.registration,
        session: confirmation.session,
    }))
}

pub async fn reject(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<Registration>, AppError> {
    let engine = state.engine.clone();
    let registration =
        run_detached(async move { engine.reject_request(&caller, registration_id).await }).await?;
    Ok(Json(registration))
}
