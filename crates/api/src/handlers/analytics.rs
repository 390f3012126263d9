use axum::{Json, extract::State};
use std::sync::Arc;

use tutormatch_core::models::match_log::MatchAnalytics;

use crate::{
    ApiState,
    middleware::{auth::CallerIdentity, error_handling::AppError},
};

pub async fn matching(
    State(state): State<Arc<ApiState>>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<MatchAnalytics>, AppError> {
    let analytics = state.engine.match_analytics(&caller).await?;
    Ok(Json(analytics))
}
