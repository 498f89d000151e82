use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::domain::{RefreshMetadata, RefreshOutcome, CATALOG_REFRESH_KEY};
use crate::error::AppError;

/// Manual refresh trigger. Runs the cycle inline and reports its tally.
pub async fn trigger_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshOutcome>, AppError> {
    let outcome = state.coordinator.refresh().await?;
    Ok(Json(outcome))
}

pub async fn refresh_status(
    State(state): State<AppState>,
) -> Result<Json<RefreshMetadata>, AppError> {
    state
        .metadata
        .get_metadata(CATALOG_REFRESH_KEY)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no refresh has run yet".to_string()))
}
