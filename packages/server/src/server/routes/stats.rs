use axum::{extract::Extension, Json};

use crate::kernel::PiiStats;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// GET /api/stats
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<PiiStats>, ApiError> {
    let stats = state.pii.stats().await.map_err(ApiError::Stats)?;
    Ok(Json(stats))
}
