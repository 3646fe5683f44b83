use axum::extract::State;
use axum::{Extension, Json};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::Owner;
use crate::services::journal;
use crate::stats::JournalStats;
use crate::AppState;

/// GET /api/dashboard: every statistic recomputed from one fresh snapshot.
pub async fn summary(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<ApiResponse<JournalStats>>, AppError> {
    let trades = journal::fetch_snapshot(&state.db, &state.refresh, owner).await?;
    let stats = journal::compute_stats(&trades, state.now());
    Ok(Json(ApiResponse::ok(stats)))
}
