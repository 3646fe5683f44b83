use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{CloseTradeForm, Owner, Trade, TradeForm};
use crate::services::journal;
use crate::AppState;

/// GET /api/trades: the caller's trades, newest entry first.
pub async fn list(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let trades = journal::list_trades(&state.db, owner).await?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// POST /api/trades: record a new trade.
pub async fn create(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    payload: Result<Json<TradeForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Trade>>), AppError> {
    let Json(form) = payload?;
    let trade = journal::add_trade(&state.db, state.charts.as_ref(), owner, form, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(trade))))
}

/// POST /api/trades/:id/close: close an open position.
pub async fn close(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CloseTradeForm>, JsonRejection>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    let Path(id) = id?;
    let Json(form) = payload?;
    let trade = journal::close_trade(&state.db, owner, id, &form.exit_price, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(trade)))
}

/// DELETE /api/trades/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Uuid>>, AppError> {
    let Path(id) = id?;
    journal::delete_trade(&state.db, owner, id).await?;
    Ok(Json(ApiResponse::ok(id)))
}
