use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::Owner;
use crate::services::journal;
use crate::stats::{
    bucket_by_exit_day, cumulative_series, monthly_metrics, summarize_portfolio, weekly_stats_from_buckets,
    CalendarBuckets, CumulativePoint, MonthlyMetrics, PortfolioSummary, WeeklyStats,
};
use crate::AppState;

/// Calendar page payload: month metrics, per-day cells and week totals.
#[derive(Serialize)]
pub struct CalendarView {
    pub monthly: MonthlyMetrics,
    pub calendar: CalendarBuckets,
    pub weekly: WeeklyStats,
}

#[derive(Deserialize)]
pub struct CumulativeQuery {
    pub year: Option<i32>,
}

#[derive(Serialize)]
pub struct CumulativeView {
    pub year: i32,
    pub points: Vec<CumulativePoint>,
}

/// GET /api/stats/portfolio
pub async fn portfolio(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<ApiResponse<PortfolioSummary>>, AppError> {
    let trades = journal::fetch_snapshot(&state.db, &state.refresh, owner).await?;
    Ok(Json(ApiResponse::ok(summarize_portfolio(&trades, state.now()))))
}

/// GET /api/stats/calendar
pub async fn calendar(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<ApiResponse<CalendarView>>, AppError> {
    let trades = journal::fetch_snapshot(&state.db, &state.refresh, owner).await?;
    let now = state.now();
    let calendar = bucket_by_exit_day(&trades, now.offset());

    Ok(Json(ApiResponse::ok(CalendarView {
        monthly: monthly_metrics(&trades, now),
        weekly: weekly_stats_from_buckets(&calendar, now),
        calendar,
    })))
}

/// GET /api/stats/cumulative?year=2026
///
/// Defaults to the current year in the journal's offset.
pub async fn cumulative(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<CumulativeQuery>,
) -> Result<Json<ApiResponse<CumulativeView>>, AppError> {
    let now = state.now();
    let year = query.year.unwrap_or_else(|| now.year());
    if !(1970..=9999).contains(&year) {
        return Err(AppError::validation("Invalid year"));
    }

    let trades = journal::fetch_snapshot(&state.db, &state.refresh, owner).await?;
    let calendar = bucket_by_exit_day(&trades, now.offset());
    let points = cumulative_series(&calendar, year).collect();

    Ok(Json(ApiResponse::ok(CumulativeView { year, points })))
}
