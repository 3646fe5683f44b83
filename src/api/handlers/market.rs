use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::market::{MarketDataError, PriceBar};
use crate::models::Owner;
use crate::AppState;

#[derive(Deserialize)]
pub struct BarsQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct BarsView {
    pub symbol: String,
    pub date: NaiveDate,
    pub bars: Vec<PriceBar>,
    pub remaining_calls: usize,
}

fn normalize_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 10
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(symbol)
    } else {
        Err(AppError::validation("Invalid symbol"))
    }
}

fn resolve_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let date = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::validation("Invalid date"))?,
        None => today,
    };
    if date > today {
        return Err(AppError::validation("Date cannot be in the future"));
    }
    Ok(date)
}

impl From<MarketDataError> for AppError {
    fn from(e: MarketDataError) -> Self {
        let message = e.to_string();
        match e {
            MarketDataError::RateLimited => AppError::RateLimited(message),
            MarketDataError::NoData => AppError::NotFound(message),
            MarketDataError::Api(msg) => AppError::store("Failed to fetch stock data", msg),
            MarketDataError::Http(err) => AppError::store("Failed to fetch stock data", err),
        }
    }
}

/// GET /api/market/:symbol/bars?date=YYYY-MM-DD: intraday bars for charting.
pub async fn day_bars(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Path(symbol): Path<String>,
    Query(query): Query<BarsQuery>,
) -> Result<Json<ApiResponse<BarsView>>, AppError> {
    let symbol = normalize_symbol(&symbol)?;
    let date = resolve_date(query.date.as_deref(), state.now().date_naive())?;

    let client = state
        .market
        .as_ref()
        .ok_or_else(|| AppError::store("Failed to fetch stock data", "market data is not configured"))?;

    metrics::counter!("market_data_requests_total").increment(1);
    tracing::debug!(owner = %owner, symbol = %symbol, date = %date, "Fetching intraday bars");

    let bars = client.day_bars(&symbol, date).await?;

    Ok(Json(ApiResponse::ok(BarsView {
        symbol,
        date,
        bars,
        remaining_calls: client.remaining_calls(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_normalized() {
        assert_eq!(normalize_symbol(" brk.b ").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("AAPL;DROP").is_err());
    }

    #[test]
    fn test_date_defaults_to_today_and_rejects_future() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(resolve_date(None, today).unwrap(), today);
        assert_eq!(
            resolve_date(Some("2026-10-16"), today).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert!(resolve_date(Some("2026-10-20"), today).is_err());
        assert!(resolve_date(Some("10/16/2026"), today).is_err());
    }

    #[test]
    fn test_rate_limit_maps_to_429_variant() {
        assert!(matches!(AppError::from(MarketDataError::RateLimited), AppError::RateLimited(_)));
        assert!(matches!(AppError::from(MarketDataError::NoData), AppError::NotFound(_)));
    }
}
