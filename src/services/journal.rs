use std::str::FromStr;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::ChartStorage;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::{ChartImage, Direction, NewTrade, Owner, Trade, TradeForm};
use crate::services::refresh::RefreshSequencer;
use crate::stats::{self, JournalStats};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trade form fields after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTrade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: i64,
    /// Derived when the trade is entered already closed.
    pub profit_loss: Option<Decimal>,
    pub notes: String,
}

/// Parse a strictly positive price.
pub fn parse_price(raw: &str, message: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| AppError::validation(message))
}

pub fn validate_form(form: &TradeForm) -> Result<ValidatedTrade, AppError> {
    let symbol = form.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::validation("Symbol is required"));
    }

    let direction = Direction::from_api_str(&form.trade_type)
        .ok_or_else(|| AppError::validation("Invalid trade type"))?;

    let entry_price = parse_price(&form.entry_price, "Invalid entry price")?;

    let exit_price = match form.exit_price.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_price(raw, "Invalid exit price")?),
        _ => None,
    };

    let quantity = form
        .quantity
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| AppError::validation("Invalid quantity"))?;

    // Cost basis and P/L must stay representable for the statistics.
    if entry_price.checked_mul(Decimal::from(quantity)).is_none() {
        return Err(AppError::validation("Invalid quantity"));
    }
    let profit_loss = match exit_price {
        Some(exit) => Some(
            direction
                .profit_loss(entry_price, exit, quantity)
                .ok_or_else(|| AppError::validation("Invalid exit price"))?,
        ),
        None => None,
    };

    Ok(ValidatedTrade {
        symbol,
        direction,
        entry_price,
        exit_price,
        quantity,
        profit_loss,
        notes: form.notes.trim().to_string(),
    })
}

impl ValidatedTrade {
    /// Build the insert payload. A supplied exit price closes the trade
    /// immediately with the derived P/L.
    pub fn into_new_trade(self, owner: Owner, chart_url: Option<String>, now: DateTime<Utc>) -> NewTrade {
        NewTrade {
            user_id: owner.id(),
            symbol: self.symbol,
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            quantity: self.quantity,
            entry_date: now,
            exit_date: self.exit_price.map(|_| now),
            profit_loss: self.profit_loss,
            notes: self.notes,
            chart_url,
        }
    }
}

/// Decode an attached chart and check it against the storage size limit.
fn decode_chart(image: &ChartImage, max_bytes: usize) -> Result<Vec<u8>, AppError> {
    let bytes = image
        .decode()
        .map_err(|_| AppError::validation("Invalid chart image"))?;
    if bytes.is_empty() {
        return Err(AppError::validation("Invalid chart image"));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Chart image exceeds {max_bytes} bytes"
        )));
    }
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Lifecycle operations
// ---------------------------------------------------------------------------

/// Record a new trade, uploading its chart first when one is attached.
///
/// An uploaded chart is left in storage if the insert fails.
pub async fn add_trade(
    pool: &PgPool,
    charts: Option<&ChartStorage>,
    owner: Owner,
    form: TradeForm,
    now: DateTime<Utc>,
) -> Result<Trade, AppError> {
    let validated = validate_form(&form)?;

    let chart_url = match &form.chart_image {
        Some(image) => {
            let storage = charts.ok_or_else(|| {
                AppError::store("Image upload failed", "chart storage is not configured")
            })?;
            let bytes = decode_chart(image, storage.max_bytes())?;
            let key = ChartStorage::object_key(owner, &image.extension());

            let url = storage
                .upload(&key, bytes, image.content_type())
                .await
                .map_err(|e| AppError::store("Image upload failed", e))?;
            metrics::counter!("chart_uploads_total").increment(1);
            Some(url)
        }
        None => None,
    };

    let new_trade = validated.into_new_trade(owner, chart_url, now);
    let trade = trade_repo::insert_trade(pool, &new_trade).await.map_err(|e| {
        if new_trade.chart_url.is_some() {
            tracing::warn!(owner = %owner, "Trade insert failed after chart upload; image kept");
        }
        AppError::store("Failed to add trade", e)
    })?;

    metrics::counter!("trades_created_total").increment(1);
    tracing::info!(
        owner = %owner,
        trade_id = %trade.id,
        symbol = %trade.symbol,
        direction = %trade.direction,
        closed = !trade.is_open(),
        "Trade recorded"
    );

    Ok(trade)
}

/// P/L of closing `trade` at `exit_price`, rejected when it cannot be represented.
fn closing_profit_loss(trade: &Trade, exit_price: Decimal) -> Result<Decimal, AppError> {
    trade
        .direction
        .profit_loss(trade.entry_price, exit_price, trade.quantity)
        .ok_or_else(|| AppError::validation("Please enter a valid exit price"))
}

/// Close an open trade at `exit_price`, deriving its P/L.
pub async fn close_trade(
    pool: &PgPool,
    owner: Owner,
    id: Uuid,
    exit_price: &str,
    now: DateTime<Utc>,
) -> Result<Trade, AppError> {
    let exit_price = parse_price(exit_price, "Please enter a valid exit price")?;

    let trade = trade_repo::get_trade(pool, owner.id(), id)
        .await
        .map_err(|e| AppError::store("Failed to close trade", e))?
        .ok_or_else(|| AppError::NotFound(format!("trade {id}")))?;

    if !trade.is_open() {
        return Err(AppError::validation("Trade is already closed"));
    }

    let profit_loss = closing_profit_loss(&trade, exit_price)?;

    let closed = trade_repo::close_trade(pool, owner.id(), id, exit_price, now, profit_loss)
        .await
        .map_err(|e| AppError::store("Failed to close trade", e))?
        // Closed concurrently between the read and the update.
        .ok_or_else(|| AppError::validation("Trade is already closed"))?;

    metrics::counter!("trades_closed_total").increment(1);
    tracing::info!(
        owner = %owner,
        trade_id = %id,
        exit_price = %exit_price,
        profit_loss = %profit_loss,
        "Trade closed"
    );

    Ok(closed)
}

pub async fn delete_trade(pool: &PgPool, owner: Owner, id: Uuid) -> Result<(), AppError> {
    let removed = trade_repo::delete_trade(pool, owner.id(), id)
        .await
        .map_err(|e| AppError::store("Failed to delete trade", e))?;

    if !removed {
        return Err(AppError::NotFound(format!("trade {id}")));
    }

    metrics::counter!("trades_deleted_total").increment(1);
    tracing::info!(owner = %owner, trade_id = %id, "Trade deleted");
    Ok(())
}

pub async fn list_trades(pool: &PgPool, owner: Owner) -> Result<Vec<Trade>, AppError> {
    trade_repo::list_trades(pool, owner.id())
        .await
        .map_err(|e| AppError::store("Failed to load trades", e))
}

// ---------------------------------------------------------------------------
// Statistics refresh
// ---------------------------------------------------------------------------

/// Fetch the owner's full trade list for a statistics refresh. The snapshot
/// is discarded if a newer refresh for the same owner started meanwhile.
pub async fn fetch_snapshot(
    pool: &PgPool,
    refresh: &RefreshSequencer,
    owner: Owner,
) -> Result<Vec<Trade>, AppError> {
    let token = refresh.issue(owner).await;
    let trades = list_trades(pool, owner).await?;

    if !refresh.is_latest(&token).await {
        metrics::counter!("refresh_superseded_total").increment(1);
        tracing::warn!(owner = %owner, seq = token.seq(), "Discarding superseded refresh");
        return Err(AppError::Superseded);
    }

    Ok(trades)
}

/// Recompute every statistic from a snapshot, recording how long it took.
pub fn compute_stats(trades: &[Trade], now: DateTime<FixedOffset>) -> JournalStats {
    let started = Instant::now();
    let stats = stats::compute_all(trades, now);
    metrics::histogram!("stats_compute_seconds").record(started.elapsed().as_secs_f64());

    tracing::debug!(
        trades = trades.len(),
        buckets = stats.calendar.len(),
        "Statistics recomputed"
    );
    stats
}
