use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewTrade, Trade};

/// Insert a validated trade and return the stored row.
pub async fn insert_trade(pool: &PgPool, trade: &NewTrade) -> anyhow::Result<Trade> {
    let row = sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades (
            user_id, symbol, trade_type, entry_price, exit_price, quantity,
            entry_date, exit_date, profit_loss, notes, chart_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(trade.user_id)
    .bind(&trade.symbol)
    .bind(trade.direction.as_str())
    .bind(trade.entry_price)
    .bind(trade.exit_price)
    .bind(trade.quantity)
    .bind(trade.entry_date)
    .bind(trade.exit_date)
    .bind(trade.profit_loss)
    .bind(&trade.notes)
    .bind(&trade.chart_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// All trades of a user, newest entry first.
pub async fn list_trades(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(
        "SELECT * FROM trades WHERE user_id = $1 ORDER BY entry_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Fetch one trade, scoped to its owner.
pub async fn get_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>(
        "SELECT * FROM trades WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(trade)
}

/// Populate the exit fields of an open trade. Returns `None` if no open trade
/// with that id belongs to the user.
pub async fn close_trade(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    exit_price: Decimal,
    exit_date: DateTime<Utc>,
    profit_loss: Decimal,
) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        UPDATE trades
        SET exit_price = $3, exit_date = $4, profit_loss = $5
        WHERE id = $1 AND user_id = $2 AND exit_price IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(exit_price)
    .bind(exit_date)
    .bind(profit_loss)
    .fetch_optional(pool)
    .await?;

    Ok(trade)
}

/// Delete a trade. Returns whether a row was removed.
pub async fn delete_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
