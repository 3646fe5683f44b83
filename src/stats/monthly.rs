use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{local_date, mean, MonthWindow};
use crate::models::Trade;

/// Win/loss metrics for trades closed in the current calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyMetrics {
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub avg_gain_percent: Decimal,
    pub avg_loss_percent: Decimal,
    /// Never negative.
    pub biggest_profit: Decimal,
    /// Never positive.
    pub biggest_loss: Decimal,
    pub biggest_gain_percent: Decimal,
    pub biggest_loss_percent: Decimal,
}

pub fn monthly_metrics(trades: &[Trade], now: DateTime<FixedOffset>) -> MonthlyMetrics {
    let offset = *now.offset();
    let window = MonthWindow::containing(now.date_naive());

    // (profit_loss, percent of cost basis)
    let closed: Vec<(Decimal, Decimal)> = trades
        .iter()
        .filter_map(|t| {
            let exited = t.exit_date?;
            let pl = t.profit_loss?;
            window
                .contains(local_date(exited, &offset))
                .then(|| (pl, t.return_pct().unwrap_or(Decimal::ZERO)))
        })
        .collect();

    if closed.is_empty() {
        return MonthlyMetrics::default();
    }

    let (wins, losses): (Vec<_>, Vec<_>) = closed
        .iter()
        .filter(|(pl, _)| !pl.is_zero())
        .partition(|(pl, _)| *pl > Decimal::ZERO);

    let win_pl: Vec<Decimal> = wins.iter().map(|(pl, _)| *pl).collect();
    let loss_pl: Vec<Decimal> = losses.iter().map(|(pl, _)| *pl).collect();
    let win_pct: Vec<Decimal> = wins.iter().map(|(_, pct)| *pct).collect();
    let loss_pct: Vec<Decimal> = losses.iter().map(|(_, pct)| *pct).collect();

    MonthlyMetrics {
        avg_win: mean(&win_pl),
        avg_loss: mean(&loss_pl),
        avg_gain_percent: mean(&win_pct),
        avg_loss_percent: mean(&loss_pct),
        biggest_profit: win_pl.iter().copied().fold(Decimal::ZERO, Decimal::max),
        biggest_loss: loss_pl.iter().copied().fold(Decimal::ZERO, Decimal::min),
        // Extremes over every closed trade, clamped at zero.
        biggest_gain_percent: closed.iter().map(|(_, pct)| *pct).fold(Decimal::ZERO, Decimal::max),
        biggest_loss_percent: closed.iter().map(|(_, pct)| *pct).fold(Decimal::ZERO, Decimal::min),
    }
}
