use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{local_date, mean, total};
use crate::models::Trade;

/// Number of closed trades surfaced on the dashboard.
pub const RECENT_CLOSED_LIMIT: usize = 5;

/// Headline portfolio figures.
///
/// `avg_loss` is signed: a mean of negative P/L values stays negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_open_value: Decimal,
    pub daily_realized_pl: Decimal,
    pub total_realized_pl: Decimal,
    /// Percentage in [0, 100].
    pub win_rate: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub recent_closed_trades: Vec<Trade>,
}

/// Reduce a user's trades to the portfolio summary. Order of `trades` is
/// irrelevant; recent trades are selected by `entry_date`.
pub fn summarize_portfolio(trades: &[Trade], now: DateTime<FixedOffset>) -> PortfolioSummary {
    let offset = *now.offset();
    let today = now.date_naive();

    // Positions whose basis does not fit in a Decimal are left out.
    let total_open_value = total(trades.iter().filter(|t| t.is_open()).filter_map(Trade::cost_basis));

    let realized: Vec<Decimal> = trades.iter().filter_map(|t| t.profit_loss).collect();
    let total_realized_pl = total(realized.iter().copied());

    let daily_realized_pl = total(trades.iter().filter_map(|t| match (t.exit_date, t.profit_loss) {
        (Some(exited), Some(pl)) if local_date(exited, &offset) == today => Some(pl),
        _ => None,
    }));

    let wins: Vec<Decimal> = realized.iter().copied().filter(|pl| *pl > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = realized.iter().copied().filter(|pl| *pl < Decimal::ZERO).collect();

    let win_rate = if realized.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(wins.len() as i64) / Decimal::from(realized.len() as i64) * Decimal::ONE_HUNDRED
    };

    PortfolioSummary {
        total_open_value,
        daily_realized_pl,
        total_realized_pl,
        win_rate,
        avg_win: mean(&wins),
        avg_loss: mean(&losses),
        recent_closed_trades: recent_closed(trades, RECENT_CLOSED_LIMIT),
    }
}

/// Most recently entered closed trades, newest first.
fn recent_closed(trades: &[Trade], limit: usize) -> Vec<Trade> {
    let mut closed: Vec<&Trade> = trades.iter().filter(|t| t.profit_loss.is_some()).collect();
    closed.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
    closed.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_win_rate_two_of_three() {
        let trades = vec![
            closed_trade(10, 1, at(2026, 10, 1)),
            closed_trade(-5, 1, at(2026, 10, 2)),
            closed_trade(3, 1, at(2026, 10, 5)),
        ];
        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));

        // 2 / 3 * 100 = 66.666...
        assert_eq!(summary.win_rate.round_dp(3), Decimal::new(66667, 3));
        assert_eq!(summary.total_realized_pl, Decimal::from(8));
        assert_eq!(summary.avg_win, Decimal::new(65, 1));
        assert_eq!(summary.avg_loss, Decimal::from(-5));
    }

    #[test]
    fn test_no_closed_trades_yields_zeros() {
        let trades = vec![open_trade("MSFT", 400, 2, at(2026, 10, 1))];
        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));

        assert_eq!(summary.win_rate, Decimal::ZERO);
        assert_eq!(summary.avg_win, Decimal::ZERO);
        assert_eq!(summary.avg_loss, Decimal::ZERO);
        assert_eq!(summary.total_realized_pl, Decimal::ZERO);
        assert!(summary.recent_closed_trades.is_empty());
    }

    #[test]
    fn test_open_trades_only_count_toward_open_value() {
        let trades = vec![
            open_trade("AAPL", 150, 10, at(2026, 10, 1)),
            open_trade("TSLA", 200, 2, at(2026, 10, 2)),
            closed_trade(40, 4, at(2026, 10, 3)),
        ];
        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));

        assert_eq!(summary.total_open_value, Decimal::from(1_900));
        assert_eq!(summary.total_realized_pl, Decimal::from(40));
        assert_eq!(summary.win_rate, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_total_realized_is_order_independent() {
        let mut trades = vec![
            closed_trade(120, 3, at(2026, 9, 1)),
            closed_trade(-45, 3, at(2026, 9, 8)),
            open_trade("NVDA", 90, 5, at(2026, 9, 9)),
            closed_trade(7, 1, at(2026, 9, 10)),
        ];
        let now = now_at(2026, 10, 19);
        let forward = summarize_portfolio(&trades, now);
        trades.reverse();
        let backward = summarize_portfolio(&trades, now);

        assert_eq!(forward.total_realized_pl, Decimal::from(82));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_zero_pl_is_neither_win_nor_loss() {
        let trades = vec![closed_trade(0, 1, at(2026, 10, 1)), closed_trade(10, 1, at(2026, 10, 2))];
        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));

        assert_eq!(summary.win_rate, Decimal::from(50));
        assert_eq!(summary.avg_loss, Decimal::ZERO);
    }

    #[test]
    fn test_daily_realized_only_counts_today() {
        let trades = vec![
            closed_trade(30, 1, at(2026, 10, 19)),
            closed_trade(-10, 1, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()),
            closed_trade(500, 1, Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap()),
        ];
        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));

        assert_eq!(summary.daily_realized_pl, Decimal::from(20));
    }

    #[test]
    fn test_recent_closed_sorted_by_entry_date_desc() {
        let base = at(2026, 10, 1);
        let trades: Vec<Trade> = (0..8)
            .map(|i| {
                let mut t = closed_trade(i + 1, 1, base + Duration::days(i));
                t.entry_date = base + Duration::days(i);
                t
            })
            .collect();

        let summary = summarize_portfolio(&trades, now_at(2026, 10, 19));
        let pls: Vec<Decimal> = summary
            .recent_closed_trades
            .iter()
            .filter_map(|t| t.profit_loss)
            .collect();

        assert_eq!(pls.len(), RECENT_CLOSED_LIMIT);
        assert_eq!(
            pls,
            vec![8, 7, 6, 5, 4].into_iter().map(Decimal::from).collect::<Vec<_>>()
        );
    }
}
