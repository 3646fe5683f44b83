//! Aggregation engine: pure reductions from a user's trade list to the
//! statistics shown on the journal dashboard.
//!
//! Every function takes the full, freshly fetched trade list plus an explicit
//! `now` in the journal's local offset, and never fails. Empty or degenerate
//! input yields zero-valued results.

pub mod calendar;
pub mod cumulative;
pub mod monthly;
pub mod portfolio;
pub mod weekly;

pub use calendar::{bucket_by_exit_day, CalendarBuckets, DayBucket};
pub use cumulative::{cumulative_series, CumulativePoint, CumulativeSeries};
pub use monthly::{monthly_metrics, MonthlyMetrics};
pub use portfolio::{summarize_portfolio, PortfolioSummary};
pub use weekly::{week_start, weekly_stats, weekly_stats_from_buckets, WeekBucket, WeeklyStats};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Trade;

/// Everything the dashboard renders, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalStats {
    pub portfolio: PortfolioSummary,
    pub monthly: MonthlyMetrics,
    pub calendar: CalendarBuckets,
    pub weekly: WeeklyStats,
    pub cumulative: Vec<CumulativePoint>,
}

/// Recompute all statistics from scratch.
pub fn compute_all(trades: &[Trade], now: DateTime<FixedOffset>) -> JournalStats {
    let offset = *now.offset();
    let calendar = bucket_by_exit_day(trades, &offset);
    let cumulative = cumulative_series(&calendar, now.year()).collect();

    JournalStats {
        portfolio: summarize_portfolio(trades, now),
        monthly: monthly_metrics(trades, now),
        weekly: weekly_stats(trades, now),
        cumulative,
        calendar,
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Calendar date of an instant in the journal's local offset.
pub(crate) fn local_date(ts: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

/// Inclusive first/last day of the calendar month containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthWindow {
    pub fn containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { first, last }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }
}

/// Sum that saturates at the `Decimal` bounds instead of overflowing.
pub(crate) fn total(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Arithmetic mean, zero for an empty slice.
pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    total(values.iter().copied())
        .checked_div(Decimal::from(values.len() as i64))
        .unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{Direction, Trade};

    pub fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    /// Noon UTC on the given day.
    pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    pub fn now_at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        at(y, m, d).with_timezone(&utc())
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn open_trade(symbol: &str, entry: i64, quantity: i64, entered: DateTime<Utc>) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            symbol: symbol.into(),
            direction: Direction::Long,
            entry_price: Decimal::from(entry),
            exit_price: None,
            quantity,
            entry_date: entered,
            exit_date: None,
            profit_loss: None,
            notes: String::new(),
            chart_url: None,
            created_at: None,
        }
    }

    /// A closed LONG trade with entry price 100 whose exit yields `pl`.
    pub fn closed_trade(pl: i64, quantity: i64, exited: DateTime<Utc>) -> Trade {
        let entry = Decimal::from(100);
        let exit = entry + Decimal::from(pl) / Decimal::from(quantity);
        let mut trade = open_trade("TEST", 100, quantity, exited);
        trade.exit_price = Some(exit);
        trade.exit_date = Some(exited);
        trade.profit_loss = Some(Decimal::from(pl));
        trade
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_window_bounds() {
        let w = MonthWindow::containing(day(2024, 2, 14));
        assert_eq!(w.first, day(2024, 2, 1));
        assert_eq!(w.last, day(2024, 2, 29));
        assert!(w.contains(day(2024, 2, 29)));
        assert!(!w.contains(day(2024, 3, 1)));

        let dec = MonthWindow::containing(day(2026, 12, 31));
        assert_eq!(dec.last, day(2026, 12, 31));
    }

    #[test]
    fn test_local_date_uses_offset() {
        // 23:30 UTC on the 5th is already the 6th at UTC+2.
        let ts = Utc.with_ymd_and_hms(2026, 3, 5, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(local_date(ts, &plus_two), day(2026, 3, 6));
        assert_eq!(local_date(ts, &utc()), day(2026, 3, 5));
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        assert_eq!(mean(&[Decimal::from(2), Decimal::from(4)]), Decimal::from(3));
    }

    #[test]
    fn test_compute_all_is_idempotent() {
        let trades = vec![
            closed_trade(50, 10, at(2026, 10, 13)),
            closed_trade(-20, 5, at(2026, 10, 15)),
            open_trade("AAPL", 180, 3, at(2026, 10, 16)),
        ];
        let now = now_at(2026, 10, 19);

        let first = serde_json::to_string(&compute_all(&trades, now)).unwrap();
        let second = serde_json::to_string(&compute_all(&trades, now)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_all_survives_extreme_values() {
        let mut huge_open = open_trade("BIG", 1, 2, at(2026, 10, 16));
        huge_open.entry_price = Decimal::MAX;

        let mut huge_win = closed_trade(1, 1, at(2026, 10, 13));
        huge_win.profit_loss = Some(Decimal::MAX);
        let twin = huge_win.clone();

        let trades = vec![huge_open, huge_win, twin, open_trade("AAPL", 180, 3, at(2026, 10, 16))];
        let stats = compute_all(&trades, now_at(2026, 10, 19));

        assert_eq!(stats.portfolio.total_open_value, Decimal::from(540));
        assert_eq!(stats.portfolio.total_realized_pl, Decimal::MAX);
        assert_eq!(stats.calendar[&day(2026, 10, 13)].total_pl, Decimal::MAX);
        assert_eq!(stats.cumulative.last().map(|p| p.value), Some(Decimal::MAX));
    }

    #[test]
    fn test_compute_all_empty_input() {
        let stats = compute_all(&[], now_at(2026, 10, 19));
        assert_eq!(stats.portfolio, PortfolioSummary::default());
        assert_eq!(stats.monthly, MonthlyMetrics::default());
        assert!(stats.calendar.is_empty());
        assert!(stats.weekly.is_empty());
        assert_eq!(stats.cumulative.len(), 261);
        assert!(stats.cumulative.iter().all(|p| p.value.is_zero()));
    }
}
