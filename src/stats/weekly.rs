use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{local_date, CalendarBuckets, MonthWindow};
use crate::models::Trade;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeekBucket {
    pub total_pl: Decimal,
    pub trade_count: u32,
}

/// Week buckets keyed by the Monday that starts each week.
pub type WeeklyStats = BTreeMap<NaiveDate, WeekBucket>;

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Weekly totals for trades whose own exit date lies in the current month.
///
/// A trade closed on the 1st can land in a week that starts in the previous
/// month; that week is still reported.
pub fn weekly_stats(trades: &[Trade], now: DateTime<FixedOffset>) -> WeeklyStats {
    let offset = *now.offset();
    let window = MonthWindow::containing(now.date_naive());
    let mut weeks = WeeklyStats::new();

    for trade in trades {
        let (Some(exited), Some(pl)) = (trade.exit_date, trade.profit_loss) else {
            continue;
        };
        let exit_day = local_date(exited, &offset);
        if !window.contains(exit_day) {
            continue;
        }
        let week = weeks.entry(week_start(exit_day)).or_default();
        week.total_pl = week.total_pl.saturating_add(pl);
        week.trade_count += 1;
    }

    weeks
}

/// Same totals derived from already-built day buckets.
pub fn weekly_stats_from_buckets(buckets: &CalendarBuckets, now: DateTime<FixedOffset>) -> WeeklyStats {
    let window = MonthWindow::containing(now.date_naive());
    let mut weeks = WeeklyStats::new();

    for (day, bucket) in buckets.range(window.first..=window.last) {
        let week = weeks.entry(week_start(*day)).or_default();
        week.total_pl = week.total_pl.saturating_add(bucket.total_pl);
        week.trade_count += bucket.trades.len() as u32;
    }

    weeks
}
