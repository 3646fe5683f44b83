use std::iter::FusedIterator;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;

use super::CalendarBuckets;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub day: NaiveDate,
    /// Chart label, e.g. `Mar 4`.
    pub date: String,
    pub value: Decimal,
}

/// Running realized P/L over every weekday of a year.
///
/// Lazy and finite; every call to [`cumulative_series`] starts a fresh walk.
#[derive(Debug, Clone)]
pub struct CumulativeSeries<'a> {
    buckets: &'a CalendarBuckets,
    cursor: Option<NaiveDate>,
    last: NaiveDate,
    running: Decimal,
}

/// One point per weekday from Jan 1 through Dec 31 of `year`.
pub fn cumulative_series(buckets: &CalendarBuckets, year: i32) -> CumulativeSeries<'_> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);

    match (first, last) {
        (Some(first), Some(last)) => CumulativeSeries {
            buckets,
            cursor: Some(first),
            last,
            running: Decimal::ZERO,
        },
        // Year outside chrono's range: empty series.
        _ => CumulativeSeries {
            buckets,
            cursor: None,
            last: NaiveDate::MIN,
            running: Decimal::ZERO,
        },
    }
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

impl Iterator for CumulativeSeries<'_> {
    type Item = CumulativePoint;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let day = self.cursor.filter(|d| *d <= self.last)?;
            self.cursor = day.succ_opt();

            if is_weekend(day) {
                continue;
            }

            if let Some(bucket) = self.buckets.get(&day) {
                self.running = self.running.saturating_add(bucket.total_pl);
            }

            return Some(CumulativePoint {
                day,
                date: day.format("%b %-d").to_string(),
                value: self.running,
            });
        }
    }
}

impl FusedIterator for CumulativeSeries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::bucket_by_exit_day;
    use crate::stats::fixtures::*;

    #[test]
    fn test_one_point_per_weekday() {
        let buckets = CalendarBuckets::new();
        assert_eq!(cumulative_series(&buckets, 2026).count(), 261);
        assert_eq!(cumulative_series(&buckets, 2024).count(), 262);
        assert!(cumulative_series(&buckets, 2026).all(|p| !is_weekend(p.day)));
    }

    #[test]
    fn test_steps_on_trade_days_and_stays_flat() {
        let trades = vec![
            closed_trade(100, 1, at(2026, 3, 4)),
            closed_trade(-40, 1, at(2026, 6, 10)),
        ];
        let buckets = bucket_by_exit_day(&trades, &utc());
        let points: Vec<CumulativePoint> = cumulative_series(&buckets, 2026).collect();

        let value_on = |d: NaiveDate| points.iter().find(|p| p.day == d).map(|p| p.value);

        assert_eq!(value_on(day(2026, 1, 1)), Some(Decimal::ZERO));
        assert_eq!(value_on(day(2026, 3, 3)), Some(Decimal::ZERO));
        assert_eq!(value_on(day(2026, 3, 4)), Some(Decimal::from(100)));
        assert_eq!(value_on(day(2026, 6, 9)), Some(Decimal::from(100)));
        assert_eq!(value_on(day(2026, 6, 10)), Some(Decimal::from(60)));
        assert_eq!(points.last().map(|p| p.value), Some(Decimal::from(60)));
        assert_eq!(points.len(), 261);

        let in_order = points.windows(2).all(|w| w[0].day < w[1].day);
        assert!(in_order);
    }

    #[test]
    fn test_labels_and_weekend_buckets_skipped() {
        // Saturday bucket is ignored by the series.
        let trades = vec![closed_trade(75, 1, at(2026, 10, 17))];
        let buckets = bucket_by_exit_day(&trades, &utc());
        let points: Vec<CumulativePoint> = cumulative_series(&buckets, 2026).collect();

        assert_eq!(points[0].date, "Jan 1");
        assert!(points.iter().all(|p| p.value.is_zero()));
    }

    #[test]
    fn test_series_is_restartable() {
        let trades = vec![closed_trade(5, 1, at(2026, 2, 2))];
        let buckets = bucket_by_exit_day(&trades, &utc());

        let first: Vec<_> = cumulative_series(&buckets, 2026).collect();
        let second: Vec<_> = cumulative_series(&buckets, 2026).collect();
        assert_eq!(first, second);

        let mut series = cumulative_series(&buckets, 2026);
        series.by_ref().for_each(drop);
        assert!(series.next().is_none());
    }
}
