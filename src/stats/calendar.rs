use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::local_date;
use crate::models::Trade;

/// Realized results for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayBucket {
    pub trades: Vec<Trade>,
    pub total_pl: Decimal,
    pub win_count: u32,
    pub loss_count: u32,
}

impl DayBucket {
    fn push(&mut self, trade: &Trade, pl: Decimal) {
        self.total_pl = self.total_pl.saturating_add(pl);
        if pl > Decimal::ZERO {
            self.win_count += 1;
        } else if pl < Decimal::ZERO {
            self.loss_count += 1;
        }
        self.trades.push(trade.clone());
    }
}

/// Day buckets keyed by local exit date, serialized as `YYYY-MM-DD`.
pub type CalendarBuckets = BTreeMap<NaiveDate, DayBucket>;

/// Group closed trades by the local date of their exit.
///
/// Weekend dates are kept; excluding them is left to consumers.
pub fn bucket_by_exit_day(trades: &[Trade], offset: &FixedOffset) -> CalendarBuckets {
    let mut buckets = CalendarBuckets::new();

    for trade in trades {
        let (Some(exited), Some(pl)) = (trade.exit_date, trade.profit_loss) else {
            continue;
        };
        buckets
            .entry(local_date(exited, offset))
            .or_default()
            .push(trade, pl);
    }

    buckets
}
