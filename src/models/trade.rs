use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ChartImage, Direction};

/// Database row for trades table.
///
/// `exit_price`, `exit_date` and `profit_loss` are either all present
/// (closed trade) or all absent (open position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    #[sqlx(rename = "trade_type", try_from = "String")]
    #[serde(rename = "trade_type")]
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: i64,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub profit_loss: Option<Decimal>,
    pub notes: String,
    pub chart_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.exit_price.is_none()
    }

    /// Capital committed at entry, `None` if it overflows.
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.entry_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Realized P/L as a percentage of the cost basis.
    pub fn return_pct(&self) -> Option<Decimal> {
        let pl = self.profit_loss?;
        let basis = self.cost_basis()?;
        pl.checked_div(basis)?.checked_mul(Decimal::ONE_HUNDRED)
    }
}

/// Trade entry form as submitted by a client.
///
/// Numeric fields stay textual until validated so that malformed input is
/// reported as a validation message rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub entry_price: String,
    #[serde(default, deserialize_with = "optional_text_or_number")]
    pub exit_price: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub chart_image: Option<ChartImage>,
}

/// Exit price submitted when closing an open trade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseTradeForm {
    #[serde(default, deserialize_with = "text_or_number")]
    pub exit_price: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumeric {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawNumeric> for String {
    fn from(raw: RawNumeric) -> Self {
        match raw {
            RawNumeric::Text(s) => s,
            RawNumeric::Number(n) => n.to_string(),
        }
    }
}

/// Accept `"12.5"` as well as `12.5` for numeric form fields.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawNumeric::deserialize(deserializer).map(String::from)
}

fn optional_text_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<RawNumeric>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// A validated trade ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub user_id: Uuid,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: i64,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub profit_loss: Option<Decimal>,
    pub notes: String,
    pub chart_url: Option<String>,
}
