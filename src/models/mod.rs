pub mod chart;
pub mod trade;

pub use chart::ChartImage;
pub use trade::{CloseTradeForm, NewTrade, Trade, TradeForm};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    /// Realized P/L of a round trip in this direction.
    ///
    /// LONG: `(exit - entry) * quantity`, SHORT: `(entry - exit) * quantity`.
    /// `None` when the result does not fit in a `Decimal`.
    pub fn profit_loss(&self, entry_price: Decimal, exit_price: Decimal, quantity: i64) -> Option<Decimal> {
        let per_share = match self {
            Direction::Long => exit_price.checked_sub(entry_price)?,
            Direction::Short => entry_price.checked_sub(exit_price)?,
        };
        per_share.checked_mul(Decimal::from(quantity))
    }
}

impl TryFrom<String> for Direction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Direction::from_api_str(&value).ok_or_else(|| format!("unknown trade type: {value}"))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Owner: identity supplied by the auth collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner(pub Uuid);

impl Owner {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
