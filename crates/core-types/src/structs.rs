use crate::enums::{DealKind, EntryKind};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A deal exactly as it arrives from the account history feed.
///
/// Mandatory fields (`position_id`, `time`, `price`) are optional here so that
/// incomplete records can be counted and excluded instead of failing the
/// whole snapshot. Numeric fields the feed may omit default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeal {
    #[serde(default)]
    pub position_id: Option<u64>,
    /// Execution time in epoch seconds, UTC.
    #[serde(default)]
    pub time: Option<i64>,
    pub entry: EntryKind,
    #[serde(rename = "type")]
    pub kind: DealKind,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub volume: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub swap: Decimal,
    #[serde(default)]
    pub profit: Decimal,
}

/// An order record; only its protective levels matter to the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub position_id: Option<u64>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default, alias = "sl")]
    pub stop_loss: Decimal,
    #[serde(default, alias = "tp")]
    pub take_profit: Decimal,
}

/// A validated deal with its resolved stop-loss/take-profit attached.
///
/// A zero `stop_loss` or `take_profit` means the level was never set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub position_id: u64,
    pub time: DateTime<Utc>,
    pub entry: EntryKind,
    pub kind: DealKind,
    pub symbol: String,
    pub volume: Decimal,
    pub price: Decimal,
    pub commission: Decimal,
    pub swap: Decimal,
    pub profit: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// A validated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub position_id: u64,
    pub time: DateTime<Utc>,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// An immutable snapshot of the account history for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub deals: Vec<RawDeal>,
    #[serde(default)]
    pub orders: Vec<RawOrder>,
}

impl Snapshot {
    pub fn new(deals: Vec<RawDeal>, orders: Vec<RawOrder>) -> Self {
        Self { deals, orders }
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}

/// An inclusive range of UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The window covering the `days_back` days before `end`, plus `end` itself.
    pub fn trailing(end: NaiveDate, days_back: u32) -> Self {
        let start = end - chrono::Duration::days(i64::from(days_back));
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains_time(&self, time: DateTime<Utc>) -> bool {
        self.contains(time.date_naive())
    }
}
