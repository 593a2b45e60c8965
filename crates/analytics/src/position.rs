use chrono::{DateTime, NaiveDate, Utc};
use core_types::{CloseReason, Direction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A completed position reconstructed from its deal group.
///
/// Built once by the matcher and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position_id: u64,
    pub symbol: String,
    pub direction: Direction,
    /// Volume of the opening deal.
    pub volume: Decimal,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open_price: Decimal,
    pub close_price: Decimal,
    /// Levels in effect at close; `None` when never set.
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub reference_price: Option<Decimal>,
    pub slippage: Decimal,
    pub close_reason: CloseReason,
    // Summed over every deal of the group.
    pub profit: Decimal,
    pub commission: Decimal,
    pub swap: Decimal,
    pub total_profit: Decimal,
    #[serde(with = "humantime_serde")]
    pub holding_duration: Duration,
    /// |close_price - open_price|
    pub price_change: Decimal,
    pub is_profitable: bool,
    /// Number of OUT deals collapsed into this position.
    pub close_legs: usize,
}

impl ClosedPosition {
    /// The UTC calendar day the position closed on; the grouping key for
    /// the equity curve and daily summaries.
    pub fn close_date(&self) -> NaiveDate {
        self.close_time.date_naive()
    }

    pub fn holding_secs(&self) -> u64 {
        self.holding_duration.as_secs()
    }
}
