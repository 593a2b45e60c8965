use serde::{Deserialize, Serialize};

/// Whether a deal opens or closes exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    In,
    Out,
}

/// The kind of a deal as reported by the account history.
///
/// `Balance` and `Credit` deals are account movements (deposits, withdrawals,
/// credit adjustments) and never take part in position matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealKind {
    Buy,
    Sell,
    Balance,
    Credit,
}

impl DealKind {
    /// Returns true for deals that move the account balance instead of trading.
    pub fn is_balance_movement(&self) -> bool {
        matches!(self, DealKind::Balance | DealKind::Credit)
    }

    /// The trade direction of a BUY/SELL deal, `None` for balance movements.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            DealKind::Buy => Some(Direction::Buy),
            DealKind::Sell => Some(Direction::Sell),
            DealKind::Balance | DealKind::Credit => None,
        }
    }
}

/// The direction of a closed position, taken from its opening deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
}

/// How a position was closed, inferred from the stop-loss/take-profit in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Market,
}
