//! Equity curve and maximum drawdown.
//!
//! Replays daily balance movements and trading results in date order. The
//! drawdown baseline ignores deposits (fresh capital must not hide a
//! drawdown) and is rescaled proportionally on withdrawals so the drawdown
//! percentage stays continuous across them.

use crate::position::ClosedPosition;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net deposit (positive) or withdrawal (negative) on one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEvent {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// The account state at the end of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub trading_pnl: Decimal,
    pub balance_delta: Decimal,
    pub equity: Decimal,
    /// Cumulative return against the initial equity, in percent.
    pub return_pct: Decimal,
    /// Drawdown baseline after this day's update.
    pub baseline: Decimal,
    pub drawdown_pct: Decimal,
}

/// The full curve plus its headline statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    pub total_return_pct: Decimal,
    pub max_drawdown_pct: Decimal,
}

impl EquityCurve {
    /// A curve with no points: nothing happened, equity never moved.
    pub fn flat(initial_equity: Decimal) -> Self {
        Self {
            points: Vec::new(),
            initial_equity,
            final_equity: initial_equity,
            total_return_pct: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
        }
    }

    /// Points dated on or before `date`.
    pub fn up_to(&self, date: NaiveDate) -> &[EquityPoint] {
        let end = self.points.partition_point(|p| p.date <= date);
        &self.points[..end]
    }
}

/// Running state of the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawdownTracker {
    pub equity: Decimal,
    pub baseline: Decimal,
    pub max_drawdown_pct: Decimal,
}

impl DrawdownTracker {
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            equity: initial_equity,
            baseline: initial_equity,
            max_drawdown_pct: Decimal::ZERO,
        }
    }

    /// Applies one day and returns that day's drawdown percentage.
    pub fn apply_day(&mut self, balance_delta: Decimal, trading_pnl: Decimal) -> Decimal {
        self.equity += balance_delta + trading_pnl;

        if balance_delta >= Decimal::ZERO {
            self.baseline = self.baseline.max(self.equity - balance_delta);
        } else {
            // Equity before the withdrawal left the account.
            let before_withdrawal = self.equity - balance_delta;
            self.baseline = if before_withdrawal.is_zero() {
                self.equity
            } else {
                (self.baseline * self.equity / before_withdrawal).max(self.equity)
            };
        }

        let drawdown = drawdown_pct(self.baseline, self.equity);
        self.max_drawdown_pct = self.max_drawdown_pct.max(drawdown);
        drawdown
    }
}

/// `(baseline - equity) / baseline * 100`, clamped into [0, 100]; zero when
/// the baseline is not positive.
pub fn drawdown_pct(baseline: Decimal, equity: Decimal) -> Decimal {
    if baseline <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((baseline - equity) / baseline * dec!(100)).clamp(Decimal::ZERO, dec!(100))
}

fn return_pct(equity: Decimal, initial_equity: Decimal) -> Decimal {
    if initial_equity.is_zero() {
        return Decimal::ZERO;
    }
    (equity / initial_equity - Decimal::ONE) * dec!(100)
}

/// Builds the curve over the union of close dates and balance-event dates.
///
/// `initial_equity` must be positive; the engine validates it before calling.
pub fn build_equity_curve(
    positions: &[ClosedPosition],
    balance_events: &[BalanceEvent],
    initial_equity: Decimal,
) -> EquityCurve {
    // date -> (balance delta, trading pnl)
    let mut days: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for event in balance_events {
        days.entry(event.date).or_default().0 += event.amount;
    }
    for position in positions {
        days.entry(position.close_date()).or_default().1 += position.total_profit;
    }

    let mut tracker = DrawdownTracker::new(initial_equity);
    let points: Vec<EquityPoint> = days
        .into_iter()
        .map(|(date, (balance_delta, trading_pnl))| {
            let drawdown = tracker.apply_day(balance_delta, trading_pnl);
            EquityPoint {
                date,
                trading_pnl,
                balance_delta,
                equity: tracker.equity,
                return_pct: return_pct(tracker.equity, initial_equity),
                baseline: tracker.baseline,
                drawdown_pct: drawdown,
            }
        })
        .collect();

    EquityCurve {
        points,
        initial_equity,
        final_equity: tracker.equity,
        total_return_pct: return_pct(tracker.equity, initial_equity),
        max_drawdown_pct: tracker.max_drawdown_pct,
    }
}
