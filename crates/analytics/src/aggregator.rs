//! Daily and per-symbol summaries of closed positions.
//!
//! Grouping is explicit: a `BTreeMap` from the composite key to a
//! `SummaryAccumulator`, one declared reduction per field. Every mean and
//! ratio guards its empty case and resolves to zero.

use crate::position::ClosedPosition;
use chrono::NaiveDate;
use core_types::Direction;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Statistics over one group of closed positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub trade_count: usize,
    pub profitable_count: usize,
    pub losing_count: usize,

    pub total_volume: Decimal,
    pub max_volume: Decimal,
    pub min_volume: Decimal,

    /// Sum of profit + commission + swap.
    pub total_profit: Decimal,
    /// Sum of raw profit only.
    pub pure_profit: Decimal,
    pub commission: Decimal,
    pub swap: Decimal,

    #[serde(with = "humantime_serde")]
    pub avg_holding: Duration,
    #[serde(with = "humantime_serde")]
    pub max_holding: Duration,
    #[serde(with = "humantime_serde")]
    pub min_holding: Duration,

    pub avg_price_change: Decimal,
    pub max_price_change: Decimal,
    pub min_price_change: Decimal,

    pub buy_count: usize,
    pub sell_count: usize,

    /// Percentage of positions with positive profit.
    pub win_rate: Decimal,
    /// Mean price change of profitable positions.
    pub avg_profit_points: Decimal,
    /// Mean price change of non-profitable positions.
    pub avg_loss_points: Decimal,
    /// `avg_profit_points / avg_loss_points`, zero when the denominator is.
    pub profit_loss_ratio: Decimal,
}

/// Folds positions one at a time.
#[derive(Debug, Clone, Default)]
pub struct SummaryAccumulator {
    count: usize,
    profitable: usize,
    total_volume: Decimal,
    max_volume: Option<Decimal>,
    min_volume: Option<Decimal>,
    total_profit: Decimal,
    pure_profit: Decimal,
    commission: Decimal,
    swap: Decimal,
    total_holding_secs: u64,
    max_holding: Duration,
    min_holding: Option<Duration>,
    total_price_change: Decimal,
    max_price_change: Option<Decimal>,
    min_price_change: Option<Decimal>,
    buy_count: usize,
    sell_count: usize,
    profit_points: Decimal,
    loss_points: Decimal,
}

fn fold_max(current: Option<Decimal>, value: Decimal) -> Option<Decimal> {
    Some(current.map_or(value, |c| c.max(value)))
}

fn fold_min(current: Option<Decimal>, value: Decimal) -> Option<Decimal> {
    Some(current.map_or(value, |c| c.min(value)))
}

/// `total / count`, or zero for an empty group.
fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

impl SummaryAccumulator {
    pub fn push(&mut self, position: &ClosedPosition) {
        self.count += 1;

        self.total_volume += position.volume;
        self.max_volume = fold_max(self.max_volume, position.volume);
        self.min_volume = fold_min(self.min_volume, position.volume);

        self.total_profit += position.total_profit;
        self.pure_profit += position.profit;
        self.commission += position.commission;
        self.swap += position.swap;

        self.total_holding_secs += position.holding_secs();
        self.max_holding = self.max_holding.max(position.holding_duration);
        self.min_holding = Some(
            self.min_holding
                .map_or(position.holding_duration, |m| m.min(position.holding_duration)),
        );

        self.total_price_change += position.price_change;
        self.max_price_change = fold_max(self.max_price_change, position.price_change);
        self.min_price_change = fold_min(self.min_price_change, position.price_change);

        match position.direction {
            Direction::Buy => self.buy_count += 1,
            Direction::Sell => self.sell_count += 1,
        }

        if position.is_profitable {
            self.profitable += 1;
            self.profit_points += position.price_change;
        } else {
            self.loss_points += position.price_change;
        }
    }

    pub fn finish(&self) -> SummaryStats {
        let losing = self.count - self.profitable;
        let avg_profit_points = mean(self.profit_points, self.profitable);
        let avg_loss_points = mean(self.loss_points, losing);
        let profit_loss_ratio = if avg_loss_points > Decimal::ZERO {
            avg_profit_points / avg_loss_points
        } else {
            Decimal::ZERO
        };
        let win_rate = if self.count == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(self.profitable) / Decimal::from(self.count) * dec!(100)
        };
        let avg_holding_secs = if self.count == 0 {
            0
        } else {
            self.total_holding_secs / self.count as u64
        };

        SummaryStats {
            trade_count: self.count,
            profitable_count: self.profitable,
            losing_count: losing,
            total_volume: self.total_volume,
            max_volume: self.max_volume.unwrap_or_default(),
            min_volume: self.min_volume.unwrap_or_default(),
            total_profit: self.total_profit,
            pure_profit: self.pure_profit,
            commission: self.commission,
            swap: self.swap,
            avg_holding: Duration::from_secs(avg_holding_secs),
            max_holding: self.max_holding,
            min_holding: self.min_holding.unwrap_or_default(),
            avg_price_change: mean(self.total_price_change, self.count),
            max_price_change: self.max_price_change.unwrap_or_default(),
            min_price_change: self.min_price_change.unwrap_or_default(),
            buy_count: self.buy_count,
            sell_count: self.sell_count,
            win_rate,
            avg_profit_points,
            avg_loss_points,
            profit_loss_ratio,
        }
    }
}

/// Summarizes any collection of positions in one pass.
pub fn summarize<'a>(positions: impl IntoIterator<Item = &'a ClosedPosition>) -> SummaryStats {
    let mut accumulator = SummaryAccumulator::default();
    for position in positions {
        accumulator.push(position);
    }
    accumulator.finish()
}

/// Summary for one (close date, symbol) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySymbolSummary {
    pub date: NaiveDate,
    pub symbol: String,
    #[serde(flatten)]
    pub stats: SummaryStats,
}

/// Summary for one close date across all symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub stats: SummaryStats,
}

/// Groups by (close date, symbol); sorted by date then symbol.
pub fn daily_symbol_summaries(positions: &[ClosedPosition]) -> Vec<DailySymbolSummary> {
    let mut groups: BTreeMap<(NaiveDate, &str), SummaryAccumulator> = BTreeMap::new();
    for position in positions {
        groups
            .entry((position.close_date(), position.symbol.as_str()))
            .or_default()
            .push(position);
    }
    groups
        .into_iter()
        .map(|((date, symbol), accumulator)| DailySymbolSummary {
            date,
            symbol: symbol.to_string(),
            stats: accumulator.finish(),
        })
        .collect()
}

/// Groups by close date alone; sorted by date.
pub fn daily_summaries(positions: &[ClosedPosition]) -> Vec<DailySummary> {
    let mut groups: BTreeMap<NaiveDate, SummaryAccumulator> = BTreeMap::new();
    for position in positions {
        groups.entry(position.close_date()).or_default().push(position);
    }
    groups
        .into_iter()
        .map(|(date, accumulator)| DailySummary {
            date,
            stats: accumulator.finish(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_resolves_everything_to_zero() {
        let stats = SummaryAccumulator::default().finish();
        assert_eq!(stats.trade_count, 0);
        assert_eq!(stats.win_rate, Decimal::ZERO);
        assert_eq!(stats.profit_loss_ratio, Decimal::ZERO);
        assert_eq!(stats.avg_holding, Duration::ZERO);
        assert_eq!(stats.min_volume, Decimal::ZERO);
    }

    #[test]
    fn mean_guards_empty_groups() {
        assert_eq!(mean(dec!(10), 0), Decimal::ZERO);
        assert_eq!(mean(dec!(10), 4), dec!(2.5));
    }
}
