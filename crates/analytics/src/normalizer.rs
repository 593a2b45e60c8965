//! Converts raw feed records into validated `Deal`s, `Order`s and daily
//! balance events, attaching each deal's resolved stop-loss/take-profit.

use crate::equity::BalanceEvent;
use crate::sink::DiagnosticSink;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Deal, EntryKind, Order, RawDeal, RawOrder, Snapshot, Window};
use events::{Diagnostic, DiagnosticKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The stop-loss/take-profit in effect for one position. Zero means unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectiveLevels {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

impl ProtectiveLevels {
    /// Applies a later order on top of the current levels. Only non-zero
    /// fields overwrite, independently for each level.
    pub fn overlay(&mut self, stop_loss: Decimal, take_profit: Decimal) {
        if !stop_loss.is_zero() {
            self.stop_loss = stop_loss;
        }
        if !take_profit.is_zero() {
            self.take_profit = take_profit;
        }
    }
}

/// Aggregate account of what the normalizer accepted and why it dropped the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_deals: usize,
    /// Trade (BUY/SELL) deals handed to the matcher.
    pub accepted_deals: usize,
    /// BALANCE/CREDIT deals turned into balance events.
    pub balance_deals: usize,
    /// Deals excluded because a mandatory field was missing.
    pub rejected_deals: usize,
    pub missing_position_id: usize,
    pub missing_time: usize,
    pub missing_price: usize,
    /// Valid deals dated outside the analysis window.
    pub outside_window: usize,
    pub total_orders: usize,
    pub accepted_orders: usize,
    pub rejected_orders: usize,
}

impl ValidationSummary {
    pub fn has_rejections(&self) -> bool {
        self.rejected_deals > 0 || self.rejected_orders > 0
    }
}

/// The normalizer's output: everything downstream stages consume.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFeed {
    /// BUY/SELL deals inside the window, sl/tp resolved, in feed order.
    pub deals: Vec<Deal>,
    /// Net balance movement per UTC day, ascending by date.
    pub balance_events: Vec<BalanceEvent>,
    pub validation: ValidationSummary,
}

fn timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
}

/// Validates raw orders. Orders missing `position_id` or `time` are dropped.
pub fn normalize_orders(raw: &[RawOrder], summary: &mut ValidationSummary) -> Vec<Order> {
    summary.total_orders += raw.len();
    let mut orders = Vec::with_capacity(raw.len());
    for order in raw {
        match (order.position_id, order.time.and_then(timestamp)) {
            (Some(position_id), Some(time)) => orders.push(Order {
                position_id,
                time,
                stop_loss: order.stop_loss,
                take_profit: order.take_profit,
            }),
            _ => summary.rejected_orders += 1,
        }
    }
    summary.accepted_orders += orders.len();
    orders
}

/// Builds the position id -> protective levels lookup.
///
/// Orders are replayed in time order (stable for equal times); for each
/// position the last non-zero stop-loss and the last non-zero take-profit win.
pub fn resolve_levels(orders: &[Order]) -> HashMap<u64, ProtectiveLevels> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by_key(|o| o.time);

    let mut levels: HashMap<u64, ProtectiveLevels> = HashMap::new();
    for order in sorted {
        levels
            .entry(order.position_id)
            .or_default()
            .overlay(order.stop_loss, order.take_profit);
    }
    levels
}

/// Sums balance movements per UTC day.
pub fn daily_balance_events(
    movements: impl IntoIterator<Item = (NaiveDate, Decimal)>,
) -> Vec<BalanceEvent> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (date, amount) in movements {
        *by_date.entry(date).or_default() += amount;
    }
    by_date
        .into_iter()
        .map(|(date, amount)| BalanceEvent { date, amount })
        .collect()
}

/// Runs the full normalization over one snapshot.
///
/// Trade deals need `position_id`, `time` and `price`; balance movements only
/// need `time` since they never enter matching. Exclusions are reported once,
/// in aggregate, through the sink.
pub fn normalize(snapshot: &Snapshot, window: &Window, sink: &dyn DiagnosticSink) -> NormalizedFeed {
    let mut validation = ValidationSummary::default();
    let orders = normalize_orders(&snapshot.orders, &mut validation);
    let levels = resolve_levels(&orders);

    validation.total_deals = snapshot.deals.len();
    let mut deals = Vec::with_capacity(snapshot.deals.len());
    let mut movements = Vec::new();

    for raw in &snapshot.deals {
        if raw.kind.is_balance_movement() {
            normalize_balance_deal(raw, window, &mut validation, &mut movements);
            continue;
        }

        let Some(deal) = validate_trade_deal(raw, &mut validation) else {
            continue;
        };
        if !window.contains_time(deal.time) {
            validation.outside_window += 1;
            continue;
        }
        let resolved = levels.get(&deal.position_id).copied().unwrap_or_default();
        deals.push(Deal {
            stop_loss: resolved.stop_loss,
            take_profit: resolved.take_profit,
            ..deal
        });
    }
    validation.accepted_deals = deals.len();

    if validation.has_rejections() {
        sink.record(Diagnostic::warn(
            DiagnosticKind::Validation,
            format!(
                "excluded {} deal(s) and {} order(s) with missing mandatory fields \
                 (position_id: {}, time: {}, price: {})",
                validation.rejected_deals,
                validation.rejected_orders,
                validation.missing_position_id,
                validation.missing_time,
                validation.missing_price,
            ),
        ));
    }

    NormalizedFeed {
        deals,
        balance_events: daily_balance_events(movements),
        validation,
    }
}

fn normalize_balance_deal(
    raw: &RawDeal,
    window: &Window,
    validation: &mut ValidationSummary,
    movements: &mut Vec<(NaiveDate, Decimal)>,
) {
    let Some(time) = raw.time.and_then(timestamp) else {
        validation.missing_time += 1;
        validation.rejected_deals += 1;
        return;
    };
    if !window.contains_time(time) {
        validation.outside_window += 1;
        return;
    }
    // Only IN balance deals are deposits/withdrawals.
    if raw.entry == EntryKind::In {
        validation.balance_deals += 1;
        movements.push((time.date_naive(), raw.profit));
    }
}

fn validate_trade_deal(raw: &RawDeal, validation: &mut ValidationSummary) -> Option<Deal> {
    let time = raw.time.and_then(timestamp);
    if raw.position_id.is_none() {
        validation.missing_position_id += 1;
    }
    if time.is_none() {
        validation.missing_time += 1;
    }
    if raw.price.is_none() {
        validation.missing_price += 1;
    }

    match (raw.position_id, time, raw.price) {
        (Some(position_id), Some(time), Some(price)) => Some(Deal {
            position_id,
            time,
            entry: raw.entry,
            kind: raw.kind,
            symbol: raw.symbol.clone(),
            volume: raw.volume,
            price,
            commission: raw.commission,
            swap: raw.swap,
            profit: raw.profit,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
        }),
        _ => {
            validation.rejected_deals += 1;
            None
        }
    }
}
