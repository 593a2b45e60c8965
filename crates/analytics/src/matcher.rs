//! Groups deals by position id and builds `ClosedPosition`s from completed groups.
//!
//! Matching policy:
//! - a group is completed when it has at least two deals, at least one IN and
//!   at least one OUT; anything else is incomplete and skipped;
//! - the opening record is the earliest IN deal, the closing record the latest
//!   OUT deal (feed order breaks time ties);
//! - profit, commission and swap are summed over every deal of the group.
//!
//! A position closed in several partial fills is collapsed into one
//! `ClosedPosition` whose close price, and therefore slippage, come from the
//! last OUT deal only. The feed does not tell partial-close legs apart, so
//! this approximation is kept as is.

use crate::position::ClosedPosition;
use crate::sink::DiagnosticSink;
use crate::slippage::classify;
use core_types::{Deal, Direction, EntryKind};
use events::{Diagnostic, DiagnosticKind};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Result of a matching pass.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Ordered by close time, then position id.
    pub positions: Vec<ClosedPosition>,
    /// Groups skipped for lacking an IN or an OUT deal.
    pub incomplete: usize,
}

/// Groups deals by `position_id`, preserving feed order inside each group.
pub fn group_by_position(deals: &[Deal]) -> BTreeMap<u64, Vec<&Deal>> {
    let mut groups: BTreeMap<u64, Vec<&Deal>> = BTreeMap::new();
    for deal in deals {
        groups.entry(deal.position_id).or_default().push(deal);
    }
    groups
}

/// Builds one `ClosedPosition` from a deal group, or `None` if the group is incomplete.
pub fn build_position(group: &[&Deal]) -> Option<ClosedPosition> {
    if group.len() < 2 {
        return None;
    }

    let open = group
        .iter()
        .filter(|d| d.entry == EntryKind::In)
        .min_by_key(|d| d.time)?;
    let close = group
        .iter()
        .filter(|d| d.entry == EntryKind::Out)
        .max_by_key(|d| d.time)?;
    let close_legs = group.iter().filter(|d| d.entry == EntryKind::Out).count();

    // Balance movements never reach the matcher, so this only guards bad input.
    let direction: Direction = open.kind.direction()?;

    let profit: Decimal = group.iter().map(|d| d.profit).sum();
    let commission: Decimal = group.iter().map(|d| d.commission).sum();
    let swap: Decimal = group.iter().map(|d| d.swap).sum();

    let assessment = classify(close.price, close.stop_loss, close.take_profit);
    let holding_duration = (close.time - open.time).to_std().unwrap_or_default();

    Some(ClosedPosition {
        position_id: open.position_id,
        symbol: open.symbol.clone(),
        direction,
        volume: open.volume,
        open_time: open.time,
        close_time: close.time,
        open_price: open.price,
        close_price: close.price,
        stop_loss: non_zero(close.stop_loss),
        take_profit: non_zero(close.take_profit),
        reference_price: assessment.reference_price,
        slippage: assessment.slippage,
        close_reason: assessment.close_reason,
        profit,
        commission,
        swap,
        total_profit: profit + commission + swap,
        holding_duration,
        price_change: (close.price - open.price).abs(),
        is_profitable: profit > Decimal::ZERO,
        close_legs,
    })
}

fn non_zero(value: Decimal) -> Option<Decimal> {
    if value.is_zero() { None } else { Some(value) }
}

/// Matches every position in the feed.
pub fn match_positions(deals: &[Deal], sink: &dyn DiagnosticSink) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for (position_id, group) in group_by_position(deals) {
        let Some(position) = build_position(&group) else {
            outcome.incomplete += 1;
            sink.record(
                Diagnostic::debug(
                    DiagnosticKind::IncompletePosition,
                    format!("skipped incomplete position with {} deal(s)", group.len()),
                )
                .with_position(position_id),
            );
            continue;
        };

        if position.close_legs > 1 {
            sink.record(
                Diagnostic::info(
                    DiagnosticKind::PartialCloseCollapsed,
                    format!(
                        "{} closing deals collapsed; slippage measured on the last one",
                        position.close_legs
                    ),
                )
                .with_position(position_id),
            );
        }

        sink.record(
            Diagnostic::debug(
                DiagnosticKind::PositionBuilt,
                format!(
                    "{} {:?} open {} close {} sl {:?} tp {:?} slippage {} close {:?}",
                    position.symbol,
                    position.direction,
                    position.open_price,
                    position.close_price,
                    position.stop_loss,
                    position.take_profit,
                    position.slippage,
                    position.close_reason,
                ),
            )
            .with_position(position_id),
        );
        outcome.positions.push(position);
    }

    outcome
        .positions
        .sort_by(|a, b| a.close_time.cmp(&b.close_time).then(a.position_id.cmp(&b.position_id)));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, NullSink};
    use chrono::{DateTime, Utc};
    use core_types::{CloseReason, DealKind};
    use rust_decimal_macros::dec;

    const T0: i64 = 1_704_067_200;

    fn deal(position_id: u64, offset: i64, entry: EntryKind, kind: DealKind, price: Decimal) -> Deal {
        Deal {
            position_id,
            time: DateTime::<Utc>::from_timestamp(T0 + offset, 0).unwrap(),
            entry,
            kind,
            symbol: "EURUSD".to_string(),
            volume: dec!(1),
            price,
            commission: Decimal::ZERO,
            swap: Decimal::ZERO,
            profit: Decimal::ZERO,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
        }
    }

    #[test]
    fn single_deal_group_never_produces_a_position() {
        let deals = vec![deal(1, 0, EntryKind::In, DealKind::Buy, dec!(1.2))];
        let outcome = match_positions(&deals, &NullSink);
        assert!(outcome.positions.is_empty());
        assert_eq!(outcome.incomplete, 1);
    }

    #[test]
    fn two_ins_without_out_are_incomplete() {
        let deals = vec![
            deal(1, 0, EntryKind::In, DealKind::Buy, dec!(1.2)),
            deal(1, 60, EntryKind::In, DealKind::Buy, dec!(1.21)),
        ];
        let sink = MemorySink::new();
        let outcome = match_positions(&deals, &sink);
        assert!(outcome.positions.is_empty());
        assert_eq!(outcome.incomplete, 1);
        let records = sink.into_records();
        assert_eq!(records[0].kind, DiagnosticKind::IncompletePosition);
        assert_eq!(records[0].position_id, Some(1));
    }

    #[test]
    fn open_is_earliest_in_and_close_is_latest_out() {
        let mut first_out = deal(9, 600, EntryKind::Out, DealKind::Sell, dec!(1.2030));
        first_out.profit = dec!(15);
        first_out.commission = dec!(-1);
        let mut last_out = deal(9, 1_200, EntryKind::Out, DealKind::Sell, dec!(1.2050));
        last_out.profit = dec!(25);
        last_out.swap = dec!(-0.5);
        let mut open = deal(9, 0, EntryKind::In, DealKind::Buy, dec!(1.2000));
        open.commission = dec!(-1);
        // Fed out of time order on purpose.
        let deals = vec![last_out, open, first_out];

        let sink = MemorySink::new();
        let outcome = match_positions(&deals, &sink);
        assert_eq!(outcome.positions.len(), 1);
        let position = &outcome.positions[0];
        assert_eq!(position.direction, Direction::Buy);
        assert_eq!(position.open_price, dec!(1.2000));
        assert_eq!(position.close_price, dec!(1.2050));
        assert_eq!(position.profit, dec!(40));
        assert_eq!(position.commission, dec!(-2));
        assert_eq!(position.swap, dec!(-0.5));
        assert_eq!(position.total_profit, dec!(37.5));
        assert_eq!(position.holding_secs(), 1_200);
        assert_eq!(position.close_legs, 2);
        assert_eq!(position.price_change, dec!(0.0050));
        assert!(position.is_profitable);

        let kinds: Vec<DiagnosticKind> = sink.records().iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&DiagnosticKind::PartialCloseCollapsed));
    }

    #[test]
    fn out_before_in_clamps_holding_time_to_zero() {
        let deals = vec![
            deal(3, 600, EntryKind::In, DealKind::Sell, dec!(1.3)),
            deal(3, 0, EntryKind::Out, DealKind::Buy, dec!(1.29)),
        ];
        let outcome = match_positions(&deals, &NullSink);
        assert_eq!(outcome.positions[0].holding_secs(), 0);
        assert_eq!(outcome.positions[0].direction, Direction::Sell);
    }

    #[test]
    fn close_levels_drive_the_close_reason() {
        let mut open = deal(4, 0, EntryKind::In, DealKind::Sell, dec!(1.2000));
        open.stop_loss = dec!(1.2100);
        let mut close = deal(4, 60, EntryKind::Out, DealKind::Buy, dec!(1.2105));
        close.stop_loss = dec!(1.2100);
        close.profit = dec!(-105);

        let outcome = match_positions(&[open, close], &NullSink);
        let position = &outcome.positions[0];
        assert_eq!(position.close_reason, CloseReason::StopLoss);
        assert_eq!(position.stop_loss, Some(dec!(1.2100)));
        assert_eq!(position.take_profit, None);
        assert_eq!(position.slippage, dec!(0.0005));
        assert!(!position.is_profitable);
    }

    #[test]
    fn positions_are_ordered_by_close_time() {
        let deals = vec![
            deal(1, 0, EntryKind::In, DealKind::Buy, dec!(1)),
            deal(1, 900, EntryKind::Out, DealKind::Sell, dec!(1)),
            deal(2, 0, EntryKind::In, DealKind::Buy, dec!(1)),
            deal(2, 300, EntryKind::Out, DealKind::Sell, dec!(1)),
        ];
        let outcome = match_positions(&deals, &NullSink);
        let ids: Vec<u64> = outcome.positions.iter().map(|p| p.position_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
