//! Property tests for the analytics guarantees.
//!
//! 1. Slippage is never negative, and market closes have none.
//! 2. total_profit is exactly profit + commission + swap.
//! 3. Win rate stays in [0, 100] and the profit/loss ratio is never negative.
//! 4. Drawdown stays in [0, 100] whatever the sequence of days.
//! 5. Single-deal groups never produce a position.

use analytics::equity::{BalanceEvent, DrawdownTracker, build_equity_curve};
use analytics::matcher::{build_position, match_positions};
use analytics::slippage::classify;
use analytics::{NullSink, aggregator::summarize};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_types::{CloseReason, Deal, DealKind, EntryKind};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000).prop_map(|p| Decimal::new(p, 5))
}

fn arb_level() -> impl Strategy<Value = Decimal> {
    prop_oneof![Just(Decimal::ZERO), arb_price()]
}

fn arb_money() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|m| Decimal::new(m, 2))
}

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_709_251_200, 0).unwrap()
}

fn deal(position_id: u64, entry: EntryKind, kind: DealKind, offset_secs: i64, price: Decimal) -> Deal {
    Deal {
        position_id,
        time: base_time() + Duration::seconds(offset_secs),
        entry,
        kind,
        symbol: "EURUSD".to_string(),
        volume: dec!(0.1),
        price,
        commission: Decimal::ZERO,
        swap: Decimal::ZERO,
        profit: Decimal::ZERO,
        stop_loss: Decimal::ZERO,
        take_profit: Decimal::ZERO,
    }
}

prop_compose! {
    fn arb_round_trip(position_id: u64)(
        is_buy in any::<bool>(),
        open_price in arb_price(),
        close_price in arb_price(),
        hold_secs in 0i64..86_400,
        profit in arb_money(),
        commission in arb_money(),
        swap in arb_money(),
        stop_loss in arb_level(),
        take_profit in arb_level(),
    ) -> Vec<Deal> {
        let (open_kind, close_kind) = if is_buy {
            (DealKind::Buy, DealKind::Sell)
        } else {
            (DealKind::Sell, DealKind::Buy)
        };
        let open = Deal {
            commission,
            stop_loss,
            take_profit,
            ..deal(position_id, EntryKind::In, open_kind, 0, open_price)
        };
        let close = Deal {
            profit,
            swap,
            stop_loss,
            take_profit,
            ..deal(position_id, EntryKind::Out, close_kind, hold_secs, close_price)
        };
        vec![open, close]
    }
}

fn arb_positions() -> impl Strategy<Value = Vec<Vec<Deal>>> {
    prop::collection::vec(arb_round_trip(0), 0..40).prop_map(|groups| {
        groups
            .into_iter()
            .enumerate()
            .map(|(i, group)| {
                group
                    .into_iter()
                    .map(|d| Deal { position_id: i as u64 + 1, ..d })
                    .collect()
            })
            .collect()
    })
}

// ── 1. Slippage ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn slippage_is_never_negative(
        close in arb_price(),
        stop_loss in arb_level(),
        take_profit in arb_level(),
    ) {
        let assessment = classify(close, stop_loss, take_profit);
        prop_assert!(assessment.slippage >= Decimal::ZERO);
        if assessment.close_reason == CloseReason::Market {
            prop_assert_eq!(assessment.slippage, Decimal::ZERO);
            prop_assert!(stop_loss.is_zero() && take_profit.is_zero());
        }
    }
}

// ── 2. Profit additivity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn total_profit_is_additive(group in arb_round_trip(42)) {
        let refs: Vec<&Deal> = group.iter().collect();
        let position = build_position(&refs).unwrap();
        prop_assert_eq!(position.total_profit, position.profit + position.commission + position.swap);
        prop_assert!(position.price_change >= Decimal::ZERO);
        prop_assert_eq!(position.is_profitable, position.profit > Decimal::ZERO);
    }
}

// ── 3. Summary bounds ────────────────────────────────────────────────

proptest! {
    #[test]
    fn win_rate_and_ratio_are_bounded(groups in arb_positions()) {
        let deals: Vec<Deal> = groups.into_iter().flatten().collect();
        let outcome = match_positions(&deals, &NullSink);
        let stats = summarize(&outcome.positions);

        prop_assert!(stats.win_rate >= Decimal::ZERO && stats.win_rate <= dec!(100));
        prop_assert!(stats.profit_loss_ratio >= Decimal::ZERO);
        prop_assert_eq!(stats.trade_count, outcome.positions.len());
        prop_assert_eq!(stats.profitable_count + stats.losing_count, stats.trade_count);
        prop_assert_eq!(stats.buy_count + stats.sell_count, stats.trade_count);
    }
}

// ── 4. Drawdown bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_stays_within_bounds(
        initial in (1i64..1_000_000).prop_map(Decimal::from),
        days in prop::collection::vec((arb_money(), arb_money()), 0..60),
    ) {
        let mut tracker = DrawdownTracker::new(initial);
        for (balance_delta, trading_pnl) in days {
            let drawdown = tracker.apply_day(balance_delta, trading_pnl);
            prop_assert!(drawdown >= Decimal::ZERO && drawdown <= dec!(100));
            prop_assert!(tracker.max_drawdown_pct >= drawdown);
        }
        prop_assert!(tracker.max_drawdown_pct <= dec!(100));
    }

    #[test]
    fn equity_curve_is_reproducible(
        groups in arb_positions(),
        amounts in prop::collection::vec(arb_money(), 0..10),
    ) {
        let deals: Vec<Deal> = groups.into_iter().flatten().collect();
        let positions = match_positions(&deals, &NullSink).positions;
        let events: Vec<BalanceEvent> = amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| BalanceEvent {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(i as i64),
                amount,
            })
            .collect();

        let first = build_equity_curve(&positions, &events, dec!(10000));
        let second = build_equity_curve(&positions, &events, dec!(10000));
        prop_assert_eq!(&first, &second);

        let expected_final = dec!(10000)
            + positions.iter().map(|p| p.total_profit).sum::<Decimal>()
            + events.iter().map(|e| e.amount).sum::<Decimal>();
        prop_assert_eq!(first.final_equity, expected_final);
    }
}

// ── 5. Incomplete groups ─────────────────────────────────────────────

proptest! {
    #[test]
    fn single_deal_groups_never_build(
        is_in in any::<bool>(),
        price in arb_price(),
    ) {
        let entry = if is_in { EntryKind::In } else { EntryKind::Out };
        let lone = deal(9, entry, DealKind::Buy, 0, price);
        prop_assert!(build_position(&[&lone]).is_none());

        let outcome = match_positions(std::slice::from_ref(&lone), &NullSink);
        prop_assert!(outcome.positions.is_empty());
        prop_assert_eq!(outcome.incomplete, 1);
    }
}
