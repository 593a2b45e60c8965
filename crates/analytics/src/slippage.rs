//! Close-reason classification and slippage measurement.
//!
//! The feed carries no execution-reason field, so the reason is inferred from
//! the levels in effect at close: a set stop-loss wins over a set take-profit
//! even if the take-profit is what actually triggered. This is an approximation.

use core_types::CloseReason;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageAssessment {
    pub close_reason: CloseReason,
    /// The stop-loss or take-profit price the close is measured against.
    pub reference_price: Option<Decimal>,
    /// Always >= 0; zero for market closes.
    pub slippage: Decimal,
}

/// Classifies a close at `close_price` given the resolved levels (zero = unset).
pub fn classify(close_price: Decimal, stop_loss: Decimal, take_profit: Decimal) -> SlippageAssessment {
    let (close_reason, reference_price) = if !stop_loss.is_zero() {
        (CloseReason::StopLoss, Some(stop_loss))
    } else if !take_profit.is_zero() {
        (CloseReason::TakeProfit, Some(take_profit))
    } else {
        (CloseReason::Market, None)
    };

    let slippage = reference_price
        .map(|reference| (close_price - reference).abs())
        .unwrap_or(Decimal::ZERO);

    SlippageAssessment {
        close_reason,
        reference_price,
        slippage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn no_levels_is_a_market_close_without_slippage() {
        let assessment = classify(dec!(1.2050), dec!(0), dec!(0));
        assert_eq!(assessment.close_reason, CloseReason::Market);
        assert_eq!(assessment.reference_price, None);
        assert_eq!(assessment.slippage, Decimal::ZERO);
    }

    #[test]
    fn stop_loss_slippage_is_absolute_distance() {
        let assessment = classify(dec!(1.2105), dec!(1.2100), dec!(0));
        assert_eq!(assessment.close_reason, CloseReason::StopLoss);
        assert_eq!(assessment.reference_price, Some(dec!(1.2100)));
        assert_eq!(assessment.slippage, dec!(0.0005));
    }

    #[test]
    fn take_profit_used_when_no_stop_loss() {
        let assessment = classify(dec!(1.0990), dec!(0), dec!(1.1000));
        assert_eq!(assessment.close_reason, CloseReason::TakeProfit);
        assert_eq!(assessment.slippage, dec!(0.0010));
    }

    #[test]
    fn stop_loss_takes_priority_over_take_profit() {
        let assessment = classify(dec!(1.3000), dec!(1.2000), dec!(1.3000));
        assert_eq!(assessment.close_reason, CloseReason::StopLoss);
        assert_eq!(assessment.slippage, dec!(0.1000));
    }
}
