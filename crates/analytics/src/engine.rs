use crate::aggregator::{daily_summaries, daily_symbol_summaries};
use crate::equity::{EquityCurve, build_equity_curve};
use crate::error::AnalyticsError;
use crate::matcher::match_positions;
use crate::normalizer::normalize;
use crate::report::{AnalysisReport, AnalysisStatus, NoDataReason};
use crate::sink::DiagnosticSink;
use core_types::{Snapshot, Window};
use events::{Diagnostic, DiagnosticKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A stateless calculator that turns one account snapshot into closed-position analytics.
///
/// Holds only its parameters, so one engine can serve any number of
/// concurrent runs; each call owns its input snapshot and its output report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsEngine {
    initial_equity: Decimal,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            initial_equity: dec!(10000),
        }
    }
}

impl AnalyticsEngine {
    /// Creates an engine whose equity curve starts at `initial_equity`.
    pub fn new(initial_equity: Decimal) -> Result<Self, AnalyticsError> {
        if initial_equity <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidParameter {
                name: "initial_equity",
                reason: format!("must be greater than 0, got {}", initial_equity),
            });
        }
        Ok(Self { initial_equity })
    }

    pub fn initial_equity(&self) -> Decimal {
        self.initial_equity
    }

    /// The main entry point.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Raw deals and orders for the account.
    /// * `window` - Inclusive UTC date range; deals dated outside it are ignored.
    /// * `sink` - Receives diagnostics; the engine never prints.
    ///
    /// # Returns
    ///
    /// An `AnalysisReport`. An empty feed or a feed without completed positions
    /// is not an error: the report's status says `NoTrades`.
    pub fn analyze(
        &self,
        snapshot: &Snapshot,
        window: Window,
        sink: &dyn DiagnosticSink,
    ) -> Result<AnalysisReport, AnalyticsError> {
        let window = Window::new(window.start, window.end)?;

        let feed = normalize(snapshot, &window, sink);
        if snapshot.is_empty() {
            return Ok(self.no_trades(window, feed.validation, NoDataReason::EmptyFeed, sink));
        }

        let matched = match_positions(&feed.deals, sink);
        if matched.positions.is_empty() {
            return Ok(self.no_trades(
                window,
                feed.validation,
                NoDataReason::NoCompletedPositions,
                sink,
            ));
        }

        let equity_curve =
            build_equity_curve(&matched.positions, &feed.balance_events, self.initial_equity);
        sink.record(Diagnostic::info(
            DiagnosticKind::EquitySummary,
            format!(
                "initial equity {} final equity {} total return {}% max drawdown {}%",
                equity_curve.initial_equity.round_dp(2),
                equity_curve.final_equity.round_dp(2),
                equity_curve.total_return_pct.round_dp(2),
                equity_curve.max_drawdown_pct.round_dp(2),
            ),
        ));

        let daily_symbol_summaries = daily_symbol_summaries(&matched.positions);
        let daily_summaries = daily_summaries(&matched.positions);

        Ok(AnalysisReport {
            status: AnalysisStatus::Completed,
            window,
            validation: feed.validation,
            closed_positions: matched.positions,
            equity_curve,
            daily_symbol_summaries,
            daily_summaries,
        })
    }

    fn no_trades(
        &self,
        window: Window,
        validation: crate::normalizer::ValidationSummary,
        reason: NoDataReason,
        sink: &dyn DiagnosticSink,
    ) -> AnalysisReport {
        sink.record(Diagnostic::info(
            DiagnosticKind::NoData,
            format!("no completed trades between {} and {} ({:?})", window.start, window.end, reason),
        ));
        AnalysisReport {
            status: AnalysisStatus::NoTrades(reason),
            window,
            validation,
            closed_positions: Vec::new(),
            equity_curve: EquityCurve::flat(self.initial_equity),
            daily_symbol_summaries: Vec::new(),
            daily_summaries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;
    use chrono::NaiveDate;

    fn window() -> Window {
        Window::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_positive_initial_equity() {
        assert!(matches!(
            AnalyticsEngine::new(dec!(0)),
            Err(AnalyticsError::InvalidParameter { name: "initial_equity", .. })
        ));
        assert!(AnalyticsEngine::new(dec!(-1)).is_err());
    }

    #[test]
    fn default_engine_starts_at_ten_thousand() {
        assert_eq!(AnalyticsEngine::default().initial_equity(), dec!(10000));
    }

    #[test]
    fn empty_feed_is_a_no_trades_report() {
        let report = AnalyticsEngine::default()
            .analyze(&Snapshot::default(), window(), &NullSink)
            .unwrap();
        assert_eq!(report.status, AnalysisStatus::NoTrades(NoDataReason::EmptyFeed));
        assert!(report.closed_positions.is_empty());
        assert_eq!(report.equity_curve.final_equity, dec!(10000));
        assert!(matches!(report.require_trades(), Err(AnalyticsError::NoData(_))));
    }

    #[test]
    fn reversed_window_is_an_error() {
        let reversed = Window {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let result = AnalyticsEngine::default().analyze(&Snapshot::default(), reversed, &NullSink);
        assert!(matches!(result, Err(AnalyticsError::InvalidWindow(_))));
    }
}
