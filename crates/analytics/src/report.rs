use crate::aggregator::{DailySummary, DailySymbolSummary, SummaryStats};
use crate::equity::{EquityCurve, EquityPoint};
use crate::error::AnalyticsError;
use crate::normalizer::ValidationSummary;
use crate::position::ClosedPosition;
use chrono::NaiveDate;
use core_types::Window;
use events::JobSummary;
use serde::{Deserialize, Serialize};

/// Why a run had nothing to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoDataReason {
    /// The snapshot held no deals at all.
    EmptyFeed,
    /// Deals were present but no position group was completed in the window.
    NoCompletedPositions,
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason")]
pub enum AnalysisStatus {
    Completed,
    NoTrades(NoDataReason),
}

/// Everything the analytics core produces for one account window.
///
/// When `status` is `NoTrades` every list is empty and the equity curve is
/// flat at the initial equity: callers get an explicit "nothing to report",
/// never a partial report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: AnalysisStatus,
    pub window: Window,
    pub validation: ValidationSummary,
    pub closed_positions: Vec<ClosedPosition>,
    pub equity_curve: EquityCurve,
    pub daily_symbol_summaries: Vec<DailySymbolSummary>,
    pub daily_summaries: Vec<DailySummary>,
}

/// All of one close date's results, as exported per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport<'a> {
    pub date: NaiveDate,
    pub positions: Vec<&'a ClosedPosition>,
    pub summary: &'a SummaryStats,
    pub symbols: Vec<&'a DailySymbolSummary>,
    /// Positions with non-zero slippage, largest first.
    pub slipped_positions: Vec<&'a ClosedPosition>,
    /// The equity curve as of this date.
    pub equity_curve: &'a [EquityPoint],
}

impl AnalysisReport {
    pub fn has_trades(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }

    /// Turns a no-trades outcome into `AnalyticsError::NoData` for callers
    /// that cannot proceed without positions.
    pub fn require_trades(self) -> Result<Self, AnalyticsError> {
        match self.status {
            AnalysisStatus::Completed => Ok(self),
            AnalysisStatus::NoTrades(reason) => Err(AnalyticsError::NoData(format!(
                "{:?} for window {} to {}",
                reason, self.window.start, self.window.end
            ))),
        }
    }

    /// Positions closed on `date` with slippage > 0, sorted by slippage descending.
    pub fn slipped_positions(&self, date: NaiveDate) -> Vec<&ClosedPosition> {
        let mut slipped: Vec<&ClosedPosition> = self
            .closed_positions
            .iter()
            .filter(|p| p.close_date() == date && !p.slippage.is_zero())
            .collect();
        slipped.sort_by(|a, b| b.slippage.cmp(&a.slippage));
        slipped
    }

    /// One report per close date, ascending.
    pub fn daily_reports(&self) -> Vec<DailyReport<'_>> {
        self.daily_summaries
            .iter()
            .map(|daily| DailyReport {
                date: daily.date,
                positions: self
                    .closed_positions
                    .iter()
                    .filter(|p| p.close_date() == daily.date)
                    .collect(),
                summary: &daily.stats,
                symbols: self
                    .daily_symbol_summaries
                    .iter()
                    .filter(|s| s.date == daily.date)
                    .collect(),
                slipped_positions: self.slipped_positions(daily.date),
                equity_curve: self.equity_curve.up_to(daily.date),
            })
            .collect()
    }

    /// Headline numbers for job status records.
    pub fn job_summary(&self) -> JobSummary {
        JobSummary {
            window: self.window,
            closed_positions: self.closed_positions.len(),
            initial_equity: self.equity_curve.initial_equity,
            final_equity: self.equity_curve.final_equity,
            total_return_pct: self.equity_curve.total_return_pct,
            max_drawdown_pct: self.equity_curve.max_drawdown_pct,
        }
    }
}
