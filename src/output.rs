//! Console tables and JSON export for the `analyze` command.

use analytics::{AnalysisReport, ClosedPosition, SummaryStats};
use anyhow::Context;
use comfy_table::Table;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Formats a holding time as `H:MM:SS`; hours are not wrapped at 24.
pub fn format_holding(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

fn stats_cells(stats: &SummaryStats) -> Vec<String> {
    vec![
        stats.trade_count.to_string(),
        format!("{}/{}", stats.buy_count, stats.sell_count),
        pct(stats.win_rate),
        money(stats.total_profit),
        money(stats.commission),
        money(stats.swap),
        stats.total_volume.normalize().to_string(),
        format_holding(stats.avg_holding),
        format!("{:.2}", stats.profit_loss_ratio.round_dp(2)),
    ]
}

const STATS_HEADER: [&str; 9] = [
    "Trades", "Buy/Sell", "Win Rate", "Total P&L", "Commission", "Swap", "Volume",
    "Avg Hold", "P/L Ratio",
];

/// The equity headline numbers.
pub fn equity_table(report: &AnalysisReport) -> String {
    let curve = &report.equity_curve;
    let mut table = Table::new();
    table.set_header(vec!["Initial Equity", "Final Equity", "Total Return", "Max Drawdown"]);
    table.add_row(vec![
        money(curve.initial_equity),
        money(curve.final_equity),
        pct(curve.total_return_pct),
        pct(curve.max_drawdown_pct),
    ]);
    format!("\n=== Equity ({} to {}) ===\n{}", report.window.start, report.window.end, table)
}

/// One row per close date.
pub fn daily_table(report: &AnalysisReport) -> String {
    let mut table = Table::new();
    let mut header = vec!["Date"];
    header.extend(STATS_HEADER);
    table.set_header(header);

    for daily in &report.daily_summaries {
        let mut row = vec![daily.date.to_string()];
        row.extend(stats_cells(&daily.stats));
        table.add_row(row);
    }
    format!("\n=== Daily Summary ===\n{}", table)
}

/// One row per (close date, symbol).
pub fn symbol_table(report: &AnalysisReport) -> String {
    let mut table = Table::new();
    let mut header = vec!["Date", "Symbol"];
    header.extend(STATS_HEADER);
    table.set_header(header);

    for summary in &report.daily_symbol_summaries {
        let mut row = vec![summary.date.to_string(), summary.symbol.clone()];
        row.extend(stats_cells(&summary.stats));
        table.add_row(row);
    }
    format!("\n=== Summary by Symbol ===\n{}", table)
}

/// Positions closed with slippage, largest first within each day.
pub fn slippage_table(report: &AnalysisReport) -> Option<String> {
    let slipped: Vec<&ClosedPosition> = report
        .daily_summaries
        .iter()
        .flat_map(|daily| report.slipped_positions(daily.date))
        .collect();
    if slipped.is_empty() {
        return None;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Closed", "Position", "Symbol", "Side", "Reason", "Reference", "Close", "Slippage",
    ]);
    for position in slipped {
        table.add_row(vec![
            position.close_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            position.position_id.to_string(),
            position.symbol.clone(),
            format!("{:?}", position.direction),
            format!("{:?}", position.close_reason),
            position
                .reference_price
                .map(|p| p.normalize().to_string())
                .unwrap_or_else(|| "-".to_string()),
            position.close_price.normalize().to_string(),
            position.slippage.normalize().to_string(),
        ]);
    }
    Some(format!("\n=== Slipped Positions ===\n{}", table))
}

/// Writes `<date>.json` per close date plus `report.json` into `dir`.
///
/// Returns the paths written, daily files first.
pub fn write_reports(report: &AnalysisReport, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for daily in report.daily_reports() {
        let path = dir.join(format!("{}.json", daily.date));
        write_json(&path, &daily)?;
        written.push(path);
    }

    let path = dir.join("report.json");
    write_json(&path, report)?;
    written.push(path);
    Ok(written)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Report written");
    Ok(())
}
