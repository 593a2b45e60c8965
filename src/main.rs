use analytics::{AnalysisStatus, AnalyticsEngine, TracingSink};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use configuration::Config;
use core_types::Window;
use rust_decimal::Decimal;
use std::path::PathBuf;

mod output;

/// The main entry point for the Dealscope trade analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load DEALSCOPE__* overrides from a .env file if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let mut config = configuration::load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => {
            args.apply_overrides(&mut config)?;
            let _guard = configuration::init_tracing(&config.logging)?;
            handle_analyze(args, &config).await
        }
        Commands::Serve => {
            let _guard = configuration::init_tracing(&config.logging)?;
            web_server::run_server(&config).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Closed-position analytics for a trading account's deal history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "dealscope.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one window of account history and print the summaries.
    Analyze(AnalyzeArgs),
    /// Run the HTTP job server.
    Serve,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Read the snapshot from this JSON file instead of the configured source.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// First day of the window (format: YYYY-MM-DD).
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of the window (format: YYYY-MM-DD).
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Starting equity of the curve; overrides `analysis.initial_equity`.
    #[arg(long)]
    initial_equity: Option<Decimal>,

    /// Write `<date>.json` per close date and `report.json` into this directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn apply_overrides(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(path) = &self.snapshot {
            config.source.deals_path = path.clone();
            config.source.url = None;
        }
        if let Some(initial_equity) = self.initial_equity {
            config.analysis.initial_equity = initial_equity;
        }
        configuration::validate(config)?;
        Ok(())
    }

    fn window(&self, lookback_days: u32) -> anyhow::Result<Window> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Ok(Window::new(from, to)?),
            _ => Ok(Window::trailing(Utc::now().date_naive(), lookback_days)),
        }
    }
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let window = args.window(config.analysis.lookback_days)?;
    tracing::info!(start = %window.start, end = %window.end, "Starting analysis");

    let source = data_source::from_settings(&config.source)?;
    let snapshot = source
        .fetch(&window)
        .await
        .context("fetching account history")?;

    let engine = AnalyticsEngine::new(config.analysis.initial_equity)?;
    let report = engine.analyze(&snapshot, window, &TracingSink)?;

    if let AnalysisStatus::NoTrades(reason) = report.status {
        println!(
            "No trade data found between {} and {} ({:?}).",
            window.start, window.end, reason
        );
        return Ok(());
    }

    println!("{}", output::equity_table(&report));
    println!("{}", output::daily_table(&report));
    println!("{}", output::symbol_table(&report));
    if let Some(table) = output::slippage_table(&report) {
        println!("{}", table);
    }
    if report.validation.has_rejections() {
        println!(
            "\n{} deal(s) and {} order(s) were excluded for missing fields.",
            report.validation.rejected_deals, report.validation.rejected_orders
        );
    }

    if let Some(dir) = &args.out {
        let written = output::write_reports(&report, dir)?;
        println!("\nWrote {} report file(s) to {}", written.len(), dir.display());
    }

    Ok(())
}
