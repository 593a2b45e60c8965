use crate::jobs::JobStore;
use analytics::{AnalyticsEngine, AnalyticsError, TracingSink};
use chrono::Utc;
use core_types::Window;
use data_source::DealSource;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// The message recorded on a job whose window holds no completed trades.
pub const NO_TRADES_MESSAGE: &str = "No trade data found";

/// Accepts analysis requests and runs each one as a background job.
///
/// The snapshot is fetched on the async runtime; the analytics core runs on
/// the blocking pool since it is pure CPU work.
#[derive(Clone)]
pub struct Dispatcher {
    store: JobStore,
    source: Arc<dyn DealSource>,
    engine: AnalyticsEngine,
    lookback_days: u32,
}

impl Dispatcher {
    pub fn new(
        store: JobStore,
        source: Arc<dyn DealSource>,
        engine: AnalyticsEngine,
        lookback_days: u32,
    ) -> Self {
        Self {
            store,
            source,
            engine,
            lookback_days,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// The window used when a request does not name one: the configured
    /// number of days back from today, UTC.
    pub fn default_window(&self) -> Window {
        Window::trailing(Utc::now().date_naive(), self.lookback_days)
    }

    /// Registers a running job and spawns its worker.
    ///
    /// Returns the job id immediately together with the worker's handle.
    pub async fn submit(&self, window: Window) -> (Uuid, JoinHandle<()>) {
        let job_id = self.store.insert_running(Utc::now()).await;
        tracing::info!(%job_id, start = %window.start, end = %window.end, "Analysis job accepted");

        let dispatcher = self.clone();
        let handle = tokio::spawn(async move {
            dispatcher.run_job(job_id, window).await;
        });
        (job_id, handle)
    }

    async fn run_job(&self, job_id: Uuid, window: Window) {
        let outcome = self.execute(window).await;
        let recorded = match outcome {
            Ok(report) => {
                let summary = report.job_summary();
                tracing::info!(
                    %job_id,
                    closed_positions = summary.closed_positions,
                    final_equity = %summary.final_equity.round_dp(2),
                    max_drawdown_pct = %summary.max_drawdown_pct.round_dp(2),
                    "Analysis job completed"
                );
                self.store.complete(job_id, summary, report, Utc::now()).await
            }
            Err(message) => {
                tracing::warn!(%job_id, error = %message, "Analysis job failed");
                self.store.fail(job_id, message, Utc::now()).await
            }
        };

        if let Err(e) = recorded {
            tracing::error!(%job_id, error = %e, "Failed to record job outcome");
        }
    }

    async fn execute(&self, window: Window) -> Result<analytics::AnalysisReport, String> {
        let snapshot = self.source.fetch(&window).await.map_err(|e| e.to_string())?;

        let engine = self.engine;
        let report = tokio::task::spawn_blocking(move || {
            engine.analyze(&snapshot, window, &TracingSink)
        })
        .await
        .map_err(|e| format!("Analysis worker panicked: {}", e))?
        .map_err(|e: AnalyticsError| e.to_string())?;

        if !report.has_trades() {
            return Err(NO_TRADES_MESSAGE.to_string());
        }
        Ok(report)
    }
}
