use crate::error::AppError;
use analytics::AnalysisReport;
use chrono::{DateTime, Utc};
use events::{JobRecord, JobSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct JobEntry {
    record: JobRecord,
    report: Option<Arc<AnalysisReport>>,
}

/// In-memory registry of analysis jobs, keyed by job id.
///
/// Each job's record is written only by the worker that owns its id; pollers
/// only read. Records live for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new running job and returns its id.
    pub async fn insert_running(&self, created_at: DateTime<Utc>) -> Uuid {
        let job_id = Uuid::new_v4();
        let entry = JobEntry {
            record: JobRecord::running(job_id, created_at),
            report: None,
        };
        self.jobs.write().await.insert(job_id, entry);
        job_id
    }

    pub async fn complete(
        &self,
        job_id: Uuid,
        summary: JobSummary,
        report: AnalysisReport,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(&job_id).ok_or_else(|| task_not_found(job_id))?;
        entry.record.complete(summary, at)?;
        entry.report = Some(Arc::new(report));
        Ok(())
    }

    pub async fn fail(
        &self,
        job_id: Uuid,
        error: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs.get_mut(&job_id).ok_or_else(|| task_not_found(job_id))?;
        entry.record.fail(error, at)?;
        Ok(())
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&job_id).map(|e| e.record.clone())
    }

    /// The full report of a completed job.
    pub async fn report(&self, job_id: Uuid) -> Option<Arc<AnalysisReport>> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .and_then(|e| e.report.clone())
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn task_not_found(job_id: Uuid) -> AppError {
    AppError::NotFound(format!("Task {} not found", job_id))
}
