use crate::error::EventsError;
use chrono::{DateTime, Utc};
use core_types::Window;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// What a diagnostic is about. Lets callers filter without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Raw records were excluded because a mandatory field was missing.
    Validation,
    /// A position group had no IN or no OUT deal and was skipped.
    IncompletePosition,
    /// A position was built; carries the per-position trace.
    PositionBuilt,
    /// A position closed in several OUT deals was collapsed into one.
    PartialCloseCollapsed,
    /// The equity recurrence finished.
    EquitySummary,
    /// The feed produced nothing to report.
    NoData,
}

/// A structured record emitted by the analytics core instead of console output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<u64>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            position_id: None,
            message: message.into(),
        }
    }

    pub fn debug(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Debug, kind, message)
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, kind, message)
    }

    pub fn warn(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, kind, message)
    }

    pub fn with_position(mut self, position_id: u64) -> Self {
        self.position_id = Some(position_id);
        self
    }
}

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// The headline numbers of a finished analysis, kept on the job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub window: Window,
    pub closed_positions: usize,
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    pub total_return_pct: Decimal,
    pub max_drawdown_pct: Decimal,
}

/// The status record a poller sees for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<JobSummary>,
}

impl JobRecord {
    /// A fresh record for a job that has just been accepted.
    pub fn running(job_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Running,
            created_at,
            completed_at: None,
            error: None,
            summary: None,
        }
    }

    /// Marks the job completed. Only a running job can finish.
    pub fn complete(&mut self, summary: JobSummary, at: DateTime<Utc>) -> Result<(), EventsError> {
        self.finish(JobStatus::Completed, at)?;
        self.summary = Some(summary);
        Ok(())
    }

    /// Marks the job failed with a message. Only a running job can finish.
    pub fn fail(&mut self, error: impl Into<String>, at: DateTime<Utc>) -> Result<(), EventsError> {
        self.finish(JobStatus::Failed, at)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn finish(&mut self, to: JobStatus, at: DateTime<Utc>) -> Result<(), EventsError> {
        if self.status != JobStatus::Running {
            return Err(EventsError::InvalidTransition {
                job_id: self.job_id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.completed_at = Some(at);
        Ok(())
    }
}
