//! Injected diagnostic sinks.
//!
//! The analytics core never prints. Everything it has to say goes through a
//! `DiagnosticSink` handed in by the caller, so concurrent runs cannot
//! interleave output and callers decide whether to log, keep or drop it.

use events::{Diagnostic, DiagnosticLevel};
use std::sync::Mutex;

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let Diagnostic {
            level,
            kind,
            position_id,
            message,
        } = diagnostic;
        match level {
            DiagnosticLevel::Debug => {
                tracing::debug!(?kind, position_id, "{}", message)
            }
            DiagnosticLevel::Info => tracing::info!(?kind, position_id, "{}", message),
            DiagnosticLevel::Warn => tracing::warn!(?kind, position_id, "{}", message),
        }
    }
}

/// Keeps every diagnostic in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        match self.records.into_inner() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        match self.records.lock() {
            Ok(mut records) => records.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
