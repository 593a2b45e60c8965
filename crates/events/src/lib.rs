//! # Dealscope Events
//!
//! This crate defines the structured records that leave the analytics core and
//! the job dispatcher: diagnostics emitted while reconstructing positions, and
//! the status records exposed to pollers.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! language for everything the system reports besides the analysis itself.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{
    Diagnostic, DiagnosticKind, DiagnosticLevel, JobRecord, JobStatus, JobSummary,
};
