//! # Dealscope Analytics Engine
//!
//! This crate reconstructs closed positions from a brokerage account's raw
//! deal and order history and derives the analytics reported on them.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` and `events` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` holds only its parameters. It takes
//!   an immutable `Snapshot` as input and produces an `AnalysisReport` as output, with no
//!   I/O, no shared state and no locking, so concurrent runs are independent.
//! - **Injected Diagnostics:** Anything worth telling goes through a `DiagnosticSink`.
//!
//! ## Pipeline
//!
//! 1. `normalizer` - validates records, resolves stop-loss/take-profit per position,
//!    derives daily balance events.
//! 2. `matcher` - groups deals by position and builds `ClosedPosition`s.
//! 3. `slippage` - classifies each close and measures slippage.
//! 4. `equity` - replays balance events and results into an equity curve with max drawdown.
//! 5. `aggregator` - per (date, symbol) and per date summaries.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod engine;
pub mod equity;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod position;
pub mod report;
pub mod sink;
pub mod slippage;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::{DailySummary, DailySymbolSummary, SummaryStats};
pub use engine::AnalyticsEngine;
pub use equity::{BalanceEvent, EquityCurve, EquityPoint};
pub use error::AnalyticsError;
pub use normalizer::{ProtectiveLevels, ValidationSummary};
pub use position::ClosedPosition;
pub use report::{AnalysisReport, AnalysisStatus, DailyReport, NoDataReason};
pub use sink::{DiagnosticSink, MemorySink, NullSink, TracingSink};
