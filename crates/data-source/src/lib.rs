//! # Deal Sources
//!
//! Everything that produces a `Snapshot` for the analytics core lives here.
//! Connectivity and parse failures stay inside this crate as `SourceError`s;
//! the core only ever sees a well-formed snapshot.

use crate::error::SourceError;
use async_trait::async_trait;
use configuration::settings::SourceSettings;
use core_types::{Snapshot, Window};
use std::sync::Arc;
use std::time::Duration;

pub mod error;
pub mod file;
pub mod http;
pub mod memory;

// --- Public API ---
pub use file::JsonFileSource;
pub use http::HttpSource;
pub use memory::MemorySource;

/// The abstract interface for anything that can supply account history.
///
/// The dispatcher and the CLI only hold an `Arc<dyn DealSource>`, so the
/// concrete source (file, bridge or in-memory) can be swapped out.
#[async_trait]
pub trait DealSource: Send + Sync {
    /// Fetches the deals and orders covering `window`.
    ///
    /// A source may return more than the window; the core filters by date.
    async fn fetch(&self, window: &Window) -> Result<Snapshot, SourceError>;
}

/// Builds the source described by the `[source]` configuration section.
pub fn from_settings(settings: &SourceSettings) -> Result<Arc<dyn DealSource>, SourceError> {
    match &settings.url {
        Some(url) if url.trim().is_empty() => Err(SourceError::InvalidConfig(
            "source.url is set but empty".to_string(),
        )),
        Some(url) => {
            let source = HttpSource::new(url.clone(), Duration::from_secs(settings.timeout_secs))?;
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(JsonFileSource::new(settings.deals_path.clone()))),
    }
}
