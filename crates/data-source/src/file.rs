use crate::DealSource;
use crate::error::SourceError;
use async_trait::async_trait;
use core_types::{Snapshot, Window};
use std::path::PathBuf;

/// Reads a snapshot exported to disk as `{ "deals": [...], "orders": [...] }`.
///
/// The whole file is returned regardless of the window; the analytics core
/// does the window filtering.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DealSource for JsonFileSource {
    async fn fetch(&self, window: &Window) -> Result<Snapshot, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let snapshot: Snapshot = serde_json::from_str(&text)
            .map_err(|e| SourceError::Deserialization(e.to_string()))?;

        tracing::debug!(
            path = %self.path.display(),
            deals = snapshot.deals.len(),
            orders = snapshot.orders.len(),
            start = %window.start,
            end = %window.end,
            "Loaded snapshot from file"
        );
        Ok(snapshot)
    }
}
