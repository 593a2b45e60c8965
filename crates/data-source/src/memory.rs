use crate::DealSource;
use crate::error::SourceError;
use async_trait::async_trait;
use core_types::{Snapshot, Window};

/// Serves a fixed snapshot. Used by tests and by callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshot: Snapshot,
}

impl MemorySource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl DealSource for MemorySource {
    async fn fetch(&self, _window: &Window) -> Result<Snapshot, SourceError> {
        Ok(self.snapshot.clone())
    }
}
