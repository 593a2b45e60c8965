use crate::DealSource;
use crate::error::SourceError;
use async_trait::async_trait;
use core_types::{Snapshot, Window};
use std::time::Duration;

/// Fetches a snapshot from a terminal bridge over HTTP.
///
/// Issues `GET <url>?from=YYYY-MM-DD&to=YYYY-MM-DD` and expects the same
/// `{ "deals": [...], "orders": [...] }` body a snapshot file holds.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DealSource for HttpSource {
    async fn fetch(&self, window: &Window) -> Result<Snapshot, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("from", window.start.to_string()),
                ("to", window.end.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Bridge {
                status: status.as_u16(),
                body: text,
            });
        }

        let snapshot: Snapshot = serde_json::from_str(&text).map_err(|e| {
            SourceError::Deserialization(format!("{}. Original text: {}", e, text))
        })?;
        tracing::debug!(
            url = %self.url,
            deals = snapshot.deals.len(),
            orders = snapshot.orders.len(),
            "Fetched snapshot from bridge"
        );
        Ok(snapshot)
    }
}
