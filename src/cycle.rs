use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::broadcast::{broadcast, Transport};
use crate::digest;
use crate::feeds::{FeedItem, FetchFeeds, FetchFailure};
use crate::store::Store;

/// Runs the fetch → dedupe → render → broadcast cycle. Built once in main and
/// shared by the command handler and the scheduler.
pub struct Poster {
    store: Store,
    fetcher: Arc<dyn FetchFeeds>,
    transport: Arc<dyn Transport>,
    feeds: Vec<String>,
}

/// What one cycle did, for logs and tests.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub destinations: usize,
    pub new_items: usize,
    pub delivered: usize,
    pub fetch_failures: Vec<FetchFailure>,
}

impl Poster {
    pub fn new(
        store: Store,
        fetcher: Arc<dyn FetchFeeds>,
        transport: Arc<dyn Transport>,
        feeds: Vec<String>,
    ) -> Self {
        Self {
            store,
            fetcher,
            transport,
            feeds,
        }
    }

    /// Execute one digest cycle. Storage errors abort the cycle; fetch and
    /// delivery failures are handled locally and reported in the result.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let chats = self.store.list_chats().await?;
        if chats.is_empty() {
            info!("No chats registered, skipping cycle");
            return Ok(CycleReport::default());
        }

        let outcome = self.fetcher.fetch_all(&self.feeds).await;

        // Links are recorded before delivery is attempted, so a failed send is
        // never retried on the next cycle (at-most-once).
        let mut fresh: Vec<FeedItem> = Vec::new();
        for item in outcome.items {
            if self.store.is_known(&item.link).await? {
                continue;
            }
            self.store.record(&item.link).await?;
            fresh.push(item);
        }

        let message = digest::render(&fresh);
        let delivered = broadcast(self.transport.as_ref(), &chats, &message).await;

        let report = CycleReport {
            destinations: chats.len(),
            new_items: fresh.len(),
            delivered,
            fetch_failures: outcome.failures,
        };
        info!(
            "Cycle finished at {}: {} new item(s), {}/{} chat(s) reached, {} feed failure(s)",
            Utc::now().to_rfc3339(),
            report.new_items,
            report.delivered,
            report.destinations,
            report.fetch_failures.len()
        );
        Ok(report)
    }
}
