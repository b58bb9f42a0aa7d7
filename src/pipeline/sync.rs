// src/pipeline/sync.rs

//! Synchronization run drivers.
//!
//! `sync_feed` runs one feed end to end under a per-feed lock; `sync_all`
//! fans out over every known feed with bounded concurrency. One feed's
//! failure never aborts the batch.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{Config, FeedId};
use crate::pipeline::diff::SyncStats;
use crate::services::{FeedUpdater, FetchOptions, SyncOutcome};
use crate::storage::Store;
use crate::utils::http::Transport;

/// Keyed locks serializing runs against the same feed.
///
/// The reconciler reads-then-writes the source set non-atomically, so two
/// concurrent runs over one feed could double-count or race on canteen
/// state. Different feeds share no mutable state and may run in parallel.
#[derive(Default)]
pub struct FeedLocks {
    locks: Mutex<HashMap<FeedId, Arc<Mutex<()>>>>,
}

impl FeedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self, id: FeedId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }
}

/// Synchronize a single feed end to end.
pub async fn sync_feed(
    store: &dyn Store,
    transport: &dyn Transport,
    options: FetchOptions,
    locks: &FeedLocks,
    feed_id: FeedId,
) -> Result<SyncOutcome> {
    let lock = locks.acquire(feed_id).await;
    let _guard = lock.lock().await;

    let mut updater = FeedUpdater::new(store, transport, options, feed_id).await?;
    updater.sync().await
}

/// Summary of a batch run over all feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    /// Number of feeds processed
    pub feeds: usize,
    /// Feeds whose run did not complete successfully
    pub failures: usize,
    /// Combined reconciliation counters of the successful runs
    pub stats: SyncStats,
}

/// Synchronize every known feed with bounded concurrency.
pub async fn sync_all(
    store: &dyn Store,
    transport: &dyn Transport,
    config: &Config,
    locks: &FeedLocks,
) -> Result<BatchSummary> {
    let feeds = store.feeds().await?;
    let concurrency = config.sync.max_concurrent.max(1);
    let options = FetchOptions::from(&config.fetcher);

    let mut summary = BatchSummary {
        feeds: feeds.len(),
        ..BatchSummary::default()
    };

    let mut runs = stream::iter(feeds)
        .map(|feed| async move {
            let outcome = sync_feed(store, transport, options, locks, feed.id).await;
            (feed, outcome)
        })
        .buffer_unordered(concurrency);

    while let Some((feed, result)) = runs.next().await {
        match result {
            Ok(outcome) if outcome.success => summary.stats.merge(outcome.stats),
            // Feed-level failure: already recorded as messages on the feed.
            Ok(_) => summary.failures += 1,
            Err(error) => {
                summary.failures += 1;
                log::warn!("Sync failed for feed '{}': {}", feed.name, error);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageBody, Subject};
    use crate::storage::MemoryStore;
    use crate::utils::http::testing::FakeTransport;

    #[tokio::test]
    async fn test_locks_keyed_by_feed() {
        let locks = FeedLocks::new();
        let first = locks.acquire(1).await;
        let again = locks.acquire(1).await;
        let other = locks.acquire(2).await;

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn test_sync_feed_runs_pipeline() {
        let store = MemoryStore::new();
        let transport = FakeTransport::new().stub_body(
            "http://example.org/index.json",
            r#"{"test": "http://example.org/test.xml"}"#,
        );
        let locks = FeedLocks::new();
        let feed = store
            .add_feed("uni", "http://example.org/index.json")
            .await
            .unwrap();

        let outcome = sync_feed(
            &store,
            &transport,
            FetchOptions::default(),
            &locks,
            feed.id,
        )
        .await
        .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.stats.new, 1);
    }

    #[tokio::test]
    async fn test_one_failing_feed_does_not_abort_batch() {
        let store = MemoryStore::new();
        let transport = FakeTransport::new()
            .stub_body(
                "http://example.org/a.json",
                r#"{"mensa": "http://example.org/mensa.xml"}"#,
            )
            .stub_status("http://example.org/b.json", 500);
        let locks = FeedLocks::new();
        let config = Config::default();

        store
            .add_feed("working", "http://example.org/a.json")
            .await
            .unwrap();
        let broken = store
            .add_feed("broken", "http://example.org/b.json")
            .await
            .unwrap();

        let summary = sync_all(&store, &transport, &config, &locks).await.unwrap();
        assert_eq!(summary.feeds, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.stats.new, 1);

        // The failure is still visible in the broken feed's log.
        let messages = store.messages(Subject::Feed(broken.id)).await.unwrap();
        assert_eq!(
            messages[0].body,
            MessageBody::FeedFetchError { code: Some(500) }
        );
    }
}
