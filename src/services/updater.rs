// src/services/updater.rs

//! Feed synchronization orchestration.
//!
//! `FeedUpdater` runs the fetch, parse and reconcile stages for a single
//! feed. Every stage failure is recorded as an audit message and ends the
//! run with `success = false`; only infrastructure faults (storage I/O)
//! propagate as errors.

use crate::error::{AppError, Result};
use crate::models::{
    CanteenState, ChangeKind, Feed, FeedId, Message, MessageBody, Subject,
};
use crate::pipeline::{SourceChange, SyncStats, classify};
use crate::services::fetcher::{FeedFetcher, FetchError, FetchOptions};
use crate::services::parser::{FeedIndex, parse_index};
use crate::storage::Store;
use crate::utils::http::Transport;

/// Result of one synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// True iff fetch, parse and validation all succeeded
    pub success: bool,
    /// Reconciliation counters; zeroed when the pipeline stopped early
    pub stats: SyncStats,
}

/// Drives the synchronization pipeline for one feed.
pub struct FeedUpdater<'a> {
    store: &'a dyn Store,
    transport: &'a dyn Transport,
    options: FetchOptions,
    feed: Feed,
    data: Option<Vec<u8>>,
    index: Option<FeedIndex>,
    /// Messages created during this run, oldest first
    messages: Vec<Message>,
    stats: SyncStats,
}

impl<'a> FeedUpdater<'a> {
    /// Create an updater for the given feed.
    pub async fn new(
        store: &'a dyn Store,
        transport: &'a dyn Transport,
        options: FetchOptions,
        feed_id: FeedId,
    ) -> Result<Self> {
        let feed = store
            .feed(feed_id)
            .await?
            .ok_or_else(|| AppError::storage(format!("no feed with id {feed_id}")))?;
        Ok(Self {
            store,
            transport,
            options,
            feed,
            data: None,
            index: None,
            messages: Vec::new(),
            stats: SyncStats::default(),
        })
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Error messages recorded by this run (not the full history).
    pub fn errors(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.body.is_error()).collect()
    }

    /// Fetch the index document. Returns false when the run cannot proceed.
    pub async fn fetch(&mut self) -> Result<bool> {
        let fetcher = FeedFetcher::new(self.store, self.transport, self.options);
        match fetcher.fetch(&mut self.feed).await {
            Ok(Some(data)) => {
                self.data = Some(data);
                Ok(true)
            }
            // Blank URL: nothing to do, and nothing worth alerting on.
            Ok(None) => Ok(false),
            Err(FetchError::Store(error)) => Err(error),
            Err(FetchError::InvalidUrl(error)) => {
                log::warn!(
                    "Invalid index URL '{}' for feed '{}': {}",
                    self.feed.index_url,
                    self.feed.name,
                    error
                );
                self.log(MessageBody::FeedInvalidUrlError).await?;
                Ok(false)
            }
            Err(FetchError::Http { code }) => {
                self.log(MessageBody::FeedFetchError { code: Some(code) })
                    .await?;
                Ok(false)
            }
            Err(FetchError::TooManyRedirects) | Err(FetchError::Network(_)) => {
                self.log(MessageBody::FeedFetchError { code: None }).await?;
                Ok(false)
            }
        }
    }

    /// Decode and validate the fetched body.
    pub async fn parse(&mut self) -> Result<bool> {
        let Some(data) = self.data.as_deref() else {
            return Ok(false);
        };
        match parse_index(data) {
            Ok(index) => {
                self.index = Some(index);
                Ok(true)
            }
            Err(error) => {
                self.log(MessageBody::FeedValidationError {
                    kind: error.kind(),
                    version: None,
                    message: error.message().to_string(),
                })
                .await?;
                Ok(false)
            }
        }
    }

    /// Run the full pipeline: fetch, parse, reconcile.
    pub async fn sync(&mut self) -> Result<SyncOutcome> {
        if !self.fetch().await? || !self.parse().await? {
            return Ok(SyncOutcome {
                success: false,
                stats: SyncStats::default(),
            });
        }

        self.reconcile().await?;

        if !self.stats.is_empty() {
            log::info!(
                "Feed '{}': {} new, {} updated, {} archived",
                self.feed.name,
                self.stats.new,
                self.stats.updated,
                self.stats.archived
            );
        }
        Ok(SyncOutcome {
            success: true,
            stats: self.stats,
        })
    }

    async fn reconcile(&mut self) -> Result<()> {
        let index = self.index.clone().unwrap_or_default();

        let sources = self.store.sources_by_feed(self.feed.id).await?;
        let mut paired = Vec::with_capacity(sources.len());
        for source in sources {
            let canteen = self.store.canteen(source.canteen_id).await?.ok_or_else(|| {
                AppError::storage(format!(
                    "canteen {} missing for source '{}'",
                    source.canteen_id, source.name
                ))
            })?;
            paired.push((source, canteen.state));
        }

        for change in classify(&index, &paired) {
            self.apply(change).await?;
        }
        Ok(())
    }

    async fn apply(&mut self, change: SourceChange) -> Result<()> {
        match change {
            SourceChange::New { name, url } => {
                self.store
                    .add_source(self.feed.id, &name, url.as_deref())
                    .await?;
                self.log(MessageBody::SourceListChanged {
                    kind: ChangeKind::NewSource,
                    name,
                    url,
                })
                .await?;
                self.stats.new += 1;
            }
            SourceChange::Reactivated {
                canteen_id,
                name,
                url,
                ..
            } => {
                self.store
                    .set_canteen_state(canteen_id, CanteenState::Wanted)
                    .await?;
                self.log(MessageBody::SourceListChanged {
                    kind: ChangeKind::SourceReactivated,
                    name,
                    url,
                })
                .await?;
                // Reactivation counts as "new" by convention.
                self.stats.new += 1;
            }
            SourceChange::Updated {
                source_id,
                old_url,
                new_url,
                ..
            } => {
                self.store
                    .update_source_url(source_id, new_url.as_deref())
                    .await?;
                let message = self
                    .store
                    .append_message(
                        Subject::Source(source_id),
                        MessageBody::FeedUrlUpdatedInfo { old_url, new_url },
                    )
                    .await?;
                self.messages.push(message);
                self.stats.updated += 1;
            }
            SourceChange::Archived {
                canteen_id, name, ..
            } => {
                self.store
                    .set_canteen_state(canteen_id, CanteenState::Archived)
                    .await?;
                self.log(MessageBody::SourceListChanged {
                    kind: ChangeKind::SourceArchived,
                    name,
                    url: None,
                })
                .await?;
                self.stats.archived += 1;
            }
        }
        Ok(())
    }

    /// Append a message to the feed's log and remember it for this run.
    async fn log(&mut self, body: MessageBody) -> Result<()> {
        let message = self
            .store
            .append_message(Subject::Feed(self.feed.id), body)
            .await?;
        self.messages.push(message);
        Ok(())
    }
}
