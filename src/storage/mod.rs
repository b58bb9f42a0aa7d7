//! Persistence abstractions for feeds, sources, canteens and messages.
//!
//! The synchronization engine treats persistence as a collaborator behind the
//! [`Store`] trait: it needs "find sources by feed" in stable order, message
//! logs ordered by recency, and single-field updates for URLs and canteen
//! state. Two backends are provided:
//!
//! - [`MemoryStore`] - plain in-memory registry for tests and dry runs
//! - [`LocalStore`] - JSON file persistence with atomic writes

pub mod local;
pub mod memory;
mod registry;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Canteen, CanteenId, CanteenState, Feed, FeedId, Message, MessageBody, Source, SourceId,
    Subject,
};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Trait for registry storage backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up a feed by id.
    async fn feed(&self, id: FeedId) -> Result<Option<Feed>>;

    /// All known feeds in creation order.
    async fn feeds(&self) -> Result<Vec<Feed>>;

    /// Register a new feed.
    async fn add_feed(&self, name: &str, index_url: &str) -> Result<Feed>;

    /// Atomically replace a feed's index URL.
    async fn update_feed_url(&self, id: FeedId, new_url: &str) -> Result<()>;

    /// Sources of a feed in stable persisted order.
    async fn sources_by_feed(&self, feed_id: FeedId) -> Result<Vec<Source>>;

    /// Create a source and, lazily, its canteen (state `wanted`).
    ///
    /// Fails if the feed already has a source with this name; `name` is the
    /// reconciliation join key and must stay unique per feed.
    async fn add_source(
        &self,
        feed_id: FeedId,
        name: &str,
        meta_url: Option<&str>,
    ) -> Result<Source>;

    /// Atomically replace a source's meta URL.
    async fn update_source_url(&self, id: SourceId, meta_url: Option<&str>) -> Result<()>;

    /// Look up a canteen by id.
    async fn canteen(&self, id: CanteenId) -> Result<Option<Canteen>>;

    /// Atomically replace a canteen's lifecycle state.
    async fn set_canteen_state(&self, id: CanteenId, state: CanteenState) -> Result<()>;

    /// Append an immutable message; the store assigns id and timestamp.
    async fn append_message(&self, subject: Subject, body: MessageBody) -> Result<Message>;

    /// Messages for a subject, most recent first.
    async fn messages(&self, subject: Subject) -> Result<Vec<Message>>;
}
