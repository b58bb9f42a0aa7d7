//! Feed and source records.

use serde::{Deserialize, Serialize};

use super::CanteenId;

/// Feed identifier.
pub type FeedId = i64;

/// Source identifier.
pub type SourceId = i64;

/// One external operator's index endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: FeedId,

    /// Operator-facing name
    pub name: String,

    /// URL of the remote index document; may be rewritten by the fetcher on
    /// a permanent redirect
    pub index_url: String,
}

/// One canteen entry known to a feed.
///
/// `name` is unique within its feed and is the reconciliation join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,

    /// Owning feed
    pub feed_id: FeedId,

    /// Owning canteen, created lazily on first discovery
    pub canteen_id: CanteenId,

    /// Canteen name as listed in the index
    pub name: String,

    /// The canteen's own data-feed URL as last seen in the index; a source
    /// may be known without a URL yet
    pub meta_url: Option<String>,
}
