//! Pipeline entry points for synchronization runs.
//!
//! - `diff`: pure reconciliation between an index and the persisted sources
//! - `sync`: single-feed and batch drivers with per-feed locking

pub mod diff;
pub mod sync;

pub use diff::{SourceChange, SyncStats, classify};
pub use sync::{BatchSummary, FeedLocks, sync_all, sync_feed};
