//! Service layer for the synchronization engine.
//!
//! This module contains the business logic for:
//! - Index fetching with redirect policy (`FeedFetcher`)
//! - Index parsing and schema validation (`parse_index`)
//! - Per-feed pipeline orchestration (`FeedUpdater`)

mod fetcher;
mod parser;
mod updater;

pub use fetcher::{FeedFetcher, FetchError, FetchOptions};
pub use parser::{FeedIndex, IndexError, parse_index};
pub use updater::{FeedUpdater, SyncOutcome};
