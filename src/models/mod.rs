// src/models/mod.rs

//! Domain models for the synchronization engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod canteen;
mod config;
mod feed;
mod message;

// Re-export all public types
pub use canteen::{Canteen, CanteenId, CanteenState};
pub use config::{Config, FetcherConfig, StorageConfig, SyncConfig};
pub use feed::{Feed, FeedId, Source, SourceId};
pub use message::{ChangeKind, Message, MessageBody, Subject, ValidationKind};
