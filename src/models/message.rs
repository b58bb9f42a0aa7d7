//! Audit message taxonomy.
//!
//! Every meaningful synchronization event is recorded as an immutable,
//! timestamped message attached to a feed or to an individual source, so
//! reporting and alerting can reconstruct what happened without re-running
//! the pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedId, SourceId};

/// The entity a message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Feed(FeedId),
    Source(SourceId),
}

/// Why an index document was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// Body was not parseable JSON
    NoJson,
    /// JSON was well-formed but not a name-to-URL mapping
    InvalidJson,
}

/// Reconciliation outcome for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NewSource,
    SourceArchived,
    SourceReactivated,
}

/// Message payload, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    /// The feed's configured URL could not be parsed
    FeedInvalidUrlError,

    /// Transport or HTTP failure; `code` is present for HTTP status
    /// failures and absent for network-level failures (DNS, timeout,
    /// connection refused)
    FeedFetchError { code: Option<u16> },

    /// Informational: a URL was replaced due to a permanent redirect or an
    /// index update
    FeedUrlUpdatedInfo {
        old_url: Option<String>,
        new_url: Option<String>,
    },

    /// The fetched body failed to parse or failed schema validation.
    /// `version` is reported by the external menu-feed validator and is
    /// always absent for index documents.
    FeedValidationError {
        // serialized as `validation_kind`: serde forbids a field named the
        // same as the enum's internal tag (`kind`)
        #[serde(rename = "validation_kind")]
        kind: ValidationKind,
        version: Option<u32>,
        message: String,
    },

    /// A reconciliation outcome for one source
    SourceListChanged {
        #[serde(rename = "change_kind")]
        kind: ChangeKind,
        name: String,
        url: Option<String>,
    },
}

impl MessageBody {
    /// Whether this message reports a failure rather than information.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            MessageBody::FeedInvalidUrlError
                | MessageBody::FeedFetchError { .. }
                | MessageBody::FeedValidationError { .. }
        )
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::NoJson => write!(f, "no_json"),
            ValidationKind::InvalidJson => write!(f, "invalid_json"),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::NewSource => write!(f, "new_source"),
            ChangeKind::SourceArchived => write!(f, "source_archived"),
            ChangeKind::SourceReactivated => write!(f, "source_reactivated"),
        }
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageBody::FeedInvalidUrlError => write!(f, "feed URL could not be parsed"),
            MessageBody::FeedFetchError { code: Some(code) } => {
                write!(f, "feed fetch failed with HTTP status {code}")
            }
            MessageBody::FeedFetchError { code: None } => {
                write!(f, "feed fetch failed with a network error")
            }
            MessageBody::FeedUrlUpdatedInfo { old_url, new_url } => write!(
                f,
                "URL updated from '{}' to '{}'",
                old_url.as_deref().unwrap_or("-"),
                new_url.as_deref().unwrap_or("-"),
            ),
            MessageBody::FeedValidationError { kind, message, .. } => {
                write!(f, "index rejected ({kind}): {message}")
            }
            MessageBody::SourceListChanged { kind, name, url } => write!(
                f,
                "source list changed ({kind}): {name} {}",
                url.as_deref().unwrap_or("-"),
            ),
        }
    }
}

/// An immutable, timestamped audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub subject: Subject,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}
