// src/pipeline/diff.rs

//! Reconciliation diff between a fetched index and the persisted sources.
//!
//! Classifies every canteen name into creates, URL updates, archivals and
//! reactivations. The classification is a pure per-name partition: the final
//! state does not depend on ordering, but changes are emitted in index
//! document order for new/updated sources and in persisted order for
//! archivals, so audit logs stay stable and testable.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{CanteenId, CanteenState, Source, SourceId};
use crate::services::FeedIndex;

/// One classified change for a single source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChange {
    /// Present in the index with no matching persisted source
    New { name: String, url: Option<String> },

    /// Present in the index and its canteen is currently archived
    Reactivated {
        source_id: SourceId,
        canteen_id: CanteenId,
        name: String,
        url: Option<String>,
    },

    /// Present in the index with a different URL than last seen
    Updated {
        source_id: SourceId,
        name: String,
        old_url: Option<String>,
        new_url: Option<String>,
    },

    /// Absent from the index and not yet archived
    Archived {
        source_id: SourceId,
        canteen_id: CanteenId,
        name: String,
    },
}

/// Counters for one synchronization run.
///
/// Reactivations count toward `new`; this mirrors how operators have always
/// read these numbers, so the convention is kept as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub new: usize,
    pub updated: usize,
    pub archived: usize,
}

impl SyncStats {
    /// Check if there are any changes.
    pub fn is_empty(&self) -> bool {
        self.new == 0 && self.updated == 0 && self.archived == 0
    }

    /// Total number of changes.
    pub fn total(&self) -> usize {
        self.new + self.updated + self.archived
    }

    /// Fold another run's counters into this one.
    pub fn merge(&mut self, other: SyncStats) {
        self.new += other.new;
        self.updated += other.updated;
        self.archived += other.archived;
    }
}

/// Classify the difference between the index and the persisted sources.
///
/// `sources` pairs each persisted source with its canteen's current state,
/// in persisted order. Unchanged non-archived sources and already-archived
/// absentees produce no change (the second makes a repeated run idempotent).
pub fn classify(index: &FeedIndex, sources: &[(Source, CanteenState)]) -> Vec<SourceChange> {
    let by_name: HashMap<&str, &(Source, CanteenState)> = sources
        .iter()
        .map(|entry| (entry.0.name.as_str(), entry))
        .collect();

    let mut changes = Vec::new();

    for (name, url) in index.entries() {
        match by_name.get(name.as_str()) {
            None => changes.push(SourceChange::New {
                name: name.clone(),
                url: url.clone(),
            }),
            Some((source, state)) => {
                if state.is_archived() {
                    changes.push(SourceChange::Reactivated {
                        source_id: source.id,
                        canteen_id: source.canteen_id,
                        name: name.clone(),
                        url: url.clone(),
                    });
                } else if source.meta_url != *url {
                    changes.push(SourceChange::Updated {
                        source_id: source.id,
                        name: name.clone(),
                        old_url: source.meta_url.clone(),
                        new_url: url.clone(),
                    });
                }
            }
        }
    }

    let listed: std::collections::HashSet<&str> = index
        .entries()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    for (source, state) in sources {
        if !listed.contains(source.name.as_str()) && !state.is_archived() {
            changes.push(SourceChange::Archived {
                source_id: source.id,
                canteen_id: source.canteen_id,
                name: source.name.clone(),
            });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parse_index;

    fn make_source(id: SourceId, name: &str, meta_url: Option<&str>) -> Source {
        Source {
            id,
            feed_id: 1,
            canteen_id: id + 100,
            name: name.to_string(),
            meta_url: meta_url.map(str::to_string),
        }
    }

    #[test]
    fn test_no_changes() {
        let index = parse_index(br#"{"test": "http://example.org/test.xml"}"#).unwrap();
        let sources = vec![(
            make_source(1, "test", Some("http://example.org/test.xml")),
            CanteenState::Wanted,
        )];

        assert!(classify(&index, &sources).is_empty());
    }

    #[test]
    fn test_new_source() {
        let index = parse_index(br#"{"test": "http://example.org/test.xml"}"#).unwrap();
        let changes = classify(&index, &[]);

        assert_eq!(
            changes,
            vec![SourceChange::New {
                name: "test".into(),
                url: Some("http://example.org/test.xml".into()),
            }]
        );
    }

    #[test]
    fn test_new_source_without_url() {
        let index = parse_index(br#"{"test": null}"#).unwrap();
        let changes = classify(&index, &[]);

        assert_eq!(
            changes,
            vec![SourceChange::New {
                name: "test".into(),
                url: None,
            }]
        );
    }

    #[test]
    fn test_updated_url() {
        let index = parse_index(br#"{"test": "http://example.com/test/meta.xml"}"#).unwrap();
        let sources = vec![(
            make_source(1, "test", Some("http://example.com/test.xml")),
            CanteenState::Wanted,
        )];

        assert_eq!(
            classify(&index, &sources),
            vec![SourceChange::Updated {
                source_id: 1,
                name: "test".into(),
                old_url: Some("http://example.com/test.xml".into()),
                new_url: Some("http://example.com/test/meta.xml".into()),
            }]
        );
    }

    #[test]
    fn test_null_to_url_is_update() {
        let index = parse_index(br#"{"test": "http://example.com/test/meta.xml"}"#).unwrap();
        let sources = vec![(make_source(1, "test", None), CanteenState::Wanted)];

        assert_eq!(
            classify(&index, &sources),
            vec![SourceChange::Updated {
                source_id: 1,
                name: "test".into(),
                old_url: None,
                new_url: Some("http://example.com/test/meta.xml".into()),
            }]
        );
    }

    #[test]
    fn test_archived() {
        let index = parse_index(b"{}").unwrap();
        let sources = vec![(
            make_source(1, "test", Some("http://example.org/test.xml")),
            CanteenState::Wanted,
        )];

        assert_eq!(
            classify(&index, &sources),
            vec![SourceChange::Archived {
                source_id: 1,
                canteen_id: 101,
                name: "test".into(),
            }]
        );
    }

    #[test]
    fn test_already_archived_untouched() {
        let index = parse_index(b"{}").unwrap();
        let sources = vec![(
            make_source(1, "test", Some("http://example.org/test.xml")),
            CanteenState::Archived,
        )];

        assert!(classify(&index, &sources).is_empty());
    }

    #[test]
    fn test_reactivated() {
        let index = parse_index(br#"{"test": "http://example.org/test.xml"}"#).unwrap();
        let sources = vec![(
            make_source(1, "test", Some("http://example.org/test.xml")),
            CanteenState::Archived,
        )];

        assert_eq!(
            classify(&index, &sources),
            vec![SourceChange::Reactivated {
                source_id: 1,
                canteen_id: 101,
                name: "test".into(),
                url: Some("http://example.org/test.xml".into()),
            }]
        );
    }

    #[test]
    fn test_mixed_changes_ordering() {
        let index = parse_index(
            br#"{"keep": "http://example.org/keep.xml",
                 "update": "http://example.org/update2.xml",
                 "fresh": null}"#,
        )
        .unwrap();
        let sources = vec![
            (
                make_source(1, "gone", Some("http://example.org/gone.xml")),
                CanteenState::Wanted,
            ),
            (
                make_source(2, "keep", Some("http://example.org/keep.xml")),
                CanteenState::Wanted,
            ),
            (
                make_source(3, "update", Some("http://example.org/update.xml")),
                CanteenState::Wanted,
            ),
        ];

        let changes = classify(&index, &sources);
        assert_eq!(changes.len(), 3);
        // Index order for updates/creates, persisted order for archivals.
        assert!(matches!(&changes[0], SourceChange::Updated { name, .. } if name == "update"));
        assert!(matches!(&changes[1], SourceChange::New { name, .. } if name == "fresh"));
        assert!(matches!(&changes[2], SourceChange::Archived { name, .. } if name == "gone"));
    }

    #[test]
    fn test_stats_merge() {
        let mut total = SyncStats::default();
        assert!(total.is_empty());

        total.merge(SyncStats {
            new: 1,
            updated: 2,
            archived: 0,
        });
        total.merge(SyncStats {
            new: 0,
            updated: 1,
            archived: 3,
        });
        assert_eq!(
            total,
            SyncStats {
                new: 1,
                updated: 3,
                archived: 3,
            }
        );
        assert_eq!(total.total(), 7);
    }
}
