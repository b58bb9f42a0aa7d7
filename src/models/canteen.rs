//! Canteen entity and lifecycle state.

use serde::{Deserialize, Serialize};

/// Canteen identifier.
pub type CanteenId = i64;

/// Lifecycle state of a canteen.
///
/// Only `wanted` and `archived` are driven by the reconciler: a canteen is
/// archived when its source disappears from the index and set back to wanted
/// when it reappears. The remaining states belong to external workflows and
/// are never touched here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanteenState {
    New,
    Wanted,
    Confirmed,
    Archived,
}

impl CanteenState {
    pub fn is_archived(self) -> bool {
        matches!(self, CanteenState::Archived)
    }
}

/// A physical canteen location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canteen {
    pub id: CanteenId,

    /// Display name, taken from the index entry that discovered it
    pub name: String,

    /// Lifecycle state
    pub state: CanteenState,
}
