//! Three-way structural merge over parsed entry lists.
//!
//! Grounded on `other_examples`' merge-plan conventions (deterministic,
//! serializable plan/result structs; `PredictedConflict`-shaped conflict
//! records) for the shape of [`MergeResult`]/[`Conflict`], adapted to
//! Thalo's entry-identity model. The three-way classification algorithm
//! itself follows the core spec directly, since no corpus example
//! implements a structural (non-line-based) three-way merge.

mod driver;
mod identity;
mod markers;

pub use driver::merge;

use serde::{Deserialize, Serialize};

/// Conflict-marker rendering style for unresolved regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    #[default]
    Git,
    Diff3,
}

/// A single unresolved conflict, identified by the entry identity it
/// occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// `duplicate-link-id`, `concurrent-title-change`,
    /// `concurrent-metadata-update`, `concurrent-content-edit`,
    /// `incompatible-schema-change`, or `parse-error`.
    pub kind: String,
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_key: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeStats {
    pub total_entries: usize,
    pub ours_only: usize,
    pub theirs_only: usize,
    pub common: usize,
    pub auto_merged: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub success: bool,
    pub content: String,
    pub conflicts: Vec<Conflict>,
    pub stats: MergeStats,
}
