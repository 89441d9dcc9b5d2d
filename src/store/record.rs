use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::TimepointPatch;

/// Errors surfaced by a show store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the request.
    #[error("store request failed: {0}")]
    Backend(String),
    /// A record or snapshot could not be decoded.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A write referenced a segment the store does not know.
    #[error("unknown segment: {0}")]
    UnknownSegment(String),
}

/// A persisted top-level part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    /// Stable record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ordinal within the performance.
    #[serde(default)]
    pub order: i64,
    /// Timeline start in seconds, when placed.
    #[serde(default)]
    pub start: Option<f64>,
    /// Timeline end in seconds, when timed.
    #[serde(default)]
    pub end: Option<f64>,
}

/// A persisted subpart belonging to one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubpartRecord {
    /// Stable record id.
    pub id: String,
    /// Owning part id.
    pub part_id: String,
    /// Display title.
    pub title: String,
    /// Ordinal within the part.
    #[serde(default)]
    pub order: i64,
    /// Timeline start in seconds, when placed.
    #[serde(default)]
    pub start: Option<f64>,
    /// Timeline end in seconds, when timed.
    #[serde(default)]
    pub end: Option<f64>,
}

/// Backend access to persisted show content.
///
/// Implementations are expected to be remote and fallible; callers treat
/// every error as transient and keep their local state untouched.
#[allow(async_fn_in_trait)]
pub trait ShowStore {
    /// Fetch all parts of a performance.
    async fn fetch_parts(&self, performance_id: &str) -> Result<Vec<PartRecord>, StoreError>;

    /// Fetch all subparts of one part.
    async fn fetch_subparts(&self, part_id: &str) -> Result<Vec<SubpartRecord>, StoreError>;

    /// Write a timepoint patch for one segment.
    async fn update_segment_timepoints(
        &self,
        segment_id: &str,
        patch: &TimepointPatch,
    ) -> Result<(), StoreError>;
}
