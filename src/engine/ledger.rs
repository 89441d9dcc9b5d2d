//! Time assignment ledger
//!
//! Session-scoped boundary edits layered over the persisted segment model.
//! Every successful edit validates ordering against the opposite boundary,
//! records an undo entry, and yields the store patch to persist. The
//! ledger itself never talks to the store; the owning session queues the
//! patches it returns.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::ASSIGNMENT_HISTORY_CAP;
use crate::state::{Mark, Segment};
use crate::store::TimepointPatch;
use crate::util::format_timepoint;

/// Which boundary of a segment an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Start,
    End,
}

impl Boundary {
    /// The boundary an edit is validated against.
    pub fn opposite(self) -> Boundary {
        match self {
            Boundary::Start => Boundary::End,
            Boundary::End => Boundary::Start,
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => write!(f, "start"),
            Boundary::End => write!(f, "end"),
        }
    }
}

/// Key of one assignable boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    /// Segment the boundary belongs to.
    pub segment_id: String,
    /// Which boundary.
    pub boundary: Boundary,
}

impl TargetKey {
    pub fn start(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            boundary: Boundary::Start,
        }
    }

    pub fn end(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            boundary: Boundary::End,
        }
    }
}

/// Where an assigned time came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignSource {
    /// A captured mark, bound by id with its time taken by value.
    Mark {
        /// Mark id, for provenance.
        id: Uuid,
        /// The mark's captured time.
        time: f64,
    },
    /// A directly typed time value.
    Typed(f64),
}

impl AssignSource {
    /// The candidate time, clamped to zero.
    fn time(&self) -> f64 {
        match self {
            AssignSource::Mark { time, .. } => time.max(0.0),
            AssignSource::Typed(time) => time.max(0.0),
        }
    }
}

impl From<&Mark> for AssignSource {
    fn from(mark: &Mark) -> Self {
        AssignSource::Mark {
            id: mark.id,
            time: mark.time,
        }
    }
}

/// One undoable step on a target.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Effective value before the edit; None when the boundary was empty.
    pub previous_value: Option<f64>,
    /// Human-readable description of what undo restores ("start 0:32").
    pub label: String,
    /// When the edit happened.
    pub timestamp: DateTime<Utc>,
}

/// Assignment failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// The candidate time crosses the opposite boundary.
    #[error("{boundary} {attempted}s is out of order with the opposite boundary at {limit}s")]
    OrderViolation {
        /// Boundary being assigned.
        boundary: Boundary,
        /// Candidate time in seconds.
        attempted: f64,
        /// Effective opposite boundary it crossed.
        limit: f64,
    },
    /// The edit referenced a segment the session does not know.
    #[error("unknown segment: {0}")]
    UnknownSegment(String),
    /// The edit referenced a mark that no longer exists.
    #[error("unknown mark: {0}")]
    UnknownMark(Uuid),
}

/// The session overlay of boundary assignments with per-target undo.
#[derive(Debug, Clone)]
pub struct AssignmentLedger {
    /// In-session values; an entry of None means "cleared this session".
    assignments: HashMap<TargetKey, Option<f64>>,
    history: HashMap<TargetKey, Vec<HistoryEntry>>,
    history_cap: usize,
}

impl Default for AssignmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self {
            assignments: HashMap::new(),
            history: HashMap::new(),
            history_cap: ASSIGNMENT_HISTORY_CAP,
        }
    }

    /// The value a boundary currently has: the in-session assignment when
    /// one exists, the persisted value otherwise.
    pub fn effective(&self, key: &TargetKey, persisted: Option<f64>) -> Option<f64> {
        self.assignments.get(key).copied().unwrap_or(persisted)
    }

    /// The in-session assignment for a boundary, if any was made.
    pub fn assignment(&self, key: &TargetKey) -> Option<Option<f64>> {
        self.assignments.get(key).copied()
    }

    /// Undo entries for a target, oldest first.
    pub fn history(&self, key: &TargetKey) -> &[HistoryEntry] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Assign a time to one boundary of `segment` (the persisted record).
    ///
    /// Rejects assignments that would put the boundary on the wrong side
    /// of the opposite boundary's effective value, leaving everything
    /// unchanged. On success returns the patch to persist.
    pub fn assign(
        &mut self,
        segment: &Segment,
        boundary: Boundary,
        source: AssignSource,
    ) -> Result<TimepointPatch, LedgerError> {
        let candidate = source.time();
        let opposite_key = TargetKey {
            segment_id: segment.id.clone(),
            boundary: boundary.opposite(),
        };
        let opposite = self.effective(&opposite_key, persisted_value(segment, boundary.opposite()));

        if let Some(limit) = opposite {
            let violates = match boundary {
                Boundary::Start => candidate > limit,
                Boundary::End => candidate < limit,
            };
            if violates {
                return Err(LedgerError::OrderViolation {
                    boundary,
                    attempted: candidate,
                    limit,
                });
            }
        }

        Ok(self.commit(segment, boundary, Some(candidate)))
    }

    /// Empty one boundary. Never fails ordering; an empty value cannot be
    /// out of order.
    pub fn clear(&mut self, segment: &Segment, boundary: Boundary) -> TimepointPatch {
        self.commit(segment, boundary, None)
    }

    /// Undo the most recent edit on a target. Returns the patch restoring
    /// the previous value, or None when there is nothing to undo.
    pub fn undo(&mut self, segment: &Segment, boundary: Boundary) -> Option<TimepointPatch> {
        let key = TargetKey {
            segment_id: segment.id.clone(),
            boundary,
        };
        let entry = self.history.get_mut(&key)?.pop()?;
        self.assignments.insert(key, entry.previous_value);
        Some(patch_for(boundary, entry.previous_value))
    }

    fn commit(
        &mut self,
        segment: &Segment,
        boundary: Boundary,
        value: Option<f64>,
    ) -> TimepointPatch {
        let key = TargetKey {
            segment_id: segment.id.clone(),
            boundary,
        };
        let previous = self.effective(&key, persisted_value(segment, boundary));

        let stack = self.history.entry(key.clone()).or_default();
        stack.push(HistoryEntry {
            previous_value: previous,
            label: format!("{boundary} {}", format_timepoint(previous)),
            timestamp: Utc::now(),
        });
        if stack.len() > self.history_cap {
            stack.remove(0);
        }

        self.assignments.insert(key, value);
        patch_for(boundary, value)
    }
}

fn persisted_value(segment: &Segment, boundary: Boundary) -> Option<f64> {
    match boundary {
        Boundary::Start => segment.start,
        Boundary::End => segment.end,
    }
}

fn patch_for(boundary: Boundary, value: Option<f64>) -> TimepointPatch {
    let mut patch = TimepointPatch::default();
    match (boundary, value) {
        (Boundary::Start, Some(v)) => patch.set_start(v),
        (Boundary::Start, None) => patch.clear_start(),
        (Boundary::End, Some(v)) => patch.set_end(v),
        (Boundary::End, None) => patch.clear_end(),
    };
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BoundaryPatch;

    fn segment(start: Option<f64>, end: Option<f64>) -> Segment {
        Segment::part("p1", "Opening", 0).with_times(start, end)
    }

    #[test]
    fn test_start_past_end_is_rejected() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, Some(10.0));

        let err = ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(12.4))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::OrderViolation {
                boundary: Boundary::Start,
                attempted: 12.4,
                limit: 10.0
            }
        );
        // Target untouched: no assignment, no history.
        assert_eq!(ledger.assignment(&TargetKey::start("p1")), None);
        assert!(ledger.history(&TargetKey::start("p1")).is_empty());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(Some(20.0), None);
        assert!(ledger
            .assign(&seg, Boundary::End, AssignSource::Typed(15.0))
            .is_err());
    }

    #[test]
    fn test_equal_boundaries_are_allowed() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, Some(10.0));
        assert!(ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(10.0))
            .is_ok());
    }

    #[test]
    fn test_validation_sees_session_values_first() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);

        // No persisted end, but a session end of 10 bounds the start.
        ledger
            .assign(&seg, Boundary::End, AssignSource::Typed(10.0))
            .unwrap();
        let err = ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(12.4))
            .unwrap_err();
        assert!(matches!(err, LedgerError::OrderViolation { limit, .. } if limit == 10.0));
    }

    #[test]
    fn test_assign_emits_store_patch() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);

        let patch = ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(5.0))
            .unwrap();
        assert_eq!(patch.start, BoundaryPatch::Set(5.0));
        assert_eq!(patch.end, BoundaryPatch::Unchanged);

        let patch = ledger.clear(&seg, Boundary::Start);
        assert_eq!(patch.start, BoundaryPatch::Clear);
    }

    #[test]
    fn test_mark_source_clamps_and_records_provenance() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);
        let mark = Mark::at(7.25);

        ledger
            .assign(&seg, Boundary::Start, AssignSource::from(&mark))
            .unwrap();
        assert_eq!(
            ledger.effective(&TargetKey::start("p1"), seg.start),
            Some(7.25)
        );
    }

    #[test]
    fn test_undo_walks_back_to_empty() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);
        let key = TargetKey::start("p1");

        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(5.0))
            .unwrap();
        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(8.0))
            .unwrap();
        assert_eq!(ledger.effective(&key, seg.start), Some(8.0));
        assert_eq!(ledger.history(&key).len(), 2);

        let patch = ledger.undo(&seg, Boundary::Start).unwrap();
        assert_eq!(patch.start, BoundaryPatch::Set(5.0));
        assert_eq!(ledger.effective(&key, seg.start), Some(5.0));

        let patch = ledger.undo(&seg, Boundary::Start).unwrap();
        assert_eq!(patch.start, BoundaryPatch::Clear);
        assert_eq!(ledger.effective(&key, seg.start), None);

        assert_eq!(ledger.undo(&seg, Boundary::Start), None);
        assert_eq!(ledger.effective(&key, seg.start), None);
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(Some(3.0), None);
        let key = TargetKey::start("p1");

        ledger.clear(&seg, Boundary::Start);
        assert_eq!(ledger.effective(&key, seg.start), None);

        ledger.undo(&seg, Boundary::Start).unwrap();
        assert_eq!(ledger.effective(&key, seg.start), Some(3.0));
    }

    #[test]
    fn test_default_ledger_keeps_undo_history() {
        let mut ledger = AssignmentLedger::default();
        let seg = segment(None, None);
        let key = TargetKey::start("p1");

        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(5.0))
            .unwrap();
        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(8.0))
            .unwrap();

        ledger.undo(&seg, Boundary::Start).unwrap();
        assert_eq!(ledger.effective(&key, seg.start), Some(5.0));
        ledger.undo(&seg, Boundary::Start).unwrap();
        assert_eq!(ledger.effective(&key, seg.start), None);
    }

    #[test]
    fn test_history_drops_oldest_beyond_cap() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);
        let key = TargetKey::start("p1");

        for value in 1..=8 {
            ledger
                .assign(&seg, Boundary::Start, AssignSource::Typed(value as f64))
                .unwrap();
        }
        assert_eq!(ledger.history(&key).len(), ASSIGNMENT_HISTORY_CAP);

        // Walk the whole surviving stack: previous values 7 down to 2.
        for expected in (2..=7).rev() {
            ledger.undo(&seg, Boundary::Start).unwrap();
            assert_eq!(ledger.effective(&key, seg.start), Some(expected as f64));
        }
        assert_eq!(ledger.undo(&seg, Boundary::Start), None);
    }

    #[test]
    fn test_history_labels_describe_replaced_value() {
        let mut ledger = AssignmentLedger::new();
        let seg = segment(None, None);
        let key = TargetKey::start("p1");

        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(32.0))
            .unwrap();
        ledger
            .assign(&seg, Boundary::Start, AssignSource::Typed(40.0))
            .unwrap();

        let labels: Vec<&str> = ledger.history(&key).iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["start --:--", "start 0:32"]);
    }
}
