use serde::{Deserialize, Serialize};

use crate::state::segment::{Segment, SegmentKind};
use crate::store::{PartRecord, SubpartRecord, TimepointPatch};

/// The timeline content of one performance: every part and subpart,
/// sanitized and ready for layout and playback resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowModel {
    /// All segments, parts first, each part followed by its subparts.
    pub segments: Vec<Segment>,
}

impl ShowModel {
    /// Build a model from persisted records. Each segment is sanitized on
    /// the way in, so downstream consumers never see malformed times.
    pub fn from_records(parts: Vec<PartRecord>, subparts: Vec<SubpartRecord>) -> Self {
        let mut segments = Vec::with_capacity(parts.len() + subparts.len());
        for part in &parts {
            segments.push(Segment::from(part));
            for sub in subparts.iter().filter(|s| s.part_id == part.id) {
                segments.push(Segment::from(sub));
            }
        }
        // Subparts whose parent never arrived still belong to the model.
        for sub in subparts
            .iter()
            .filter(|s| !parts.iter().any(|p| p.id == s.part_id))
        {
            segments.push(Segment::from(sub));
        }
        for segment in &mut segments {
            segment.sanitize();
        }
        Self { segments }
    }

    /// Find a segment by id.
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Find a segment by id, mutably.
    pub fn segment_mut(&mut self, id: &str) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// All top-level parts, in record order.
    pub fn parts(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.kind == SegmentKind::Part)
    }

    /// Subparts belonging to one part, in record order.
    pub fn subparts_of<'a>(&'a self, part_id: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments
            .iter()
            .filter(move |s| s.kind == SegmentKind::Subpart && s.parent_id.as_deref() == Some(part_id))
    }

    /// Anchored segments sorted by start time, order index breaking ties.
    /// This is the sequence playback resolution walks.
    pub fn anchored_sorted(&self) -> Vec<Segment> {
        let mut anchored: Vec<Segment> = self
            .segments
            .iter()
            .filter(|s| s.is_anchored())
            .cloned()
            .collect();
        anchored.sort_by(|a, b| {
            a.start
                .unwrap_or(0.0)
                .total_cmp(&b.start.unwrap_or(0.0))
                .then(a.order.cmp(&b.order))
        });
        anchored
    }

    /// Latest effective end across all anchored segments, or zero when
    /// nothing is anchored.
    pub fn duration(&self, default_duration: f64) -> f64 {
        self.segments
            .iter()
            .filter_map(|s| s.effective_end(default_duration))
            .fold(0.0, f64::max)
    }

    /// Apply a timepoint patch to one segment, re-sanitizing afterwards.
    /// Returns false when the segment does not exist.
    pub fn apply_timepoints(&mut self, id: &str, patch: &TimepointPatch) -> bool {
        match self.segment_mut(id) {
            Some(segment) => {
                patch.apply(&mut segment.start, &mut segment.end);
                segment.sanitize();
                true
            }
            None => false,
        }
    }
}
