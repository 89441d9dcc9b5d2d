use serde::{Deserialize, Serialize};

use crate::store::{PartRecord, SubpartRecord};

/// Whether a segment is a top-level part or a subpart within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// A choreography part of the show.
    Part,
    /// A subpart nested under a part.
    Subpart,
}

/// A named, optionally time-anchored unit placed on the shared timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Record id assigned by the external store.
    pub id: String,
    /// Display name (part name or subpart title).
    pub name: String,
    /// Part vs. subpart.
    pub kind: SegmentKind,
    /// Parent part id for subparts.
    pub parent_id: Option<String>,
    /// Start timepoint in seconds, when anchored.
    pub start: Option<f64>,
    /// End timepoint in seconds.
    pub end: Option<f64>,
    /// Tie-break for identical starts and for unanchored ordering.
    pub order: i64,
    /// Manual layout row override.
    #[serde(default)]
    pub pinned_row: Option<usize>,
}

impl Segment {
    /// Create an unanchored part.
    pub fn part(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: SegmentKind::Part,
            parent_id: None,
            start: None,
            end: None,
            order,
            pinned_row: None,
        }
    }

    /// Create an unanchored subpart of a part.
    pub fn subpart(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: title.into(),
            kind: SegmentKind::Subpart,
            parent_id: Some(parent_id.into()),
            start: None,
            end: None,
            order,
            pinned_row: None,
        }
    }

    /// Set the start/end timepoints, returning self for chaining.
    pub fn with_times(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.start = start;
        self.end = end;
        self.sanitize();
        self
    }

    /// Set the pinned layout row, returning self for chaining.
    pub fn with_pinned_row(mut self, row: usize) -> Self {
        self.pinned_row = Some(row);
        self
    }

    /// True when the segment has a usable start timepoint.
    ///
    /// Unanchored segments are excluded from cursor resolution and routed
    /// to the layout's unassigned bucket.
    pub fn is_anchored(&self) -> bool {
        matches!(self.start, Some(s) if s.is_finite())
    }

    /// End of the interval this segment occupies on screen: the explicit
    /// `end`, or `start + default_duration` for point events. `None` when
    /// unanchored.
    pub fn effective_end(&self, default_duration: f64) -> Option<f64> {
        let start = self.start.filter(|s| s.is_finite())?;
        Some(self.end.unwrap_or(start + default_duration))
    }

    /// True when this segment's visual interval overlaps `[range_start, range_end)`.
    pub fn overlaps(&self, range_start: f64, range_end: f64, default_duration: f64) -> bool {
        match (self.start, self.effective_end(default_duration)) {
            (Some(start), Some(end)) => start < range_end && end > range_start,
            _ => false,
        }
    }

    /// Normalize malformed time data from the store.
    ///
    /// Non-finite values become unanchored; a negative start clamps to 0;
    /// an end before the start is dropped (point event).
    pub fn sanitize(&mut self) {
        self.start = self.start.filter(|s| s.is_finite()).map(|s| s.max(0.0));
        self.end = self.end.filter(|e| e.is_finite());
        if self.start.is_none() {
            self.end = None;
            return;
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                self.end = None;
            }
        }
    }
}

impl From<&PartRecord> for Segment {
    fn from(record: &PartRecord) -> Self {
        Segment::part(record.id.clone(), record.name.clone(), record.order)
            .with_times(record.start, record.end)
    }
}

impl From<&SubpartRecord> for Segment {
    fn from(record: &SubpartRecord) -> Self {
        Segment::subpart(
            record.id.clone(),
            record.part_id.clone(),
            record.title.clone(),
            record.order,
        )
        .with_times(record.start, record.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchoring() {
        let anchored = Segment::part("p1", "Opener", 0).with_times(Some(10.0), Some(30.0));
        assert!(anchored.is_anchored());

        let unanchored = Segment::part("p2", "Finale", 1);
        assert!(!unanchored.is_anchored());

        let malformed = Segment::part("p3", "Bridge", 2).with_times(Some(f64::NAN), None);
        assert!(!malformed.is_anchored());
    }

    #[test]
    fn test_effective_end() {
        let timed = Segment::part("p1", "Opener", 0).with_times(Some(10.0), Some(30.0));
        assert_eq!(timed.effective_end(2.0), Some(30.0));

        let point = Segment::part("p2", "Hit", 1).with_times(Some(10.0), None);
        assert_eq!(point.effective_end(2.0), Some(12.0));

        let zero = Segment::part("p3", "Sting", 2).with_times(Some(10.0), Some(10.0));
        assert_eq!(zero.effective_end(2.0), Some(10.0));

        assert_eq!(Segment::part("p4", "Finale", 3).effective_end(2.0), None);
    }

    #[test]
    fn test_sanitize_malformed_times() {
        let negative = Segment::part("p1", "Opener", 0).with_times(Some(-3.0), Some(5.0));
        assert_eq!(negative.start, Some(0.0));
        assert_eq!(negative.end, Some(5.0));

        let inverted = Segment::part("p2", "Bridge", 1).with_times(Some(20.0), Some(12.0));
        assert_eq!(inverted.start, Some(20.0));
        assert_eq!(inverted.end, None);

        let endless = Segment::part("p3", "Tag", 2).with_times(None, Some(40.0));
        assert_eq!(endless.start, None);
        assert_eq!(endless.end, None);
    }

    #[test]
    fn test_overlaps() {
        let seg = Segment::part("p1", "Opener", 0).with_times(Some(5.0), Some(15.0));
        assert!(seg.overlaps(0.0, 10.0, 2.0));
        assert!(seg.overlaps(10.0, 20.0, 2.0));
        assert!(!seg.overlaps(0.0, 5.0, 2.0));
        assert!(!seg.overlaps(15.0, 20.0, 2.0));
        assert!(!Segment::part("p2", "Finale", 1).overlaps(0.0, 100.0, 2.0));
    }
}
