//! Row packing
//!
//! Assigns time-anchored segments to the minimum number of display rows
//! such that no two segments in a row overlap, with support for manual
//! row pins. Pure functions over their inputs; every surface renders the
//! same layout by calling the same packer.

use std::collections::HashMap;

use crate::state::Segment;

/// One display row of non-overlapping segments, sorted by start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Segments in this row, ascending by start.
    pub segments: Vec<Segment>,
}

impl Row {
    /// Effective end of the latest segment in the row.
    fn last_effective_end(&self, default_duration: f64) -> Option<f64> {
        self.segments
            .last()
            .and_then(|s| s.effective_end(default_duration))
    }

    /// Insert keeping the row sorted by start, order breaking ties.
    fn insert_sorted(&mut self, segment: Segment) {
        let at = self
            .segments
            .partition_point(|s| sort_key(s) <= sort_key(&segment));
        self.segments.insert(at, segment);
    }
}

/// The packed layout: rows for anchored segments, a bucket for the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowLayout {
    /// Display rows, index 0 topmost. Rows may be empty when pins skip
    /// indices.
    pub rows: Vec<Row>,
    /// Unanchored segments, sorted by order then id.
    pub unassigned: Vec<Segment>,
}

impl RowLayout {
    /// Number of rows, padding included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row index holding the given segment.
    pub fn row_of(&self, segment_id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.segments.iter().any(|s| s.id == segment_id))
    }
}

fn sort_key(segment: &Segment) -> (f64, i64) {
    (segment.start.unwrap_or(0.0), segment.order)
}

/// Collect per-segment row pins into the map form pack consumes.
pub fn pinned_rows(segments: &[Segment]) -> HashMap<String, usize> {
    segments
        .iter()
        .filter_map(|s| s.pinned_row.map(|row| (s.id.clone(), row)))
        .collect()
}

/// Pack segments into display rows.
///
/// Runs in two phases: a greedy first-fit pass over the unpinned anchored
/// segments (which yields the minimum row count for that subset), then a
/// pin pass that drops each pinned segment into its requested row index,
/// padding with empty rows as needed. Pinned placement never checks
/// overlap; the caller owns conflict awareness. Unanchored segments skip
/// layout entirely and land in `unassigned`.
pub fn pack(
    segments: &[Segment],
    pinned: &HashMap<String, usize>,
    default_duration: f64,
) -> RowLayout {
    let mut layout = RowLayout::default();

    let mut anchored: Vec<&Segment> = segments.iter().filter(|s| s.is_anchored()).collect();
    anchored.sort_by(|a, b| {
        sort_key(a)
            .0
            .total_cmp(&sort_key(b).0)
            .then(a.order.cmp(&b.order))
    });

    layout.unassigned = segments
        .iter()
        .filter(|s| !s.is_anchored())
        .cloned()
        .collect();
    layout
        .unassigned
        .sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));

    // Phase 1: greedy first-fit over the unpinned segments.
    for segment in anchored.iter().filter(|s| !pinned.contains_key(&s.id)) {
        let start = segment.start.unwrap_or(0.0);
        let fit = layout.rows.iter_mut().find(|row| {
            row.last_effective_end(default_duration)
                .is_some_and(|end| end <= start)
        });
        match fit {
            Some(row) => row.segments.push((*segment).clone()),
            None => layout.rows.push(Row {
                segments: vec![(*segment).clone()],
            }),
        }
    }

    // Phase 2: pins land exactly where requested.
    for segment in anchored.iter().filter(|s| pinned.contains_key(&s.id)) {
        let index = pinned[&segment.id];
        while layout.rows.len() <= index {
            layout.rows.push(Row::default());
        }
        layout.rows[index].insert_sorted((*segment).clone());
    }

    layout
}
