//! Playback cursor
//!
//! Maps a clock time onto the anchored segment sequence. The rule is
//! last-start-dominant: a segment stays current until the next start is
//! reached, no matter what its own end says. End values only inform
//! rendering and duration display.

use crate::state::Segment;

/// Output of one cursor resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CursorResolution {
    /// Index of the current segment within the input slice.
    pub current_index: Option<usize>,
    /// Segment whose start was most recently reached.
    pub current: Option<Segment>,
    /// Segment after the current one; the first segment when nothing has
    /// started yet.
    pub next: Option<Segment>,
    /// Seconds until the next segment starts, floored at zero.
    pub time_to_next: Option<f64>,
}

/// Resolve the cursor at time `t`.
///
/// `segments` must be the anchored subset, sorted ascending by start with
/// order breaking ties. The current index is the largest `i` with
/// `segments[i].start <= t`. For a fixed list, the index is non-decreasing
/// in `t`, and repeated calls with equal inputs return equal outputs.
pub fn resolve(segments: &[Segment], t: f64) -> CursorResolution {
    let started = segments.partition_point(|s| s.start.unwrap_or(0.0) <= t);
    let current_index = started.checked_sub(1);
    let next_index = match current_index {
        Some(i) => i + 1,
        None => 0,
    };
    let next = segments.get(next_index).cloned();
    let time_to_next = next
        .as_ref()
        .and_then(|n| n.start)
        .map(|start| (start - t).max(0.0));

    CursorResolution {
        current_index,
        current: current_index.and_then(|i| segments.get(i).cloned()),
        next,
        time_to_next,
    }
}
