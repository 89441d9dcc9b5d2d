use serde::{Deserialize, Serialize};

/// What to do with one boundary when writing a segment back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BoundaryPatch {
    /// Leave the stored value alone.
    #[default]
    Unchanged,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(f64),
}

impl BoundaryPatch {
    /// Apply this patch to an in-memory boundary slot.
    pub fn apply(&self, slot: &mut Option<f64>) {
        match self {
            BoundaryPatch::Unchanged => {}
            BoundaryPatch::Clear => *slot = None,
            BoundaryPatch::Set(value) => *slot = Some(*value),
        }
    }
}

/// A pending write against one segment's timepoints. Unchanged boundaries
/// are never touched, so concurrent edits to the opposite boundary survive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimepointPatch {
    /// Start boundary action.
    pub start: BoundaryPatch,
    /// End boundary action.
    pub end: BoundaryPatch,
}

impl TimepointPatch {
    /// Patch that sets the start boundary.
    pub fn set_start(&mut self, value: f64) -> &mut Self {
        self.start = BoundaryPatch::Set(value);
        self
    }

    /// Patch that sets the end boundary.
    pub fn set_end(&mut self, value: f64) -> &mut Self {
        self.end = BoundaryPatch::Set(value);
        self
    }

    /// Patch that clears the start boundary.
    pub fn clear_start(&mut self) -> &mut Self {
        self.start = BoundaryPatch::Clear;
        self
    }

    /// Patch that clears the end boundary.
    pub fn clear_end(&mut self) -> &mut Self {
        self.end = BoundaryPatch::Clear;
        self
    }

    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.start == BoundaryPatch::Unchanged && self.end == BoundaryPatch::Unchanged
    }

    /// Apply both boundary actions to in-memory slots.
    pub fn apply(&self, start: &mut Option<f64>, end: &mut Option<f64>) {
        self.start.apply(start);
        self.end.apply(end);
    }

    /// Fold a later patch into this one. The later action wins per
    /// boundary, so a queue of patches collapses to a single write.
    pub fn merge(&mut self, later: &TimepointPatch) {
        if later.start != BoundaryPatch::Unchanged {
            self.start = later.start;
        }
        if later.end != BoundaryPatch::Unchanged {
            self.end = later.end;
        }
    }
}
