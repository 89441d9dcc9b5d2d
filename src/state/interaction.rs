use uuid::Uuid;

/// Drag interaction state for the authoring surface.
///
/// Exactly one gesture can be in flight at a time; starting a new one
/// replaces the old. A gesture either commits (via take) or cancels, and
/// either way the state returns to idle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in flight.
    #[default]
    Idle,
    /// A segment is being dragged along the timeline.
    DraggingSegment {
        /// Segment being moved.
        id: String,
        /// Seconds between the segment start and the grab point.
        grab_offset: f64,
    },
    /// A mark is being dragged toward a segment boundary.
    DraggingMark {
        /// Mark being moved.
        id: Uuid,
    },
}

impl InteractionState {
    /// Whether no gesture is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Begin dragging a segment. Replaces any gesture already in flight.
    pub fn begin_segment_drag(&mut self, id: impl Into<String>, grab_offset: f64) {
        *self = InteractionState::DraggingSegment {
            id: id.into(),
            grab_offset,
        };
    }

    /// Begin dragging a mark. Replaces any gesture already in flight.
    pub fn begin_mark_drag(&mut self, id: Uuid) {
        *self = InteractionState::DraggingMark { id };
    }

    /// Abandon the gesture in flight, if any.
    pub fn cancel(&mut self) {
        *self = InteractionState::Idle;
    }

    /// Take the gesture for committing, leaving the state idle.
    pub fn take(&mut self) -> InteractionState {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_replaces_active_gesture() {
        let mut state = InteractionState::default();
        assert!(state.is_idle());

        state.begin_segment_drag("p1", 1.5);
        let mark = Uuid::new_v4();
        state.begin_mark_drag(mark);
        assert_eq!(state, InteractionState::DraggingMark { id: mark });
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut state = InteractionState::default();
        state.begin_segment_drag("p1", 0.0);
        state.cancel();
        assert!(state.is_idle());
    }

    #[test]
    fn test_take_commits_exactly_once() {
        let mut state = InteractionState::default();
        state.begin_segment_drag("p1", 2.0);
        let taken = state.take();
        assert_eq!(
            taken,
            InteractionState::DraggingSegment {
                id: "p1".to_string(),
                grab_offset: 2.0
            }
        );
        assert!(state.is_idle());
        assert!(state.take().is_idle());
    }
}
