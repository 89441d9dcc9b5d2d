//! Standalone export player surface
//!
//! Adapter for the self-contained export: decode the embedded snapshot,
//! then run the exact same session logic as the live overlay against it.
//! The player adds nothing of its own beyond media-source selection.

use crate::engine::RowLayout;
use crate::state::{Segment, ShowModel};
use crate::store::{ExportSnapshot, StoreError};
use crate::surfaces::{OverlayFrame, OverlaySession};

/// A playback session over an embedded export document.
pub struct ExportPlayer {
    snapshot: ExportSnapshot,
    session: OverlaySession,
}

impl ExportPlayer {
    /// Decode the embedded JSON and build the session.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot = ExportSnapshot::from_json(json)?;
        let model = snapshot.model();
        log::debug!(
            "export player loaded: {} parts, {} segments",
            snapshot.parts.len(),
            model.segments.len()
        );
        Ok(Self {
            session: OverlaySession::new(&model),
            snapshot,
        })
    }

    /// The decoded export document.
    pub fn snapshot(&self) -> &ExportSnapshot {
        &self.snapshot
    }

    /// The timeline model the player runs against.
    pub fn model(&self) -> ShowModel {
        self.snapshot.model()
    }

    /// Audio to load, preferring embedded data over a remote URL.
    pub fn audio_source(&self) -> Option<&str> {
        self.snapshot.audio_source()
    }

    /// Row layout for drawing the export timeline.
    pub fn layout(&self) -> RowLayout {
        self.session.layout()
    }

    /// The anchored playback sequence.
    pub fn segments(&self) -> &[Segment] {
        self.session.segments()
    }

    /// Advance one tick with the latest clock sample.
    pub fn tick(&mut self, clock: Option<f64>) -> OverlayFrame {
        self.session.tick(clock)
    }

    /// An explicit seek is just a tick at the new position.
    pub fn seek(&mut self, t: f64) -> OverlayFrame {
        self.session.seek(t)
    }

    /// Begin a jump countdown toward `target`.
    pub fn start_jump(&mut self, target: f64) {
        self.session.start_jump(target);
    }

    /// Dismiss the pending jump without seeking.
    pub fn cancel_jump(&mut self) {
        self.session.cancel_jump();
    }

    /// Whether a jump countdown is running.
    pub fn jump_active(&self) -> bool {
        self.session.jump_active()
    }
}
