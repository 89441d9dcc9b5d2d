//! Authoring / marking surface
//!
//! The session behind the timing tool: capture marks while the music
//! plays, bind them to segment boundaries through the ledger, drag
//! segments and marks on the timeline, and push the resulting edits to
//! the store on a periodic best-effort autosave.
//!
//! The persisted model is refreshed in the background; everything the
//! user is in the middle of (ledger assignments, an open drag, a running
//! countdown) lives session-side and survives the refresh.

use std::time::Duration;

use uuid::Uuid;

use crate::engine::{
    AssignSource, AssignmentLedger, Boundary, HistoryEntry, LedgerError, RowLayout, TargetKey,
};
use crate::state::{InteractionState, MarkSheet, Segment, ShowModel};
use crate::store::{ShowStore, StoreError, TimepointPatch};
use crate::surfaces::{OverlayFrame, OverlaySession};

/// One authoring session over a performance.
pub struct MarkingSession {
    performance_id: String,
    show: ShowModel,
    marks: MarkSheet,
    ledger: AssignmentLedger,
    interaction: InteractionState,
    playback: OverlaySession,
    pending: Vec<(String, TimepointPatch)>,
    dirty: bool,
    save_in_flight: bool,
}

impl MarkingSession {
    pub fn new(performance_id: impl Into<String>) -> Self {
        let show = ShowModel::default();
        Self {
            performance_id: performance_id.into(),
            playback: OverlaySession::new(&show),
            show,
            marks: MarkSheet::new(),
            ledger: AssignmentLedger::new(),
            interaction: InteractionState::Idle,
            pending: Vec::new(),
            dirty: false,
            save_in_flight: false,
        }
    }

    pub fn performance_id(&self) -> &str {
        &self.performance_id
    }

    /// The persisted snapshot, without session edits.
    pub fn show(&self) -> &ShowModel {
        &self.show
    }

    /// Captured marks.
    pub fn marks(&self) -> &MarkSheet {
        &self.marks
    }

    /// The gesture in flight, if any.
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Unsaved edits exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ---- snapshot refresh -------------------------------------------------

    /// Re-fetch the performance from the store. On any failure the prior
    /// snapshot stays in place. Session state (marks, assignments, an open
    /// gesture, a running countdown) is never touched by a refresh.
    pub async fn refresh(&mut self, store: &impl ShowStore) -> Result<(), StoreError> {
        let parts = store.fetch_parts(&self.performance_id).await?;
        let mut subparts = Vec::new();
        for part in &parts {
            subparts.extend(store.fetch_subparts(&part.id).await?);
        }
        let model = ShowModel::from_records(parts, subparts);
        log::debug!(
            "snapshot refresh for {}: {} segments",
            self.performance_id,
            model.segments.len()
        );
        self.show = model;
        self.sync_playback();
        Ok(())
    }

    // ---- working view -----------------------------------------------------

    /// Persisted segments with the session's assignments layered on top.
    /// This is what the authoring timeline draws and plays against.
    pub fn working_segments(&self) -> Vec<Segment> {
        self.show
            .segments
            .iter()
            .map(|segment| {
                let mut merged = segment.clone();
                merged.start = self
                    .ledger
                    .effective(&TargetKey::start(&segment.id), segment.start);
                merged.end = self
                    .ledger
                    .effective(&TargetKey::end(&segment.id), segment.end);
                merged.sanitize();
                merged
            })
            .collect()
    }

    /// Row layout of the working view.
    pub fn layout(&self) -> RowLayout {
        self.playback.layout()
    }

    /// The effective value of one boundary in the working view.
    pub fn effective(&self, segment_id: &str, boundary: Boundary) -> Option<f64> {
        let persisted = self.show.segment(segment_id).and_then(|s| match boundary {
            Boundary::Start => s.start,
            Boundary::End => s.end,
        });
        self.ledger.effective(
            &TargetKey {
                segment_id: segment_id.to_string(),
                boundary,
            },
            persisted,
        )
    }

    /// Undo entries for one boundary, oldest first.
    pub fn history(&self, segment_id: &str, boundary: Boundary) -> &[HistoryEntry] {
        self.ledger.history(&TargetKey {
            segment_id: segment_id.to_string(),
            boundary,
        })
    }

    fn sync_playback(&mut self) {
        let working = ShowModel {
            segments: self.working_segments(),
        };
        self.playback.replace_model(&working);
    }

    // ---- playback delegation ----------------------------------------------

    /// Advance one playback tick with the latest clock sample.
    pub fn tick(&mut self, clock: Option<f64>) -> OverlayFrame {
        self.playback.tick(clock)
    }

    /// An explicit seek is just a tick at the new position.
    pub fn seek(&mut self, t: f64) -> OverlayFrame {
        self.playback.seek(t)
    }

    /// Begin a jump countdown toward `target`.
    pub fn start_jump(&mut self, target: f64) {
        self.playback.start_jump(target);
    }

    /// Dismiss the pending jump without seeking.
    pub fn cancel_jump(&mut self) {
        self.playback.cancel_jump();
    }

    /// Whether a jump countdown is running.
    pub fn jump_active(&self) -> bool {
        self.playback.jump_active()
    }

    /// Shorten the jump tick period. The playback session keeps its synced
    /// working view and alert state.
    pub fn with_countdown_period(mut self, period: Duration) -> Self {
        self.playback.set_countdown_period(period);
        self
    }

    // ---- marks ------------------------------------------------------------

    /// Capture a mark at the given clock time.
    pub fn capture_mark(&mut self, t: f64) -> Uuid {
        self.marks.capture(t)
    }

    /// Start a fresh mark row for subsequent captures.
    pub fn new_mark_row(&mut self) -> Uuid {
        self.marks.new_row()
    }

    /// Delete a mark. Assignments made from it keep their captured time.
    pub fn remove_mark(&mut self, id: Uuid) -> bool {
        self.marks.remove_mark(id)
    }

    // ---- assignments ------------------------------------------------------

    /// Bind a captured mark to a segment boundary.
    pub fn assign_mark(
        &mut self,
        mark_id: Uuid,
        segment_id: &str,
        boundary: Boundary,
    ) -> Result<(), LedgerError> {
        let mark = self
            .marks
            .find_mark(mark_id)
            .ok_or(LedgerError::UnknownMark(mark_id))?;
        let source = AssignSource::from(mark);
        self.assign(segment_id, boundary, source)
    }

    /// Assign a directly typed time to a segment boundary.
    pub fn assign_time(
        &mut self,
        segment_id: &str,
        boundary: Boundary,
        t: f64,
    ) -> Result<(), LedgerError> {
        self.assign(segment_id, boundary, AssignSource::Typed(t))
    }

    /// Empty a segment boundary.
    pub fn clear_assignment(
        &mut self,
        segment_id: &str,
        boundary: Boundary,
    ) -> Result<(), LedgerError> {
        let segment = self
            .show
            .segment(segment_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownSegment(segment_id.to_string()))?;
        let patch = self.ledger.clear(&segment, boundary);
        self.queue(segment_id, patch);
        self.sync_playback();
        Ok(())
    }

    /// Undo the most recent edit on one boundary. Returns false when there
    /// is nothing to undo.
    pub fn undo_assignment(
        &mut self,
        segment_id: &str,
        boundary: Boundary,
    ) -> Result<bool, LedgerError> {
        let segment = self
            .show
            .segment(segment_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownSegment(segment_id.to_string()))?;
        match self.ledger.undo(&segment, boundary) {
            Some(patch) => {
                self.queue(segment_id, patch);
                self.sync_playback();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn assign(
        &mut self,
        segment_id: &str,
        boundary: Boundary,
        source: AssignSource,
    ) -> Result<(), LedgerError> {
        let segment = self
            .show
            .segment(segment_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownSegment(segment_id.to_string()))?;
        let patch = self.ledger.assign(&segment, boundary, source)?;
        self.queue(segment_id, patch);
        self.sync_playback();
        Ok(())
    }

    // ---- drag gestures ----------------------------------------------------

    /// Start dragging a segment grabbed at clock time `grab_time`.
    pub fn begin_segment_drag(
        &mut self,
        segment_id: &str,
        grab_time: f64,
    ) -> Result<(), LedgerError> {
        if self.show.segment(segment_id).is_none() {
            return Err(LedgerError::UnknownSegment(segment_id.to_string()));
        }
        let start = self.effective(segment_id, Boundary::Start);
        let grab_offset = start.map_or(0.0, |s| grab_time - s);
        self.interaction.begin_segment_drag(segment_id, grab_offset);
        Ok(())
    }

    /// Start dragging a mark toward a boundary.
    pub fn begin_mark_drag(&mut self, mark_id: Uuid) -> Result<(), LedgerError> {
        if self.marks.find_mark(mark_id).is_none() {
            return Err(LedgerError::UnknownMark(mark_id));
        }
        self.interaction.begin_mark_drag(mark_id);
        Ok(())
    }

    /// Abandon the gesture in flight.
    pub fn cancel_drag(&mut self) {
        self.interaction.cancel();
    }

    /// Commit a segment drag at `drop_time`. The segment keeps its
    /// duration: both boundaries shift together. Returns false when no
    /// segment drag was in flight.
    pub fn drop_segment(&mut self, drop_time: f64) -> Result<bool, LedgerError> {
        let (segment_id, grab_offset) = match &self.interaction {
            InteractionState::DraggingSegment { id, grab_offset } => (id.clone(), *grab_offset),
            _ => return Ok(false),
        };
        self.interaction.cancel();

        let old_start = self.effective(&segment_id, Boundary::Start);
        let old_end = self.effective(&segment_id, Boundary::End);
        let new_start = (drop_time - grab_offset).max(0.0);

        match (old_start, old_end) {
            (Some(start), Some(end)) => {
                let new_end = new_start + (end - start);
                // Commit the leading boundary first so the pair never
                // trips the order check mid-move.
                if new_start >= start {
                    self.assign_time(&segment_id, Boundary::End, new_end)?;
                    self.assign_time(&segment_id, Boundary::Start, new_start)?;
                } else {
                    self.assign_time(&segment_id, Boundary::Start, new_start)?;
                    self.assign_time(&segment_id, Boundary::End, new_end)?;
                }
            }
            _ => self.assign_time(&segment_id, Boundary::Start, new_start)?,
        }
        Ok(true)
    }

    /// Commit a mark drag onto a segment boundary. Returns false when no
    /// mark drag was in flight.
    pub fn drop_mark(&mut self, segment_id: &str, boundary: Boundary) -> Result<bool, LedgerError> {
        let mark_id = match &self.interaction {
            InteractionState::DraggingMark { id } => *id,
            _ => return Ok(false),
        };
        self.interaction.cancel();
        self.assign_mark(mark_id, segment_id, boundary)?;
        Ok(true)
    }

    // ---- autosave ---------------------------------------------------------

    fn queue(&mut self, segment_id: &str, patch: TimepointPatch) {
        if patch.is_empty() {
            return;
        }
        match self.pending.iter_mut().find(|(id, _)| id == segment_id) {
            Some((_, existing)) => existing.merge(&patch),
            None => self.pending.push((segment_id.to_string(), patch)),
        }
        self.dirty = true;
    }

    /// Push pending edits to the store. Skips silently when a save is
    /// already in flight or nothing is dirty. A failed write puts the
    /// unsent edits back and leaves the session dirty so the next
    /// scheduled flush retries.
    pub async fn flush(&mut self, store: &impl ShowStore) -> Result<(), StoreError> {
        if self.save_in_flight || !self.dirty {
            return Ok(());
        }
        self.save_in_flight = true;
        self.dirty = false;

        let outbox = std::mem::take(&mut self.pending);
        let total = outbox.len();
        let mut queued = outbox.into_iter();
        while let Some((segment_id, patch)) = queued.next() {
            if let Err(err) = store.update_segment_timepoints(&segment_id, &patch).await {
                log::warn!("save failed for segment {segment_id}: {err}");
                self.pending = std::iter::once((segment_id, patch)).chain(queued).collect();
                self.dirty = true;
                self.save_in_flight = false;
                return Err(err);
            }
        }
        log::debug!("saved {total} segment timepoint updates");
        self.save_in_flight = false;
        Ok(())
    }
}
