//! Live overlay surface
//!
//! Clock-driven adapter over the engine: every clock sample (progress
//! event, poll, or seek) becomes one tick, and every tick yields a frame
//! for the rendering chrome to draw. The session also owns the jump
//! countdown timer; its events are drained into the next frame rather
//! than acted on out-of-band.

use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::constants::{DEFAULT_SEGMENT_DURATION_SECONDS, JUMP_COUNTDOWN_START};
use crate::engine::{
    pack, pinned_rows, resolve, AlertConfig, AlertScheduler, CountdownEvent, CountdownTimer,
    RowLayout,
};
use crate::state::{Segment, ShowModel};

/// Everything the chrome needs to draw one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFrame {
    /// Clock position this frame was resolved at; None when no clock.
    pub clock: Option<f64>,
    /// Segment currently playing.
    pub current: Option<Segment>,
    /// Segment coming up.
    pub next: Option<Segment>,
    /// Seconds until the next segment starts.
    pub time_to_next: Option<f64>,
    /// Whole-second countdown once inside the alert threshold.
    pub countdown_label: Option<u32>,
    /// The threshold ring crossed on this tick.
    pub ring_fired: bool,
    /// Subpart whose entry flash is lit.
    pub flash: Option<String>,
    /// Seconds left on a pending jump, for display.
    pub jump_remaining: Option<u32>,
    /// A jump tick landed this frame; play the audible cue.
    pub jump_cue: bool,
    /// A jump completed; seek the clock here and resume playback.
    pub seek_intent: Option<f64>,
}

/// One live overlay session.
pub struct OverlaySession {
    model: ShowModel,
    anchored: Vec<Segment>,
    alerts: AlertScheduler,
    countdown: CountdownTimer,
    events_tx: UnboundedSender<CountdownEvent>,
    events_rx: UnboundedReceiver<CountdownEvent>,
    jump_remaining: Option<u32>,
}

impl OverlaySession {
    pub fn new(model: &ShowModel) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            anchored: model.anchored_sorted(),
            model: model.clone(),
            alerts: AlertScheduler::default(),
            countdown: CountdownTimer::new(),
            events_tx,
            events_rx,
            jump_remaining: None,
        }
    }

    /// Use custom alert thresholds.
    pub fn with_alert_config(mut self, config: AlertConfig) -> Self {
        self.alerts = AlertScheduler::new(config);
        self
    }

    /// Shorten the jump tick period.
    pub fn with_countdown_period(mut self, period: Duration) -> Self {
        self.set_countdown_period(period);
        self
    }

    /// Replace the jump tick period in place. Any running countdown is
    /// dropped with the old timer.
    pub fn set_countdown_period(&mut self, period: Duration) {
        self.countdown = CountdownTimer::with_period(period);
    }

    /// Swap in a refreshed model. Alert edges and a running countdown
    /// survive the swap; a refresh must never cancel what the user is in
    /// the middle of.
    pub fn replace_model(&mut self, model: &ShowModel) {
        log::debug!("overlay model refresh: {} segments", model.segments.len());
        self.anchored = model.anchored_sorted();
        self.model = model.clone();
    }

    /// The anchored playback sequence.
    pub fn segments(&self) -> &[Segment] {
        &self.anchored
    }

    /// Row layout of the full model, for timeline rendering.
    pub fn layout(&self) -> RowLayout {
        pack(
            &self.model.segments,
            &pinned_rows(&self.model.segments),
            DEFAULT_SEGMENT_DURATION_SECONDS,
        )
    }

    /// Advance one tick with the latest clock sample.
    pub fn tick(&mut self, clock: Option<f64>) -> OverlayFrame {
        let mut frame = OverlayFrame::default();

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                CountdownEvent::Tick { remaining } => {
                    self.jump_remaining = Some(remaining);
                    frame.jump_cue = true;
                }
                CountdownEvent::Finished { target } => {
                    log::debug!("jump countdown finished, seeking to {target}");
                    self.jump_remaining = None;
                    frame.jump_cue = true;
                    frame.seek_intent = Some(target);
                }
            }
        }
        frame.jump_remaining = self.jump_remaining;

        match clock {
            Some(t) => {
                let cursor = resolve(&self.anchored, t);
                let alerts = self.alerts.observe(t, cursor.time_to_next, &self.anchored);
                frame.clock = Some(t);
                frame.current = cursor.current;
                frame.next = cursor.next;
                frame.time_to_next = cursor.time_to_next;
                frame.countdown_label = alerts.countdown_label;
                frame.ring_fired = alerts.ring_fired;
                frame.flash = alerts.flash_lit;
            }
            None => self.alerts.clock_lost(),
        }
        frame
    }

    /// An explicit seek is just a tick at the new position.
    pub fn seek(&mut self, t: f64) -> OverlayFrame {
        self.tick(Some(t))
    }

    /// Begin a jump countdown toward `target`, replacing any running one.
    /// Events already queued by the replaced countdown are discarded, so a
    /// stale finish can never seek to the old target.
    pub fn start_jump(&mut self, target: f64) {
        log::debug!("jump countdown started, target {target}");
        self.countdown.cancel();
        self.discard_countdown_events();
        self.jump_remaining = Some(JUMP_COUNTDOWN_START);
        self.countdown.start(target, self.events_tx.clone());
    }

    /// Dismiss the pending jump without seeking. Any events the countdown
    /// already queued are discarded along with the timer; a dismissed jump
    /// must never surface its seek intent in a later frame.
    pub fn cancel_jump(&mut self) {
        if self.countdown.is_active() {
            log::debug!("jump countdown cancelled");
        }
        self.countdown.cancel();
        self.discard_countdown_events();
        self.jump_remaining = None;
    }

    fn discard_countdown_events(&mut self) {
        while self.events_rx.try_recv().is_ok() {}
    }

    /// Whether a jump countdown is running.
    pub fn jump_active(&self) -> bool {
        self.countdown.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PartRecord;

    fn model(starts: &[(f64, f64)]) -> ShowModel {
        let parts = starts
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| PartRecord {
                id: format!("p{i}"),
                name: format!("p{i}"),
                order: i as i64,
                start: Some(start),
                end: Some(end),
            })
            .collect();
        ShowModel::from_records(parts, vec![])
    }

    #[test]
    fn test_tick_resolves_cursor_and_alerts() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0), (20.0, 50.0), (50.0, 80.0)]));
        let frame = session.tick(Some(25.0));
        assert_eq!(frame.current.as_ref().map(|s| s.id.as_str()), Some("p1"));
        assert_eq!(frame.next.as_ref().map(|s| s.id.as_str()), Some("p2"));
        assert_eq!(frame.time_to_next, Some(25.0));
        assert_eq!(frame.countdown_label, None);

        let frame = session.tick(Some(43.0));
        assert!(frame.ring_fired);
        assert_eq!(frame.countdown_label, Some(7));
    }

    #[test]
    fn test_clock_loss_blanks_frame_and_rearms_ring() {
        let mut session = OverlaySession::new(&model(&[(0.0, 10.0), (20.0, 30.0)]));
        assert!(session.tick(Some(12.0)).ring_fired);

        let blank = session.tick(None);
        assert_eq!(blank.clock, None);
        assert_eq!(blank.current, None);
        assert_eq!(blank.countdown_label, None);

        assert!(session.tick(Some(12.5)).ring_fired);
    }

    #[test]
    fn test_layout_covers_whole_model() {
        let session = OverlaySession::new(&model(&[(0.0, 30.0), (20.0, 50.0), (50.0, 80.0)]));
        let layout = session.layout();
        assert_eq!(layout.row_count(), 2);
    }

    #[tokio::test]
    async fn test_jump_countdown_reaches_seek_intent() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0)]))
            .with_countdown_period(Duration::from_millis(5));
        session.start_jump(12.0);
        assert!(session.jump_active());
        assert_eq!(session.tick(Some(0.0)).jump_remaining, Some(5));

        tokio::time::sleep(Duration::from_millis(60)).await;
        let frame = session.tick(Some(0.0));
        assert!(frame.jump_cue);
        assert_eq!(frame.seek_intent, Some(12.0));
        assert_eq!(frame.jump_remaining, None);
        assert!(!session.jump_active());
    }

    #[tokio::test]
    async fn test_cancel_jump_suppresses_seek() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0)]))
            .with_countdown_period(Duration::from_millis(5));
        session.start_jump(12.0);
        session.cancel_jump();

        tokio::time::sleep(Duration::from_millis(40)).await;
        let frame = session.tick(Some(0.0));
        assert_eq!(frame.seek_intent, None);
        assert_eq!(frame.jump_remaining, None);
        assert!(!session.jump_active());
    }

    #[tokio::test]
    async fn test_cancel_discards_already_queued_seek() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0)]))
            .with_countdown_period(Duration::from_millis(5));
        session.start_jump(12.0);

        // Let the countdown run to completion before the user dismisses
        // it; the finish event is sitting in the channel by then.
        tokio::time::sleep(Duration::from_millis(60)).await;
        session.cancel_jump();

        let frame = session.tick(Some(0.0));
        assert_eq!(frame.seek_intent, None);
        assert!(!frame.jump_cue);
        assert_eq!(frame.jump_remaining, None);
    }

    #[tokio::test]
    async fn test_restart_discards_stale_finish() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0)]))
            .with_countdown_period(Duration::from_millis(5));
        session.start_jump(12.0);
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Last request wins: the finished first countdown must not seek.
        session.start_jump(77.0);
        let frame = session.tick(Some(0.0));
        assert_eq!(frame.seek_intent, None);
        assert_eq!(frame.jump_remaining, Some(5));

        tokio::time::sleep(Duration::from_millis(60)).await;
        let frame = session.tick(Some(0.0));
        assert_eq!(frame.seek_intent, Some(77.0));
    }

    #[tokio::test]
    async fn test_model_refresh_preserves_running_countdown() {
        let mut session = OverlaySession::new(&model(&[(0.0, 30.0)]))
            .with_countdown_period(Duration::from_millis(50));
        session.start_jump(12.0);
        session.replace_model(&model(&[(0.0, 30.0), (40.0, 60.0)]));
        assert!(session.jump_active());
        assert_eq!(session.segments().len(), 2);
    }
}
