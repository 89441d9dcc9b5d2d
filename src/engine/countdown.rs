//! Jump countdown
//!
//! A cancellable "jump in 5..4..3.." sequence that ends in a seek intent.
//! The state machine is pure and synchronous; CountdownTimer wraps it in
//! an owned tokio task for surfaces driven by real time.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::constants::{JUMP_COUNTDOWN_START, JUMP_COUNTDOWN_TICK_MS};

/// Countdown lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CountdownState {
    /// No jump pending.
    #[default]
    Idle,
    /// Counting down toward a seek.
    CountingDown {
        /// Seconds left before the jump.
        remaining: u32,
        /// Clock position to seek to.
        target: f64,
    },
}

/// Events emitted while a countdown runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownEvent {
    /// One second elapsed; play the cue and show `remaining`.
    Tick {
        /// Seconds left before the jump.
        remaining: u32,
    },
    /// The countdown completed; seek to `target` and resume playback.
    Finished {
        /// Clock position to seek to.
        target: f64,
    },
}

/// The pure countdown state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpCountdown {
    state: CountdownState,
}

impl JumpCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Whether a countdown is running.
    pub fn is_active(&self) -> bool {
        matches!(self.state, CountdownState::CountingDown { .. })
    }

    /// Begin counting down toward `target`. Replaces any countdown already
    /// running (last request wins).
    pub fn start(&mut self, target: f64) {
        self.state = CountdownState::CountingDown {
            remaining: JUMP_COUNTDOWN_START,
            target,
        };
    }

    /// Abandon the countdown without seeking.
    pub fn cancel(&mut self) {
        self.state = CountdownState::Idle;
    }

    /// Advance one second. Returns the event to act on, or None when idle.
    pub fn tick(&mut self) -> Option<CountdownEvent> {
        match self.state {
            CountdownState::Idle => None,
            CountdownState::CountingDown { remaining, target } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = CountdownState::Idle;
                    Some(CountdownEvent::Finished { target })
                } else {
                    self.state = CountdownState::CountingDown { remaining, target };
                    Some(CountdownEvent::Tick { remaining })
                }
            }
        }
    }
}

/// Owned timer driving a JumpCountdown once per second on a tokio task.
///
/// Exactly one task is ever live: starting aborts the previous task, and
/// dropping the timer aborts whatever is still running.
#[derive(Debug)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            handle: None,
            period: Duration::from_millis(JUMP_COUNTDOWN_TICK_MS),
        }
    }

    /// Override the tick period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            handle: None,
            period,
        }
    }

    /// Start counting down toward `target`, sending events on `events`.
    /// Cancels any countdown already running first.
    pub fn start(&mut self, target: f64, events: UnboundedSender<CountdownEvent>) {
        self.cancel();
        let period = self.period;
        let mut countdown = JumpCountdown::new();
        countdown.start(target);
        self.handle = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                match countdown.tick() {
                    Some(event @ CountdownEvent::Finished { .. }) => {
                        let _ = events.send(event);
                        break;
                    }
                    Some(event) => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }));
    }

    /// Abort the running countdown, if any. No event is emitted.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a countdown task is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
