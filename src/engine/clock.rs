//! Media clock access
//!
//! The engine never owns audio playback. It reads positions from whatever
//! clock the embedding surface provides and treats an absent position as
//! "no clock right now". The poller is the safety net for clocks that do
//! not push frequent progress events of their own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::constants::CLOCK_POLL_INTERVAL_MS;

/// A readable playback clock.
pub trait MediaClock: Send + Sync {
    /// Current position in seconds, or None when no media is loaded or
    /// the clock is temporarily unavailable.
    fn position(&self) -> Option<f64>;
}

/// Owned periodic sampler of a MediaClock.
///
/// Sends one sample per period until stopped or dropped.
#[derive(Debug)]
pub struct ClockPoller {
    handle: Option<JoinHandle<()>>,
}

impl ClockPoller {
    /// Start polling at the default safety-net interval.
    pub fn start(clock: Arc<dyn MediaClock>, samples: UnboundedSender<Option<f64>>) -> Self {
        Self::start_with_period(clock, samples, Duration::from_millis(CLOCK_POLL_INTERVAL_MS))
    }

    /// Start polling at a custom interval.
    pub fn start_with_period(
        clock: Arc<dyn MediaClock>,
        samples: UnboundedSender<Option<f64>>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if samples.send(clock.position()).is_err() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop polling. Synchronous; no further samples are sent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the polling task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ClockPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
