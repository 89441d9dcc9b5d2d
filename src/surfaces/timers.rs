//! Session timers
//!
//! Owned periodic triggers for the background duties of a session:
//! autosave flushes and snapshot refreshes. A timer only sends ticks; the
//! embedding drives the actual flush or refresh on each one, so the work
//! always happens on the session's own execution context.
//!
//! Replacing a timer drops the old one, which aborts its task; at most
//! one instance per duty is ever live.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::constants::{AUTOSAVE_INTERVAL_MS, SNAPSHOT_REFRESH_INTERVAL_MS};

/// An owned repeating tick source.
#[derive(Debug)]
pub struct PeriodicTimer {
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTimer {
    /// Ticks at the autosave cadence.
    pub fn autosave(ticks: UnboundedSender<()>) -> Self {
        Self::every(ticks, Duration::from_millis(AUTOSAVE_INTERVAL_MS))
    }

    /// Ticks at the snapshot refresh cadence.
    pub fn snapshot_refresh(ticks: UnboundedSender<()>) -> Self {
        Self::every(ticks, Duration::from_millis(SNAPSHOT_REFRESH_INTERVAL_MS))
    }

    /// Ticks at a custom period.
    pub fn every(ticks: UnboundedSender<()>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first interval tick completes immediately; skip it so a
            // fresh timer waits a full period before its first duty.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if ticks.send(()).is_err() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop ticking. Synchronous.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the timer task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_timer_ticks_until_dropped() {
        let (tx, mut rx) = unbounded_channel();
        let timer = PeriodicTimer::every(tx, Duration::from_millis(5));
        assert!(timer.is_running());
        assert_eq!(rx.recv().await, Some(()));
        assert_eq!(rx.recv().await, Some(()));
        drop(timer);
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_replacing_timer_aborts_the_old_task() {
        let (tx, mut rx) = unbounded_channel();
        let mut timer = PeriodicTimer::every(tx.clone(), Duration::from_millis(5));
        timer = PeriodicTimer::every(tx, Duration::from_millis(5));
        assert!(timer.is_running());
        drop(timer);
        // Both tasks are gone, so the channel drains and closes.
        while rx.recv().await.is_some() {}
    }
}
