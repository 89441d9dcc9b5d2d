//! Alert scheduling
//!
//! Edge-triggered notification state driven by successive cursor
//! resolutions. One scheduler instance lives per playback surface and is
//! fed every tick, whether the tick came from a native progress event, the
//! safety-net poll, or an explicit seek.

use crate::constants::{
    ALERT_THRESHOLD_SECONDS, FLASH_DURATION_SECONDS, FLASH_ENTRY_EPSILON_SECONDS,
};
use crate::state::{Segment, SegmentKind};

/// Thresholds and windows for the alert machines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Ring when time-to-next first drops to this many seconds.
    pub ring_threshold: f64,
    /// Window after a subpart start during which entry is detected.
    pub flash_epsilon: f64,
    /// How long an armed flash stays lit.
    pub flash_duration: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            ring_threshold: ALERT_THRESHOLD_SECONDS,
            flash_epsilon: FLASH_ENTRY_EPSILON_SECONDS,
            flash_duration: FLASH_DURATION_SECONDS,
        }
    }
}

/// Alert outputs of a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickAlerts {
    /// The ring crossed its threshold on this tick.
    pub ring_fired: bool,
    /// Whole-second countdown to the next segment, once inside the
    /// threshold.
    pub countdown_label: Option<u32>,
    /// Subpart whose start was entered on this tick.
    pub flash_entered: Option<String>,
    /// Subpart whose flash visual is currently lit.
    pub flash_lit: Option<String>,
}

/// Per-surface alert state.
#[derive(Debug, Clone, Default)]
pub struct AlertScheduler {
    config: AlertConfig,
    last_time_to_next: Option<f64>,
    last_flashed_id: Option<String>,
    lit: Option<Lit>,
}

#[derive(Debug, Clone)]
struct Lit {
    id: String,
    until: f64,
}

impl AlertScheduler {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Feed one tick. `time_to_next` comes from the cursor resolution at
    /// clock time `t`; `segments` is the same anchored sorted list the
    /// cursor ran against.
    pub fn observe(&mut self, t: f64, time_to_next: Option<f64>, segments: &[Segment]) -> TickAlerts {
        let ring_fired = match time_to_next {
            Some(now) if now <= self.config.ring_threshold => self
                .last_time_to_next
                .map_or(true, |prev| prev > self.config.ring_threshold),
            _ => false,
        };
        // The stored value always advances, so a backward seek above the
        // threshold re-arms the edge.
        self.last_time_to_next = time_to_next;

        let countdown_label = time_to_next
            .filter(|ttn| *ttn <= self.config.ring_threshold)
            .map(|ttn| ttn.ceil() as u32);

        let mut flash_entered = None;
        let entered = segments.iter().find(|s| {
            s.kind == SegmentKind::Subpart
                && s.start
                    .is_some_and(|start| start <= t && t < start + self.config.flash_epsilon)
        });
        if let Some(subpart) = entered {
            if self.last_flashed_id.as_deref() != Some(subpart.id.as_str()) {
                self.last_flashed_id = Some(subpart.id.clone());
                self.lit = Some(Lit {
                    id: subpart.id.clone(),
                    until: t + self.config.flash_duration,
                });
                flash_entered = Some(subpart.id.clone());
            }
        }
        // A backward seek out of the flash window clears the visual too;
        // the light must never outlive its window by clock distance.
        if self
            .lit
            .as_ref()
            .is_some_and(|lit| t >= lit.until || t < lit.until - self.config.flash_duration)
        {
            self.lit = None;
        }

        TickAlerts {
            ring_fired,
            countdown_label,
            flash_entered,
            flash_lit: self.lit.as_ref().map(|lit| lit.id.clone()),
        }
    }

    /// The clock disappeared. Forget the ring edge so a regained clock
    /// inside the threshold rings again; the flash latch stays, re-entry
    /// of the same subpart is not a new entry.
    pub fn clock_lost(&mut self) {
        self.last_time_to_next = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_seq(scheduler: &mut AlertScheduler, seq: &[f64]) -> usize {
        seq.iter()
            .filter(|ttn| scheduler.observe(0.0, Some(**ttn), &[]).ring_fired)
            .count()
    }

    #[test]
    fn test_ring_fires_once_per_crossing() {
        let mut scheduler = AlertScheduler::default();
        assert_eq!(observe_seq(&mut scheduler, &[15.0, 12.0, 9.0, 7.0]), 1);
    }

    #[test]
    fn test_ring_refires_after_backward_seek() {
        let mut scheduler = AlertScheduler::default();
        observe_seq(&mut scheduler, &[15.0, 12.0, 9.0, 7.0]);
        // Seek back above the threshold, then cross again.
        assert!(!scheduler.observe(0.0, Some(11.0), &[]).ring_fired);
        assert!(scheduler.observe(0.0, Some(8.0), &[]).ring_fired);
    }

    #[test]
    fn test_ring_fires_on_first_observation_inside_threshold() {
        let mut scheduler = AlertScheduler::default();
        assert!(scheduler.observe(0.0, Some(6.0), &[]).ring_fired);
    }

    #[test]
    fn test_ring_rearms_after_clock_loss() {
        let mut scheduler = AlertScheduler::default();
        observe_seq(&mut scheduler, &[12.0, 9.0]);
        scheduler.clock_lost();
        assert!(scheduler.observe(0.0, Some(8.0), &[]).ring_fired);
    }

    #[test]
    fn test_countdown_label_is_derived_each_tick() {
        let mut scheduler = AlertScheduler::default();
        assert_eq!(scheduler.observe(0.0, Some(10.5), &[]).countdown_label, None);
        assert_eq!(
            scheduler.observe(0.0, Some(9.3), &[]).countdown_label,
            Some(10)
        );
        assert_eq!(
            scheduler.observe(0.0, Some(9.3), &[]).countdown_label,
            Some(10)
        );
        assert_eq!(
            scheduler.observe(0.0, Some(0.0), &[]).countdown_label,
            Some(0)
        );
        assert_eq!(scheduler.observe(0.0, None, &[]).countdown_label, None);
    }

    fn subpart(id: &str, start: f64) -> Segment {
        Segment::subpart(id, "p1", id, 0).with_times(Some(start), None)
    }

    #[test]
    fn test_flash_fires_once_inside_entry_window() {
        let mut scheduler = AlertScheduler::default();
        let segs = vec![subpart("s1", 30.0)];

        let first = scheduler.observe(30.1, None, &segs);
        assert_eq!(first.flash_entered.as_deref(), Some("s1"));
        assert_eq!(first.flash_lit.as_deref(), Some("s1"));

        // Still inside the epsilon window: no re-entry, still lit.
        let second = scheduler.observe(30.2, None, &segs);
        assert_eq!(second.flash_entered, None);
        assert_eq!(second.flash_lit.as_deref(), Some("s1"));

        // Past the flash duration the visual clears.
        let third = scheduler.observe(30.6, None, &segs);
        assert_eq!(third.flash_lit, None);
    }

    #[test]
    fn test_backward_seek_clears_lit_flash() {
        let mut scheduler = AlertScheduler::default();
        let segs = vec![subpart("s1", 30.0)];
        assert!(scheduler.observe(30.2, None, &segs).flash_lit.is_some());

        // Seeking back long before the entry window turns the light off.
        let alerts = scheduler.observe(5.0, None, &segs);
        assert_eq!(alerts.flash_lit, None);
    }

    #[test]
    fn test_flash_only_triggers_for_subparts() {
        let mut scheduler = AlertScheduler::default();
        let segs = vec![Segment::part("p1", "p1", 0).with_times(Some(30.0), None)];
        let alerts = scheduler.observe(30.1, None, &segs);
        assert_eq!(alerts.flash_entered, None);
    }

    #[test]
    fn test_flash_rearms_on_different_subpart() {
        let mut scheduler = AlertScheduler::default();
        let segs = vec![subpart("s1", 30.0), subpart("s2", 40.0)];
        assert_eq!(
            scheduler.observe(30.1, None, &segs).flash_entered.as_deref(),
            Some("s1")
        );
        assert_eq!(
            scheduler.observe(40.0, None, &segs).flash_entered.as_deref(),
            Some("s2")
        );
    }
}
