//! Shared engine constants: alert thresholds, timer periods, and layout
//! defaults. Components take these as explicit parameters; the values here
//! are the defaults every surface starts from.

/// Assumed visual duration (seconds) for a segment with a `start` but no
/// `end`. Display-only; never written back to the store.
pub const DEFAULT_SEGMENT_DURATION_SECONDS: f64 = 2.0;

/// "Time to next" threshold (seconds) below which the ring fires and the
/// get-ready countdown label is shown.
pub const ALERT_THRESHOLD_SECONDS: f64 = 10.0;

/// Window (seconds) after a subpart's start during which entering it arms
/// the flash highlight.
pub const FLASH_ENTRY_EPSILON_SECONDS: f64 = 0.35;

/// How long (seconds) the flash highlight stays lit once armed.
pub const FLASH_DURATION_SECONDS: f64 = 0.4;

/// Seconds counted down before a jump seeks the clock.
pub const JUMP_COUNTDOWN_START: u32 = 5;

/// Interval between jump countdown ticks.
pub const JUMP_COUNTDOWN_TICK_MS: u64 = 1_000;

/// Safety-net poll interval for clocks that do not emit frequent progress
/// events.
pub const CLOCK_POLL_INTERVAL_MS: u64 = 500;

/// Interval between auto-save attempts in the authoring surface.
pub const AUTOSAVE_INTERVAL_MS: u64 = 6_000;

/// Interval between background snapshot refreshes from the store.
pub const SNAPSHOT_REFRESH_INTERVAL_MS: u64 = 10_000;

/// Maximum undo entries kept per assignment target.
pub const ASSIGNMENT_HISTORY_CAP: usize = 6;
