//! Timeline synchronization engine for rehearsal and performance
//! planning tools.
//!
//! A performance is modeled as time-anchored segments (parts and their
//! subparts) laid over one audio timeline. The engine packs segments into
//! non-overlapping display rows, resolves which segment is current for a
//! clock position, schedules threshold alerts, runs cancellable jump
//! countdowns, and maintains the mark-to-boundary assignment ledger with
//! validation and undo.
//!
//! Three session adapters expose the engine to its consumers: the live
//! playback overlay, the standalone export player, and the authoring
//! tool. The engine itself never renders, never owns audio playback, and
//! never persists; it consumes a media clock and emits frames, seek
//! intents, and store mutation requests.

pub mod constants;
pub mod engine;
pub mod state;
pub mod store;
pub mod surfaces;
pub mod util;
