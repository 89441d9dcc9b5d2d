//! Surface adapters
//!
//! Thin sessions wiring the engine to each place it runs: the live
//! overlay, the standalone export player, and the authoring tool. All
//! three consume the same engine modules; the adapters only supply the
//! clock and event sources and shape per-tick frames for rendering.

mod marking;
mod overlay;
mod player;
mod timers;

pub use marking::*;
pub use overlay::*;
pub use player::*;
pub use timers::*;
