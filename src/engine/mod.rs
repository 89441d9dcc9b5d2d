//! Timeline engine
//!
//! The shared logic every surface runs: row packing, cursor resolution,
//! alert scheduling, the jump countdown, and the assignment ledger. The
//! layout and cursor modules are pure functions of their inputs; the rest
//! are small state machines. Nothing in here renders or persists.

mod alerts;
mod clock;
mod countdown;
mod cursor;
mod layout;
mod ledger;

pub use alerts::*;
pub use clock::*;
pub use countdown::*;
pub use cursor::*;
pub use layout::*;
pub use ledger::*;
