//! Persistence boundary
//!
//! The engine never talks to a backend directly; it works against the
//! ShowStore trait and the record shapes defined here, plus the embedded
//! snapshot format standalone exports carry.

mod export;
mod patch;
mod record;

pub use export::*;
pub use patch::*;
pub use record::*;
