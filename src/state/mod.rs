//! State management module
//!
//! This module contains the core data structures for the engine:
//! - Segment: Parts and subparts placed on the shared timeline
//! - ShowModel: The full segment set of one performance
//! - Mark / MarkSheet: Captured timestamps awaiting assignment
//! - InteractionState: Drag gestures on the authoring surface

mod interaction;
mod mark;
mod segment;
mod show;

pub use interaction::*;
pub use mark::*;
pub use segment::*;
pub use show::*;
