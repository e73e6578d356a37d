//! Deterministic placement engine.
//!
//! Tasks are taken in priority order and placed on their worker's calendar as
//! soon as the worker, the task's milestone and all of its predecessors allow.
//! Tasks whose predecessors are not yet placed are deferred to a later pass.

mod core;
mod roster;
mod state;

pub use core::Scheduler;
pub use roster::Roster;
pub use state::{Placement, PlacementContext};
