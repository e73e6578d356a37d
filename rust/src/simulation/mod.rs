//! Monte Carlo simulation over sampled task durations.
//!
//! Each trial samples every task's duration from its triangular estimate,
//! places the whole graph with fresh worker cursors and records the completion
//! date per milestone and per synthetic project key.

mod distribution;
mod engine;
mod result;

pub use distribution::CompletionDistribution;
pub use engine::{SimulationCancellation, Simulator};
pub use result::SimulationResult;
