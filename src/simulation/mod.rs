//! Monte Carlo propagation and statistics.
//!
//! - [`engine`]: Core simulation (broadcast a shredded block through the tree N times)
//! - [`statistics`]: Aggregate statistics from trial records

pub mod engine;
pub mod statistics;

// Re-export commonly used items
pub use engine::{
    simulate_batch, simulate_trial, SimulationConfig, SimulationResult, TrialRecord,
};
pub use statistics::{
    aggregate_statistics, analytic_summary, save_statistics, AnalyticSummary, RunStatistics,
};
