//! # Turbine-sim — shred propagation analysis for a Turbine-style broadcast tree
//!
//! A block is erasure-coded into a batch of 64 shreds (32 data + 32 coding) and
//! broadcast root → relays → leaf neighborhoods. Any 32 of the 64 shreds
//! reconstruct all 32 data shreds. Two independent views of the same question —
//! how much of the cluster ends up holding the block:
//!
//! | Component | Rust module | Description |
//! |-----------|-------------|-------------|
//! | Recurrence evaluator | [`recurrences`] | Memoized mutually-recursive model of per-level delivery and recovery (C/D/R/B) |
//! | Monte Carlo simulator | [`simulation`] | Per-shred shuffled trees, withholding adversaries, iterative recovery rounds |
//!
//! ## Topology
//!
//! 10 000 nodes: 1 root, 200 level-1 relays, 9 799 level-2 leaves partitioned
//! into per-relay neighborhoods of 49 ([`constants`]). The simulator draws a
//! fresh seeded shuffle of all node ids per shred, so a node's tree position
//! varies shred to shred.
//!
//! ## Model vs. simulation
//!
//! The recurrences assume a fixed tree with independent hops; the simulation
//! reshuffles per shred and feeds recovered data shreds back into later
//! rounds. Level-1 model values reduce to exact binomial tails; deeper levels
//! are raw, unclamped quantities (see [`recurrences`]). The simulate binary
//! reports both views side by side.

pub mod constants;
pub mod env_config;
pub mod recurrences;
pub mod simulation;
