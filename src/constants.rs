//! Batch geometry and broadcast-tree topology constants.
//!
//! A block is erasure-coded into batches of [`BATCH_SIZE`] shreds:
//! [`DATA_SHREDS`] data shreds followed by [`CODING_SHREDS`] coding shreds.
//! Holding any [`RECOVER_THRESHOLD`] of the 64 lets a node reconstruct the
//! 32 data shreds, so only data shreds ever need retransmission.
//!
//! The tree has three levels: one root (the leader), [`L1_SIZE`] relay nodes,
//! and [`L2_NODES`] leaves partitioned into per-relay neighborhoods of
//! [`L2_FANOUT`]. Node *positions* are reshuffled per shred; node *identities*
//! (which determine online/malicious status) are fixed per trial.

/// Shreds per FEC batch: 32 data + 32 coding.
pub const BATCH_SIZE: usize = 64;

/// Data shreds per batch (the payload the block is reassembled from).
pub const DATA_SHREDS: usize = 32;

/// Coding shreds per batch. Forwarded once, never recovered.
pub const CODING_SHREDS: usize = BATCH_SIZE - DATA_SHREDS;

/// Minimum distinct shreds needed to reconstruct the data shreds.
pub const RECOVER_THRESHOLD: usize = 32;

/// Total nodes in the simulated cluster.
pub const NUM_NODES: usize = 10_000;

/// Level-1 relay count (direct children of the root).
pub const L1_SIZE: usize = 200;

/// Level-2 leaf count: everything that is neither root nor relay.
pub const L2_NODES: usize = NUM_NODES - L1_SIZE - 1;

/// Leaves per relay neighborhood (ceiling division; the last neighborhood
/// is short). Every leaf has exactly one parent relay.
pub const L2_FANOUT: usize = L2_NODES.div_ceil(L1_SIZE);

/// Bitmask over a node's shred set with every data shred present.
pub const DATA_MASK: u64 = (1u64 << DATA_SHREDS) - 1;

/// Start of relay `i`'s leaf neighborhood in a shuffled position array,
/// for `i` in `1..=L1_SIZE`. The neighborhood is
/// `positions[l2_start(i)..min(l2_start(i) + L2_FANOUT, NUM_NODES)]`.
#[inline(always)]
pub fn l2_start(relay_position: usize) -> usize {
    1 + L1_SIZE + (relay_position - 1) * L2_FANOUT
}
