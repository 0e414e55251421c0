//! Propagation simulation engine — broadcasts a shredded block N times.
//!
//! Each trial draws a fixed broadcast tree per shred (a seeded shuffle of all
//! node ids), then floods shreds through root → relay → leaf hops until a
//! round delivers nothing new. A node that accumulates at least 32 of the 64
//! shreds reconstructs the 32 data shreds and forwards them in later rounds,
//! so recovery feeds propagation.
//!
//! Adversary model: malicious nodes are online and receive shreds normally but
//! never forward them (withholding).

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

use crate::constants::{
    l2_start, BATCH_SIZE, DATA_MASK, DATA_SHREDS, L1_SIZE, L2_FANOUT, NUM_NODES, RECOVER_THRESHOLD,
};

/// SplitMix64 increment, used to spread per-shred tree seeds.
const SEED_MIX: u64 = 0x9e3779b97f4a7c15;

/// Cluster make-up for a batch of trials.
///
/// Node ids `0..NUM_NODES`: ids below `malicious_nodes` are malicious, ids
/// below `online_nodes` are online, the rest are offline. Malicious nodes are
/// drawn from the online set, so `malicious_nodes ≤ online_nodes` must hold
/// (validated at the CLI boundary).
#[derive(Clone, Copy)]
pub struct SimulationConfig {
    pub online_nodes: usize,
    pub malicious_nodes: usize,
}

impl SimulationConfig {
    /// Build from fractions in `[0, 1]`; node counts truncate.
    pub fn from_fractions(online_fraction: f64, malicious_fraction: f64) -> Self {
        Self {
            online_nodes: (online_fraction * NUM_NODES as f64) as usize,
            malicious_nodes: (malicious_fraction * NUM_NODES as f64) as usize,
        }
    }

    #[inline(always)]
    fn online(&self, node: usize) -> bool {
        node < self.online_nodes
    }

    #[inline(always)]
    fn malicious(&self, node: usize) -> bool {
        node < self.malicious_nodes
    }

    /// Per-hop delivery probability seen by the analytic model: the fraction
    /// of nodes that both receive and forward.
    pub fn hop_probability(&self) -> f64 {
        (self.online_nodes - self.malicious_nodes) as f64 / NUM_NODES as f64
    }
}

/// Per-trial outcome.
#[derive(Clone, Copy, Default)]
pub struct TrialRecord {
    /// Nodes holding all 32 data shreds when propagation stops.
    pub recovered: u32,
    /// Same count restricted to non-malicious nodes.
    pub honest_recovered: u32,
    /// Transmission sweeps executed, including the final empty one.
    pub rounds: u32,
}

impl TrialRecord {
    pub fn recovered_fraction(&self) -> f64 {
        self.recovered as f64 / NUM_NODES as f64
    }

    pub fn honest_fraction(&self) -> f64 {
        self.honest_recovered as f64 / NUM_NODES as f64
    }
}

/// Results of a batch of trials.
pub struct SimulationResult {
    pub records: Vec<TrialRecord>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub elapsed: std::time::Duration,
}

/// Fixed broadcast trees for one trial: `trees[shred]` is a shuffle of all
/// node ids. Position 0 is the root, positions `1..=L1_SIZE` the relays, the
/// rest leaves in consecutive neighborhoods of `L2_FANOUT` (last one short).
fn build_trees(trial_seed: u64) -> Vec<Vec<u32>> {
    (0..BATCH_SIZE)
        .map(|shred| {
            let mut rng =
                SmallRng::seed_from_u64(trial_seed ^ (shred as u64).wrapping_mul(SEED_MIX));
            let mut tree: Vec<u32> = (0..NUM_NODES as u32).collect();
            tree.shuffle(&mut rng);
            tree
        })
        .collect()
}

/// Run one trial to completion, returning the final holder counts.
pub fn simulate_trial(config: &SimulationConfig, trial_seed: u64) -> TrialRecord {
    let trees = build_trees(trial_seed);
    // Shred set per node, one bit per shred; the low 32 bits are data shreds.
    let mut shreds = vec![0u64; NUM_NODES];
    let mut rounds = 0u32;

    loop {
        let mut touched: HashSet<usize> = HashSet::new();
        // Coding shreds travel only in round 0; they are never reconstructed,
        // so re-flooding them adds nothing.
        let shred_count = if rounds == 0 { BATCH_SIZE } else { DATA_SHREDS };

        for (shred, tree) in trees.iter().enumerate().take(shred_count) {
            let bit = 1u64 << shred;

            // Leader hop: an online root hands the shred to itself and every
            // online relay.
            let root = tree[0] as usize;
            if config.online(root) {
                for &node in &tree[..=L1_SIZE] {
                    let node = node as usize;
                    if config.online(node) && shreds[node] & bit == 0 {
                        shreds[node] |= bit;
                        touched.insert(node);
                    }
                }
            }

            // Relay hop, run every round regardless of the root: a relay may
            // hold a shred through reconstruction even when the root never
            // delivered it. Online relays holding the shred forward it to the
            // online nodes of their neighborhood; malicious relays withhold.
            for position in 1..=L1_SIZE {
                let relay = tree[position] as usize;
                if !config.online(relay) || config.malicious(relay) || shreds[relay] & bit == 0 {
                    continue;
                }
                let start = l2_start(position);
                let end = (start + L2_FANOUT).min(NUM_NODES);
                for &leaf in &tree[start..end] {
                    let leaf = leaf as usize;
                    if config.online(leaf) && shreds[leaf] & bit == 0 {
                        shreds[leaf] |= bit;
                        touched.insert(leaf);
                    }
                }
            }
        }

        rounds += 1;
        if touched.is_empty() {
            break;
        }

        // Reconstruction: any 32 of the 64 shreds rebuild the 32 data shreds.
        for node in touched {
            if shreds[node].count_ones() as usize >= RECOVER_THRESHOLD {
                shreds[node] |= DATA_MASK;
            }
        }
    }

    let mut recovered = 0u32;
    let mut honest_recovered = 0u32;
    for (node, &set) in shreds.iter().enumerate() {
        if set & DATA_MASK == DATA_MASK {
            recovered += 1;
            if !config.malicious(node) {
                honest_recovered += 1;
            }
        }
    }

    TrialRecord {
        recovered,
        honest_recovered,
        rounds,
    }
}

/// Simulate N trials in parallel, returning per-trial records plus aggregates
/// of the recovered fraction.
pub fn simulate_batch(config: &SimulationConfig, trials: usize, seed: u64) -> SimulationResult {
    let start = Instant::now();

    let records: Vec<TrialRecord> = (0..trials)
        .into_par_iter()
        .map(|i| simulate_trial(config, seed.wrapping_add(i as u64)))
        .collect();

    let elapsed = start.elapsed();

    let mut fractions: Vec<f64> = records.iter().map(|r| r.recovered_fraction()).collect();
    fractions.sort_unstable_by(f64::total_cmp);

    let sum: f64 = fractions.iter().sum();
    let mean = sum / trials as f64;
    let variance: f64 =
        fractions.iter().map(|&f| (f - mean).powi(2)).sum::<f64>() / trials as f64;
    let std_dev = variance.sqrt();

    SimulationResult {
        mean,
        std_dev,
        min: fractions[0],
        max: *fractions.last().unwrap(),
        median: fractions[trials / 2],
        elapsed,
        records,
    }
}
