//! Analytic recovery recurrences for the broadcast tree.
//!
//! Models the probability that a node `l` hops below the leader obtains a full
//! FEC batch, given a per-hop delivery probability `p`. Four mutually recursive
//! quantities, written here in the notation used throughout the docs:
//!
//! | Quantity | Meaning | Definition |
//! |----------|---------|------------|
//! | `C(l,p)` | a given *coding* shred is held at level `l` | `1` if `l ≤ 0`, else `p^(l+1)` |
//! | `D(l,p)` | a given *data* shred is held at level `l` | `1` if `l ≤ 0`, else `p·D(l−1,p) + R(l,p)` |
//! | `R(l,p)` | level-`l` node reconstructs via erasure decoding | `0` if `l == 0`, else the double sum below |
//! | `B(l,p)` | level-`l` node obtains the full batch | `(p·D(l−1,p))^32 + R(l,p)` |
//!
//! `R` sums, over total received shred counts `n` in `32..64`, the probability
//! of holding exactly `d` of the 32 data shreds and `n−d` of the 32 coding
//! shreds (each shred arriving independently with probability `p·D(l−1,p)`
//! resp. `p·C(l−1,p)`), weighted by `(1−p)^(64−n)` for the missing shreds:
//!
//! ```text
//! R(l,p) = Σ_{n=32}^{63} (1−p)^(64−n) · Σ_{d=n−32}^{31} comb(32,d)·(p·D(l−1,p))^d
//!                                                      · comb(32,n−d)·(p·C(l−1,p))^(n−d)
//! ```
//!
//! The `l ≤ 0` base-case guard on `C` and `D` is part of the contract: negative
//! levels collapse to the base case, which is what makes `B(0,p)` well-defined
//! (`D(−1,p) = 1`, so `B(0,p) = p^32`).
//!
//! `D` adds forwarded and recovered mass without subtracting their overlap, so
//! values at `l ≥ 1` are raw model quantities rather than probabilities: at
//! `p = 0.75`, `D(1,p) ≈ 1.75` and `B(2,p) ≈ 6.0e3`. `B(1,p)` alone reduces
//! exactly to the binomial tail `P(Bin(64,p) ≥ 32)`. Callers get the raw
//! values; nothing clamps.
//!
//! All four functions are memoized per `(l, p)` pair — top-down dynamic
//! programming over the mutual recursion, one table per quantity, entries kept
//! for the model's lifetime. Binomial coefficients are exact `u64` integers
//! built once; they enter the floating-point products only at evaluation time.

use std::collections::HashMap;

use crate::constants::{BATCH_SIZE, DATA_SHREDS, RECOVER_THRESHOLD};

/// Memo key: (level, exact bit pattern of p).
type MemoKey = (i32, u64);

/// Row 32 of Pascal's triangle: `comb(32, k)` for `k` in `0..=32`, exact.
/// Largest entry is comb(32,16) = 601 080 390, far inside u64 range.
fn binomial_row_32() -> [u64; DATA_SHREDS + 1] {
    let mut row = [0u64; DATA_SHREDS + 1];
    row[0] = 1;
    for n in 1..=DATA_SHREDS {
        for k in (1..=n).rev() {
            row[k] += row[k - 1];
        }
    }
    row
}

/// Memoized evaluator for the recovery recurrences.
///
/// Holds the exact binomial row and one memo table per quantity. Methods take
/// `&mut self` because evaluation populates the tables; results for a given
/// `(level, p)` pair are computed once and are bit-identical on every
/// subsequent call.
pub struct RecoveryModel {
    /// comb(32, k), exact.
    choose_32: [u64; DATA_SHREDS + 1],
    memo_coding: HashMap<MemoKey, f64>,
    memo_data: HashMap<MemoKey, f64>,
    memo_recovery: HashMap<MemoKey, f64>,
    memo_batch: HashMap<MemoKey, f64>,
}

impl Default for RecoveryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryModel {
    pub fn new() -> Self {
        Self {
            choose_32: binomial_row_32(),
            memo_coding: HashMap::new(),
            memo_data: HashMap::new(),
            memo_recovery: HashMap::new(),
            memo_batch: HashMap::new(),
        }
    }

    /// `C(l,p)`: probability a given coding shred is held at level `l`.
    ///
    /// Coding shreds are never reconstructed, so the only way to hold one is
    /// the full forwarding chain from the leader: `p^(l+1)`.
    pub fn coding_shred_prob(&mut self, level: i32, p: f64) -> f64 {
        if level <= 0 {
            return 1.0;
        }
        let key = (level, p.to_bits());
        if let Some(&v) = self.memo_coding.get(&key) {
            return v;
        }
        let v = p.powi(level + 1);
        self.memo_coding.insert(key, v);
        v
    }

    /// `D(l,p)`: probability a given data shred is held at level `l`,
    /// either forwarded by the parent (`p·D(l−1,p)`) or reconstructed
    /// locally (`R(l,p)`).
    pub fn data_shred_prob(&mut self, level: i32, p: f64) -> f64 {
        if level <= 0 {
            return 1.0;
        }
        let key = (level, p.to_bits());
        if let Some(&v) = self.memo_data.get(&key) {
            return v;
        }
        let v = p * self.data_shred_prob(level - 1, p) + self.recovery_prob(level, p);
        self.memo_data.insert(key, v);
        v
    }

    /// `R(l,p)`: probability a level-`l` node holds at least 32 of the 64
    /// shreds and reconstructs the batch. See the module docs for the double
    /// sum; `d` counts data shreds held, `n−d` coding shreds held.
    pub fn recovery_prob(&mut self, level: i32, p: f64) -> f64 {
        if level == 0 {
            return 0.0;
        }
        let key = (level, p.to_bits());
        if let Some(&v) = self.memo_recovery.get(&key) {
            return v;
        }

        let p_data = p * self.data_shred_prob(level - 1, p);
        let p_coding = p * self.coding_shred_prob(level - 1, p);

        let mut total = 0.0;
        for n in RECOVER_THRESHOLD..BATCH_SIZE {
            let mut mass = 0.0;
            for d in (n - DATA_SHREDS)..DATA_SHREDS {
                mass += self.choose_32[d] as f64
                    * p_data.powi(d as i32)
                    * self.choose_32[n - d] as f64
                    * p_coding.powi((n - d) as i32);
            }
            total += mass * (1.0 - p).powi((BATCH_SIZE - n) as i32);
        }

        self.memo_recovery.insert(key, total);
        total
    }

    /// `B(l,p)`: probability a level-`l` node obtains the full batch — all 32
    /// data shreds forwarded directly, or enough of the 64 to reconstruct.
    ///
    /// No base-case guard of its own: `B(0,p)` evaluates through
    /// `D(−1,p) = 1` to `p^32`.
    pub fn batch_prob(&mut self, level: i32, p: f64) -> f64 {
        let key = (level, p.to_bits());
        if let Some(&v) = self.memo_batch.get(&key) {
            return v;
        }
        let direct = (p * self.data_shred_prob(level - 1, p)).powi(DATA_SHREDS as i32);
        let v = direct + self.recovery_prob(level, p);
        self.memo_batch.insert(key, v);
        v
    }
}
