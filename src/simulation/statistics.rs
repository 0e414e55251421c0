//! Statistics aggregation from propagation trials.
//!
//! Computes distribution summaries from raw `TrialRecord` data — recovered
//! fraction, honest recovered fraction, and round counts — alongside the
//! analytic prediction for the same cluster, and saves the report as JSON.

use serde::Serialize;

use crate::constants::NUM_NODES;
use crate::recurrences::RecoveryModel;

use super::engine::{SimulationConfig, TrialRecord};

// ── Top-level statistics ────────────────────────────────────────────

#[derive(Serialize)]
pub struct RunStatistics {
    pub trials: u64,
    pub seed: u64,
    pub online_fraction: f64,
    pub malicious_fraction: f64,
    pub analytic: AnalyticSummary,
    pub recovered: SeriesStatistics,
    pub honest_recovered: SeriesStatistics,
    pub rounds: SeriesStatistics,
}

/// Recurrence-model values for the simulated cluster's hop probability.
///
/// The level-1 value is the probability a relay obtains the batch
/// (`P(Bin(64,p) ≥ 32)`); the level-2 value is the model's raw output and can
/// exceed 1 at high `p`. Reported beside the simulation as a reference, not a
/// prediction to assert against.
#[derive(Serialize)]
pub struct AnalyticSummary {
    pub hop_probability: f64,
    pub level1_batch_prob: f64,
    pub level2_batch_prob: f64,
}

// ── Per-series distribution ─────────────────────────────────────────

#[derive(Serialize)]
pub struct SeriesStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub percentiles: Percentiles,
}

#[derive(Serialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

// ── Aggregation ─────────────────────────────────────────────────────

/// Summarize one series of per-trial values.
fn summarize(values: &[f64]) -> SeriesStatistics {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len() as f64;

    let mean = sorted.iter().sum::<f64>() / n;
    let variance: f64 = sorted.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;

    let percentile = |p: f64| -> f64 {
        let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    };

    SeriesStatistics {
        mean,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: *sorted.last().unwrap(),
        median: percentile(50.0),
        percentiles: Percentiles {
            p5: percentile(5.0),
            p10: percentile(10.0),
            p25: percentile(25.0),
            p50: percentile(50.0),
            p75: percentile(75.0),
            p90: percentile(90.0),
            p95: percentile(95.0),
            p99: percentile(99.0),
        },
    }
}

/// Recurrence-model values for the cluster described by `config`: relays sit
/// at level 1 of the broadcast tree, leaves at level 2.
pub fn analytic_summary(config: &SimulationConfig) -> AnalyticSummary {
    let p = config.hop_probability();
    let mut model = RecoveryModel::new();
    AnalyticSummary {
        hop_probability: p,
        level1_batch_prob: model.batch_prob(1, p),
        level2_batch_prob: model.batch_prob(2, p),
    }
}

/// Aggregate statistics from a slice of TrialRecords.
pub fn aggregate_statistics(
    records: &[TrialRecord],
    config: &SimulationConfig,
    seed: u64,
) -> RunStatistics {
    let recovered: Vec<f64> = records.iter().map(|r| r.recovered_fraction()).collect();
    let honest: Vec<f64> = records.iter().map(|r| r.honest_fraction()).collect();
    let rounds: Vec<f64> = records.iter().map(|r| r.rounds as f64).collect();

    RunStatistics {
        trials: records.len() as u64,
        seed,
        online_fraction: config.online_nodes as f64 / NUM_NODES as f64,
        malicious_fraction: config.malicious_nodes as f64 / NUM_NODES as f64,
        analytic: analytic_summary(config),
        recovered: summarize(&recovered),
        honest_recovered: summarize(&honest),
        rounds: summarize(&rounds),
    }
}

/// Save aggregated statistics as JSON.
pub fn save_statistics(stats: &RunStatistics, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(stats).expect("Failed to serialize statistics");
    std::fs::write(path, json).expect("Failed to write statistics file");
}
