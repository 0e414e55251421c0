use std::time::Instant;

use turbine_sim::constants::{L1_SIZE, L2_FANOUT, L2_NODES, NUM_NODES};
use turbine_sim::env_config;
use turbine_sim::simulation::{
    aggregate_statistics, save_statistics, simulate_batch, SimulationConfig,
};

struct Args {
    trials: usize,
    seed: u64,
    online_percent: f64,
    malicious_percent: f64,
    threads: Option<usize>,
    output: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut trials = 1000usize;
    let mut seed = 42u64;
    let mut online_percent = 66.0f64;
    let mut malicious_percent = 0.0f64;
    let mut threads: Option<usize> = None;
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--trials" => {
                i += 1;
                if i < args.len() {
                    trials = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --trials value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--online-percent" => {
                i += 1;
                if i < args.len() {
                    online_percent = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --online-percent value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--malicious-percent" => {
                i += 1;
                if i < args.len() {
                    malicious_percent = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --malicious-percent value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--threads" => {
                i += 1;
                if i < args.len() {
                    let n = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --threads value: {}", args[i]);
                        std::process::exit(1);
                    });
                    threads = Some(n);
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                println!(
                    "Usage: turbine-simulate [--trials N] [--seed S] [--online-percent F] [--malicious-percent F] [--threads N] [--output DIR]"
                );
                println!();
                println!("Options:");
                println!("  --trials N             Number of trials to simulate (default: 1000)");
                println!("  --seed S               RNG seed (default: 42)");
                println!("  --online-percent F     Percentage of nodes online (default: 66)");
                println!("  --malicious-percent F  Percentage of nodes that withhold shreds, sampled from online nodes (default: 0)");
                println!("  --threads N            Rayon thread count (default: RAYON_NUM_THREADS or 8)");
                println!("  --output DIR           Write run_statistics.json to DIR");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!(
                    "Usage: turbine-simulate [--trials N] [--seed S] [--online-percent F] [--malicious-percent F] [--threads N] [--output DIR]"
                );
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if trials == 0 {
        eprintln!("Error: --trials must be at least 1");
        std::process::exit(1);
    }
    if !(0.0..=100.0).contains(&online_percent) {
        eprintln!("Error: --online-percent must be within 0..=100");
        std::process::exit(1);
    }
    if !(0.0..=100.0).contains(&malicious_percent) {
        eprintln!("Error: --malicious-percent must be within 0..=100");
        std::process::exit(1);
    }
    if malicious_percent > online_percent {
        eprintln!("Error: --malicious-percent cannot exceed --online-percent (malicious nodes are sampled from online nodes)");
        std::process::exit(1);
    }

    Args {
        trials,
        seed,
        online_percent,
        malicious_percent,
        threads,
        output,
    }
}

fn main() {
    let args = parse_args();
    let num_threads = env_config::init_rayon_threads(args.threads);

    let config = SimulationConfig::from_fractions(
        args.online_percent / 100.0,
        args.malicious_percent / 100.0,
    );

    println!("Turbine Propagation Simulation ({} trials)", args.trials);
    println!(
        "  Cluster:     {} nodes ({} online, {} malicious)",
        NUM_NODES, config.online_nodes, config.malicious_nodes
    );
    println!(
        "  Tree:        1 root, {} relays, {} leaves in neighborhoods of {}",
        L1_SIZE, L2_NODES, L2_FANOUT
    );
    println!();

    println!("Simulating {} trials ({} threads)...", args.trials, num_threads);
    let result = simulate_batch(&config, args.trials, args.seed);

    let per_trial_ms = result.elapsed.as_secs_f64() * 1000.0 / args.trials as f64;
    let throughput = args.trials as f64 / result.elapsed.as_secs_f64();

    println!(
        "  Elapsed:     {:.1} ms",
        result.elapsed.as_secs_f64() * 1000.0
    );
    println!("  Per trial:   {:.2} ms", per_trial_ms);
    println!("  Throughput:  {:.0} trials/sec", throughput);
    println!();

    let stats = aggregate_statistics(&result.records, &config, args.seed);

    println!("Results (recovered fraction of {} nodes):", NUM_NODES);
    println!("  Mean:        {:.4}", result.mean);
    println!("  Std dev:     {:.4}", result.std_dev);
    println!("  Min:         {:.4}", result.min);
    println!("  Max:         {:.4}", result.max);
    println!("  Median:      {:.4}", result.median);
    println!("  Honest mean: {:.4}", stats.honest_recovered.mean);
    println!("  Mean rounds: {:.1}", stats.rounds.mean);
    println!();

    println!("Recurrence model (fixed-tree reference):");
    println!("  Hop prob:    {:.4}", stats.analytic.hop_probability);
    println!(
        "  B(1, p):     {:.6}  (relay batch probability)",
        stats.analytic.level1_batch_prob
    );
    println!(
        "  B(2, p):     {:.6}  (leaf level, raw model value)",
        stats.analytic.level2_batch_prob
    );

    if let Some(ref output_dir) = args.output {
        let json_path = format!("{}/run_statistics.json", output_dir);
        let t_save = Instant::now();
        save_statistics(&stats, &json_path);
        let save_ms = t_save.elapsed().as_secs_f64() * 1000.0;
        println!();
        println!("  Statistics:  {} ({:.1} ms)", json_path, save_ms);
    }
}
