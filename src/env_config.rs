//! Shared environment configuration for the simulation binaries.
//!
//! Consolidates the `RAYON_NUM_THREADS` / `OMP_NUM_THREADS` reads so every
//! binary sizes the rayon pool the same way.

/// Build the rayon global thread pool.
///
/// An explicit override (from `--threads`) wins; otherwise read
/// `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
/// Returns the thread count.
pub fn init_rayon_threads(override_threads: Option<usize>) -> usize {
    let num_threads = override_threads.unwrap_or_else(|| {
        std::env::var("RAYON_NUM_THREADS")
            .or_else(|_| std::env::var("OMP_NUM_THREADS"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8)
    });
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .unwrap();
    println!("Rayon threads: {}", num_threads);
    num_threads
}
