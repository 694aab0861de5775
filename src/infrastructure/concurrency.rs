/// Thread pool setup for file-level parallelism.
use anyhow::Result;
use tracing::info;

/// Number of workers to use: the requested count, or one per CPU.
pub fn worker_count(jobs: Option<usize>) -> usize {
    jobs.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
}

/// Initialize the global rayon thread pool with `jobs` workers.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<()> {
    let workers = worker_count(jobs);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(
        "[tryhard] Initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(())
}
