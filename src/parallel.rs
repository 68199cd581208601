//! Thread pool configuration for the diagnostic reductions
//!
//! Generation itself is sequential; only the per-level statistics of the
//! `stats` query run on Rayon's global pool.

use crate::errors::{Result, SyntheticError};
use rayon::ThreadPoolBuilder;
use tracing::info;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Set up the global Rayon thread pool.
    ///
    /// The global pool can only be built once per process; later calls with a
    /// thread count fail with [`SyntheticError::ThreadPoolError`].
    pub fn setup_global_pool(&self) -> Result<()> {
        match self.num_threads {
            Some(0) => Err(SyntheticError::InvalidArgument {
                message: "thread count must be at least 1".to_string(),
            }),
            Some(num_threads) => {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build_global()
                    .map_err(|e| {
                        SyntheticError::ThreadPoolError(format!(
                            "Failed to initialize thread pool with {} threads: {}",
                            num_threads, e
                        ))
                    })?;
                info!("Configured parallel processing with {} threads", num_threads);
                Ok(())
            }
            None => {
                info!(
                    "Using default thread pool ({} threads)",
                    rayon::current_num_threads()
                );
                Ok(())
            }
        }
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
}

pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
    }
}

impl ParallelInfo {
    pub fn print_info(&self) {
        println!("Parallel processing:");
        println!("   Current threads: {}", self.current_threads);
        println!("   Available CPU cores: {}", self.available_cores);
    }
}
