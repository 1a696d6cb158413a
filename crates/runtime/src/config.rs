//! Batch configuration and its environment loader.
use std::env;
use std::num::NonZeroUsize;
use std::thread;

/// Settings of one batch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of trials to run.
    pub iterations: u32,
    /// Trials allowed to run at the same time.
    pub workers: usize,
    /// Seed every trial seed is derived from.
    pub base_seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            base_seed: 0,
        }
    }
}

impl RuntimeConfig {
    pub fn new(iterations: u32, workers: usize, base_seed: u64) -> Self {
        Self {
            iterations,
            workers,
            base_seed,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PARTYSIM_ITERATIONS` - Trials per batch (default: 100)
    /// - `PARTYSIM_WORKERS` - Concurrent trials (default: available cores)
    /// - `PARTYSIM_SEED` - Base seed (default: 0)
    ///
    /// Unparsable values are ignored; zero workers is raised to one.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Overrides the fields whose environment variable is set.
    pub fn apply_env(mut self) -> Self {
        if let Some(iterations) = read_env::<u32>("PARTYSIM_ITERATIONS") {
            self.iterations = iterations;
        }
        if let Some(workers) = read_env::<usize>("PARTYSIM_WORKERS") {
            self.workers = workers.max(1);
        }
        if let Some(seed) = read_env::<u64>("PARTYSIM_SEED") {
            self.base_seed = seed;
        }
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = RuntimeConfig::default()
            .with_iterations(10)
            .with_workers(3)
            .with_base_seed(99);
        assert_eq!(config, RuntimeConfig::new(10, 3, 99));
        assert!(RuntimeConfig::default().workers >= 1);
    }
}
