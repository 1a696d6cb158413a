//! Runs independent trials side by side.
use std::sync::Arc;
use std::time::Instant;

use sim_core::{BuildError, TrialResult, TrialSource, trial_seed};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::report::BatchReport;

/// Runs `iterations` trials of one source with at most `workers` in flight.
///
/// Every trial is built and run inside a blocking task, so trial state never
/// crosses threads. Trial `i` uses `trial_seed(base_seed, i)`; results are
/// reported in iteration order regardless of completion order.
#[derive(Clone, Debug)]
pub struct BatchRunner {
    config: RuntimeConfig,
}

impl BatchRunner {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Seed of trial `iteration` in this batch.
    pub fn seed_for(&self, iteration: u32) -> u64 {
        trial_seed(self.config.base_seed, u64::from(iteration))
    }

    pub async fn run<S>(&self, source: Arc<S>) -> Result<BatchReport>
    where
        S: TrialSource + ?Sized + 'static,
    {
        let results = self.run_trials(Arc::clone(&source)).await?;
        Ok(BatchReport::from_results(
            source.name(),
            self.config.base_seed,
            &results,
        ))
    }

    /// Runs every trial and returns the raw results in iteration order.
    pub async fn run_trials<S>(&self, source: Arc<S>) -> Result<Vec<TrialResult>>
    where
        S: TrialSource + ?Sized + 'static,
    {
        let RuntimeConfig {
            iterations,
            workers,
            base_seed,
        } = self.config;
        if iterations == 0 {
            return Err(RuntimeError::ZeroIterations);
        }
        if workers == 0 {
            return Err(RuntimeError::ZeroWorkers);
        }

        info!(
            target: "runtime::batch",
            scenario = source.name(),
            iterations,
            workers,
            base_seed,
            "batch started"
        );
        let started = Instant::now();

        let pool = Arc::new(Semaphore::new(workers));
        let mut set = JoinSet::new();
        for iteration in 0..iterations {
            let permit = Arc::clone(&pool)
                .acquire_owned()
                .await
                .map_err(|_| RuntimeError::PoolClosed)?;
            let source = Arc::clone(&source);
            let seed = self.seed_for(iteration);

            set.spawn_blocking(move || {
                let _permit = permit;
                let trial = source.build_trial(seed).map_err(|e| (iteration, e))?;
                let result = trial.run();
                debug!(
                    target: "runtime::batch",
                    iteration,
                    seed,
                    dps = result.dps,
                    "trial finished"
                );
                Ok::<_, (u32, BuildError)>((iteration, result))
            });
        }

        let mut results = Vec::with_capacity(iterations as usize);
        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(RuntimeError::WorkerJoin)?;
            let (iteration, result) =
                outcome.map_err(|(iteration, source)| RuntimeError::Build { iteration, source })?;
            results.push((iteration, result));
        }
        results.sort_by_key(|(iteration, _)| *iteration);

        info!(
            target: "runtime::batch",
            iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        Ok(results.into_iter().map(|(_, result)| result).collect())
    }
}
