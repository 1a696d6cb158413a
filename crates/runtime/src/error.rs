//! Errors surfaced by batch runs.
use sim_core::{BuildError, ErrorSeverity, SimError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("batch needs at least one iteration")]
    ZeroIterations,

    #[error("batch needs at least one worker")]
    ZeroWorkers,

    #[error("failed to build trial {iteration}")]
    Build {
        iteration: u32,
        #[source]
        source: BuildError,
    },

    #[error("trial worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("worker pool closed")]
    PoolClosed,
}

impl SimError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ZeroIterations | Self::ZeroWorkers => ErrorSeverity::Validation,
            Self::Build { source, .. } => source.severity(),
            Self::WorkerJoin(_) | Self::PoolClosed => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroIterations => "ZERO_ITERATIONS",
            Self::ZeroWorkers => "ZERO_WORKERS",
            Self::Build { .. } => "TRIAL_BUILD",
            Self::WorkerJoin(_) => "WORKER_JOIN",
            Self::PoolClosed => "POOL_CLOSED",
        }
    }
}
