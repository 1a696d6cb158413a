//! Batch orchestration for the combat simulator.
//!
//! A single trial is strictly single-threaded; this crate runs many of them
//! side by side on tokio's blocking pool and folds their results into a
//! [`BatchReport`].
//!
//! Modules are organized by responsibility:
//! - [`config`] holds the batch settings and their environment loader
//! - [`batch`] hosts the [`BatchRunner`]
//! - [`report`] aggregates per-trial results into summary statistics
//! - [`error`] surfaces construction and worker failures
pub mod batch;
pub mod config;
pub mod error;
pub mod report;

pub use batch::BatchRunner;
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use report::{BatchReport, Summary};
