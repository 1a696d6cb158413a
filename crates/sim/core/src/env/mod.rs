//! Trial environment services.

pub mod rng;

pub use rng::{SimRng, trial_seed};
