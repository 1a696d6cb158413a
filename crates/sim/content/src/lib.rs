//! Data-driven content for the combat simulator.
//!
//! This crate turns scenario files into runnable trials:
//! - Scenario model (party, targets, action list) with parse-time validation
//! - Kit registry mapping character keys to [`CharacterKit`](sim_core::CharacterKit) implementations
//! - Sample kits: `travelerelectro`, `yoimiya`, `xiangling`
//! - TOML/RON loaders (feature `loaders`)
//!
//! Kits are clients of the kernel: they only use the public [`Simulation`](sim_core::Simulation) API.

pub mod error;
pub mod factory;
pub mod kits;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use error::ConfigError;
pub use factory::ScenarioFactory;
pub use kits::{KitEntry, KitRegistry};
pub use scenario::{
    ActionKind, ActionSpec, CharacterParams, CharacterSpec, ScenarioSpec, TargetSpec,
    ValidatedScenario,
};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ScenarioLoader};
