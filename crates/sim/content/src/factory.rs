//! Builds runnable trials from a validated scenario.

use sim_core::{BuildError, Simulation, Trial, TrialSource};
use tracing::debug;

use crate::kits::KitRegistry;
use crate::scenario::ValidatedScenario;

/// Hands out a fresh [`Trial`] of one scenario per seed.
///
/// Holds only plain data, so a single factory can be shared by every worker
/// of a batch; each trial is assembled on the thread that runs it.
#[derive(Clone, Debug)]
pub struct ScenarioFactory {
    scenario: ValidatedScenario,
    registry: KitRegistry,
}

impl ScenarioFactory {
    pub fn new(scenario: ValidatedScenario, registry: KitRegistry) -> Self {
        Self { scenario, registry }
    }

    pub fn scenario(&self) -> &ValidatedScenario {
        &self.scenario
    }

    /// Assembles the simulation, instantiates one kit per character and
    /// wraps them in a trial seeded with `seed`.
    pub fn build(&self, seed: u64) -> Result<Trial, BuildError> {
        let scenario = &self.scenario;
        let sim = Simulation::builder()
            .config(scenario.config.clone())
            .seed(seed)
            .characters(scenario.characters.iter().map(|(profile, _)| profile.clone()))
            .targets(scenario.targets.iter().cloned())
            .active(scenario.active)
            .build()?;

        let kits = scenario
            .characters
            .iter()
            .map(|(profile, params)| {
                self.registry
                    .build(&profile.key, params)
                    .ok_or_else(|| BuildError::MissingKit {
                        key: profile.key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            target: "sim_content::factory",
            scenario = %scenario.name,
            seed,
            characters = kits.len(),
            "trial assembled"
        );
        Trial::new(sim, kits, scenario.steps.clone(), scenario.limits)
    }
}

impl TrialSource for ScenarioFactory {
    fn build_trial(&self, seed: u64) -> Result<Trial, BuildError> {
        self.build(seed)
    }

    fn name(&self) -> &str {
        &self.scenario.name
    }
}
