//! Aggregated statistics of a batch.
use serde::{Deserialize, Serialize};
use sim_core::{SimConfig, TrialResult};

/// Summary statistics of one metric across trials.
///
/// `std_dev` is the population standard deviation. An empty sample yields
/// all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Self {
        let samples: Vec<f64> = samples.into_iter().collect();
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        }
    }
}

/// Result of a batch run, ordered by iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub scenario: String,
    pub iterations: u32,
    pub base_seed: u64,
    pub dps: Summary,
    pub damage: Summary,
    /// Simulated seconds per trial.
    pub duration: Summary,
    pub particles: Summary,
    /// One summary per party slot.
    pub per_char_damage: Vec<Summary>,
    pub per_char_energy: Vec<Summary>,
    pub seeds: Vec<u64>,
    /// Event-stream digest of every trial; equal seeds give equal digests.
    pub fingerprints: Vec<String>,
}

impl BatchReport {
    /// Folds `results` (in iteration order) into a report.
    pub fn from_results(scenario: impl Into<String>, base_seed: u64, results: &[TrialResult]) -> Self {
        let party = results
            .iter()
            .map(|r| r.damage_by_char.len())
            .max()
            .unwrap_or(0);
        let per_char = |pick: fn(&TrialResult) -> &[f64]| -> Vec<Summary> {
            (0..party)
                .map(|i| {
                    Summary::from_samples(
                        results.iter().map(|r| pick(r).get(i).copied().unwrap_or(0.0)),
                    )
                })
                .collect()
        };

        Self {
            scenario: scenario.into(),
            iterations: results.len() as u32,
            base_seed,
            dps: Summary::from_samples(results.iter().map(|r| r.dps)),
            damage: Summary::from_samples(results.iter().map(|r| r.total_damage)),
            duration: Summary::from_samples(
                results
                    .iter()
                    .map(|r| r.frames as f64 / SimConfig::FRAMES_PER_SECOND as f64),
            ),
            particles: Summary::from_samples(results.iter().map(|r| f64::from(r.particles))),
            per_char_damage: per_char(|r| r.damage_by_char.as_slice()),
            per_char_energy: per_char(|r| r.energy_by_char.as_slice()),
            seeds: results.iter().map(|r| r.seed).collect(),
            fingerprints: results.iter().map(|r| r.fingerprint.clone()).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
