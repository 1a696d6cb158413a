//! Scenario loader.
//!
//! The format follows the file extension: `.toml` or `.ron`.

use std::path::Path;

use crate::kits::KitRegistry;
use crate::loaders::{LoadResult, read_file};
use crate::scenario::{ScenarioSpec, ValidatedScenario};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn from_path(path: &Path) -> LoadResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            other => Err(anyhow::anyhow!(
                "Unsupported scenario format {:?} for {}; expected .toml or .ron",
                other.unwrap_or(""),
                path.display()
            )),
        }
    }
}

/// Loader for scenario files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Parses a scenario without validating it.
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        let spec: ScenarioSpec = match Format::from_path(path)? {
            Format::Toml => toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse scenario TOML: {}", e))?,
            Format::Ron => ron::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?,
        };
        tracing::debug!(
            target: "sim_content::loaders",
            path = %path.display(),
            characters = spec.party.len(),
            actions = spec.actions.len(),
            "scenario parsed"
        );
        Ok(spec)
    }

    /// Parses and validates a scenario against `registry`.
    pub fn load_validated(path: &Path, registry: &KitRegistry) -> LoadResult<ValidatedScenario> {
        let spec = Self::load(path)?;
        spec.validate(registry)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))
    }
}
