//! Scenario model and parse-time validation.
//!
//! A scenario file describes one fight: the party, the targets, and the
//! ordered action list. Every option is an explicit field with a default;
//! unknown fields are rejected when the file is parsed, and value ranges are
//! checked once by [`ScenarioSpec::validate`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sim_core::{
    ActionParams, ActionSlot, ActionStep, CharIndex, CharacterProfile, Element, Position,
    SimConfig, StatKind, StatVector, Talents, Target, TargetId, TrialLimits,
};

use crate::error::ConfigError;
use crate::kits::KitRegistry;

/// Most hits a multi-hit skill may request.
const MAX_HITS: u32 = 3;

fn default_iterations() -> u32 {
    100
}

fn default_repeat() -> u32 {
    1
}

fn default_target_level() -> u32 {
    100
}

fn default_radius() -> f64 {
    Target::DEFAULT_RADIUS
}

fn default_resist() -> f64 {
    Target::DEFAULT_RESIST
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub duration_frames: u64,
    #[serde(default)]
    pub stop_when_targets_defeated: bool,
    #[serde(default)]
    pub config: SimConfig,
    pub party: Vec<CharacterSpec>,
    /// Key of the character on field at frame 0; the first one when absent.
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    pub actions: Vec<ActionSpec>,
}

/// Per-character options understood by kits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharacterParams {
    /// Selects the female frame table for kits that have two.
    pub female: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterSpec {
    pub key: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub constellation: u8,
    #[serde(default)]
    pub talents: Talents,
    /// Base, weapon and artifact stats summed per kind.
    #[serde(default)]
    pub stats: HashMap<StatKind, f64>,
    /// Energy at frame 0; a full bar when absent.
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub params: CharacterParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    #[serde(default = "default_target_level")]
    pub level: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Resistance to every element.
    #[serde(default = "default_resist")]
    pub resist: f64,
    /// Per-element overrides of `resist`.
    #[serde(default)]
    pub resist_by_element: HashMap<Element, f64>,
    /// Unlimited when absent.
    #[serde(default)]
    pub hp: Option<f64>,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            level: default_target_level(),
            position: Position::ORIGIN,
            radius: default_radius(),
            resist: default_resist(),
            resist_by_element: HashMap::new(),
            hp: None,
        }
    }
}

impl TargetSpec {
    pub fn to_target(&self, id: TargetId) -> Target {
        let mut target = Target::new(id, self.level)
            .at(self.position, self.radius)
            .with_all_resist(self.resist);
        for (element, value) in &self.resist_by_element {
            target = target.with_resist(*element, *value);
        }
        if let Some(hp) = self.hp {
            target = target.with_hp(hp);
        }
        target
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Charge,
    Skill,
    Burst,
    Dash,
    Jump,
    Swap,
    Wait,
}

impl ActionKind {
    pub fn slot(self) -> Option<ActionSlot> {
        match self {
            Self::Attack => Some(ActionSlot::Attack),
            Self::Charge => Some(ActionSlot::Charge),
            Self::Skill => Some(ActionSlot::Skill),
            Self::Burst => Some(ActionSlot::Burst),
            Self::Dash => Some(ActionSlot::Dash),
            Self::Jump => Some(ActionSlot::Jump),
            Self::Swap => Some(ActionSlot::Swap),
            Self::Wait => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    /// Acting character; not used by `wait`.
    #[serde(default)]
    pub character: Option<String>,
    pub action: ActionKind,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Idle frames for `wait`.
    #[serde(default)]
    pub frames: Option<u64>,
    #[serde(default)]
    pub params: ActionParams,
}

/// A scenario whose every value has been checked and resolved.
#[derive(Clone, Debug)]
pub struct ValidatedScenario {
    pub name: String,
    pub seed: u64,
    pub iterations: u32,
    pub limits: TrialLimits,
    pub config: SimConfig,
    pub characters: Vec<(CharacterProfile, CharacterParams)>,
    pub active: CharIndex,
    pub targets: Vec<Target>,
    pub steps: Vec<ActionStep>,
}

impl ScenarioSpec {
    pub fn validate(&self, registry: &KitRegistry) -> Result<ValidatedScenario, ConfigError> {
        if self.duration_frames == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        let characters = self.validate_party(registry)?;
        let index_of = |key: &str| {
            self.party
                .iter()
                .position(|c| c.key == key)
                .map(CharIndex)
        };

        let active = match &self.active {
            Some(key) => {
                index_of(key).ok_or_else(|| ConfigError::UnknownActive { key: key.clone() })?
            }
            None => CharIndex(0),
        };

        let mut targets = Vec::with_capacity(self.targets.len());
        for (i, spec) in self.targets.iter().enumerate() {
            validate_target(i, spec)?;
            targets.push(spec.to_target(TargetId(i as u32 + 1)));
        }

        let mut steps = Vec::new();
        for (step, spec) in self.actions.iter().enumerate() {
            if spec.repeat == 0 {
                return Err(invalid(step, "repeat must be at least 1"));
            }
            let resolved = match spec.action.slot() {
                None => {
                    let frames = spec
                        .frames
                        .filter(|f| *f > 0)
                        .ok_or_else(|| invalid(step, "wait needs a positive `frames`"))?;
                    ActionStep::Wait { frames }
                }
                Some(slot) => {
                    let key = spec
                        .character
                        .as_deref()
                        .ok_or_else(|| invalid(step, "missing `character`"))?;
                    let character =
                        index_of(key).ok_or_else(|| ConfigError::UnknownActionCharacter {
                            step,
                            key: key.to_string(),
                        })?;
                    validate_params(step, &spec.params)?;
                    ActionStep::Act {
                        character,
                        slot,
                        params: spec.params.clone(),
                    }
                }
            };
            steps.extend(std::iter::repeat_n(resolved, spec.repeat as usize));
        }

        Ok(ValidatedScenario {
            name: self.name.clone().unwrap_or_else(|| "scenario".to_string()),
            seed: self.seed,
            iterations: self.iterations,
            limits: TrialLimits {
                duration_frames: self.duration_frames,
                stop_when_targets_defeated: self.stop_when_targets_defeated,
            },
            config: self.config.clone(),
            characters,
            active,
            targets,
            steps,
        })
    }

    fn validate_party(
        &self,
        registry: &KitRegistry,
    ) -> Result<Vec<(CharacterProfile, CharacterParams)>, ConfigError> {
        if self.party.is_empty() {
            return Err(ConfigError::EmptyParty);
        }
        if self.party.len() > SimConfig::MAX_PARTY_SIZE {
            return Err(ConfigError::PartyTooLarge {
                size: self.party.len(),
                max: SimConfig::MAX_PARTY_SIZE,
            });
        }

        let mut characters: Vec<(CharacterProfile, CharacterParams)> = Vec::new();
        for spec in &self.party {
            if characters.iter().any(|(p, _)| p.key == spec.key) {
                return Err(ConfigError::DuplicateCharacter {
                    key: spec.key.clone(),
                });
            }
            let entry = registry
                .get(&spec.key)
                .ok_or_else(|| ConfigError::UnknownKit {
                    key: spec.key.clone(),
                })?;

            let profile = CharacterProfile {
                key: spec.key.clone(),
                element: entry.element,
                level: spec.level,
                constellation: spec.constellation,
                talents: spec.talents,
                stats: StatVector::from_pairs(spec.stats.iter().map(|(k, v)| (*k, *v))),
                energy_max: entry.energy_max,
                starting_energy: spec.energy,
            };
            characters.push((profile, spec.params));
        }
        Ok(characters)
    }
}

fn invalid(step: usize, reason: &str) -> ConfigError {
    ConfigError::InvalidAction {
        step,
        reason: reason.to_string(),
    }
}

fn validate_params(step: usize, params: &ActionParams) -> Result<(), ConfigError> {
    if let Some(hits) = params.hits
        && !(1..=MAX_HITS).contains(&hits)
    {
        return Err(invalid(step, &format!("hits must be between 1 and {MAX_HITS}, got {hits}")));
    }
    if let Some(max) = params.max_amulets
        && max > MAX_HITS
    {
        return Err(invalid(step, &format!("max_amulets must be at most {MAX_HITS}, got {max}")));
    }
    Ok(())
}

fn validate_target(index: usize, spec: &TargetSpec) -> Result<(), ConfigError> {
    let reason = if spec.radius.is_nan() || spec.radius <= 0.0 {
        Some("radius must be positive")
    } else if spec.hp.is_some_and(|hp| hp.is_nan() || hp <= 0.0) {
        Some("hp must be positive")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::InvalidTarget {
            index,
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
