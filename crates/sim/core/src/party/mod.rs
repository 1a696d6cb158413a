//! Party members and their per-character state.

mod energy;

use arrayvec::ArrayVec;

use crate::config::SimConfig;
use crate::error::BuildError;
use crate::state::{CharIndex, CooldownTracker, Frame, Position, StatusStack};
use crate::stats::{AmountContext, Element, ModifierStack, Snapshot, StatKind, StatVector};

/// Talent levels (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Talents {
    pub attack: u8,
    pub skill: u8,
    pub burst: u8,
}

impl Default for Talents {
    fn default() -> Self {
        Self {
            attack: 9,
            skill: 9,
            burst: 9,
        }
    }
}

/// Everything needed to put a character into a party.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterProfile {
    pub key: String,
    pub element: Element,
    /// Falls back to [`SimConfig::character_level`].
    pub level: Option<u32>,
    pub constellation: u8,
    pub talents: Talents,
    /// Base stats plus weapon and artifact totals.
    pub stats: StatVector,
    pub energy_max: f64,
    /// Energy at frame 0; a full bar when absent.
    pub starting_energy: Option<f64>,
}

impl CharacterProfile {
    pub fn new(key: impl Into<String>, element: Element, energy_max: f64) -> Self {
        Self {
            key: key.into(),
            element,
            level: None,
            constellation: 0,
            talents: Talents::default(),
            stats: StatVector::ZERO,
            energy_max,
            starting_energy: None,
        }
    }

    pub fn with_stats(mut self, stats: StatVector) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_constellation(mut self, constellation: u8) -> Self {
        self.constellation = constellation;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_starting_energy(mut self, energy: f64) -> Self {
        self.starting_energy = Some(energy);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Character {
    pub index: CharIndex,
    pub key: String,
    pub element: Element,
    pub level: u32,
    pub constellation: u8,
    pub talents: Talents,
    pub base: StatVector,
    pub energy: f64,
    pub energy_max: f64,
    pub statuses: StatusStack,
    pub modifiers: ModifierStack,
    pub cooldowns: CooldownTracker,
}

impl Character {
    fn from_profile(index: CharIndex, profile: CharacterProfile, config: &SimConfig) -> Self {
        let energy_max = profile.energy_max;
        Self {
            index,
            level: profile.level.unwrap_or(config.character_level),
            key: profile.key,
            element: profile.element,
            constellation: profile.constellation,
            talents: profile.talents,
            base: profile.stats,
            energy: profile.starting_energy.unwrap_or(energy_max).clamp(0.0, energy_max),
            energy_max,
            statuses: StatusStack::new(),
            modifiers: ModifierStack::new(),
            cooldowns: CooldownTracker::new(),
        }
    }

    pub(crate) fn context(&self, now: Frame) -> AmountContext<'_> {
        AmountContext {
            now,
            base: &self.base,
            statuses: &self.statuses,
            energy: self.energy,
            energy_max: self.energy_max,
        }
    }

    /// Base value plus every active modifier's contribution.
    pub fn stat(&self, kind: StatKind, now: Frame) -> f64 {
        self.base[kind] + self.modifiers.query(kind, &self.context(now))
    }

    pub fn stats(&self, now: Frame) -> StatVector {
        self.base + self.modifiers.totals(&self.context(now))
    }

    pub fn snapshot(&self, now: Frame) -> Snapshot {
        Snapshot::new(self.index, self.level, self.stats(now))
    }
}

/// The characters of one trial and who is on field.
#[derive(Clone, Debug)]
pub struct Party {
    members: ArrayVec<Character, { SimConfig::MAX_PARTY_SIZE }>,
    active: CharIndex,
    pub(crate) swap_ready_at: Frame,
    /// Where the on-field character stands.
    pub position: Position,
}

impl Party {
    pub fn new(
        profiles: Vec<CharacterProfile>,
        active: CharIndex,
        config: &SimConfig,
    ) -> Result<Self, BuildError> {
        if profiles.is_empty() {
            return Err(BuildError::EmptyParty);
        }
        if profiles.len() > SimConfig::MAX_PARTY_SIZE {
            return Err(BuildError::PartyTooLarge {
                size: profiles.len(),
                max: SimConfig::MAX_PARTY_SIZE,
            });
        }
        if active.0 >= profiles.len() {
            return Err(BuildError::ActiveOutOfRange {
                index: active,
                size: profiles.len(),
            });
        }

        let mut members = ArrayVec::new();
        for (i, profile) in profiles.into_iter().enumerate() {
            validate_profile(&profile, config, &members)?;
            members.push(Character::from_profile(CharIndex(i), profile, config));
        }

        Ok(Self {
            members,
            active,
            swap_ready_at: Frame::ZERO,
            position: Position::ORIGIN,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn active(&self) -> CharIndex {
        self.active
    }

    pub(crate) fn set_active(&mut self, index: CharIndex) {
        self.active = index;
    }

    pub fn get(&self, index: CharIndex) -> Option<&Character> {
        self.members.get(index.0)
    }

    pub fn get_mut(&mut self, index: CharIndex) -> Option<&mut Character> {
        self.members.get_mut(index.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.members.iter_mut()
    }

    pub fn find(&self, key: &str) -> Option<&Character> {
        self.members.iter().find(|c| c.key == key)
    }
}

fn validate_profile(
    profile: &CharacterProfile,
    config: &SimConfig,
    members: &[Character],
) -> Result<(), BuildError> {
    if members.iter().any(|c| c.key == profile.key) {
        return Err(BuildError::DuplicateCharacter {
            key: profile.key.clone(),
        });
    }
    let level = profile.level.unwrap_or(config.character_level);
    if !(1..=MAX_LEVEL).contains(&level) {
        return Err(BuildError::InvalidLevel {
            key: profile.key.clone(),
            level,
        });
    }
    if profile.energy_max.is_nan() || profile.energy_max <= 0.0 {
        return Err(BuildError::InvalidEnergy {
            key: profile.key.clone(),
        });
    }
    Ok(())
}

const MAX_LEVEL: u32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(key: &str) -> CharacterProfile {
        CharacterProfile::new(key, Element::Pyro, 60.0)
    }

    #[test]
    fn party_rejects_bad_compositions() {
        let config = SimConfig::default();
        assert_eq!(
            Party::new(vec![], CharIndex(0), &config).unwrap_err(),
            BuildError::EmptyParty
        );
        let five = (0..5).map(|i| profile(&format!("c{i}"))).collect();
        assert!(matches!(
            Party::new(five, CharIndex(0), &config),
            Err(BuildError::PartyTooLarge { size: 5, max: 4 })
        ));
        assert!(matches!(
            Party::new(vec![profile("a"), profile("a")], CharIndex(0), &config),
            Err(BuildError::DuplicateCharacter { .. })
        ));
        assert!(matches!(
            Party::new(vec![profile("a")], CharIndex(1), &config),
            Err(BuildError::ActiveOutOfRange { .. })
        ));
        assert!(matches!(
            Party::new(vec![profile("a").with_level(0)], CharIndex(0), &config),
            Err(BuildError::InvalidLevel { level: 0, .. })
        ));
        assert!(matches!(
            Party::new(
                vec![CharacterProfile::new("a", Element::Pyro, 0.0)],
                CharIndex(0),
                &config
            ),
            Err(BuildError::InvalidEnergy { .. })
        ));
    }

    #[test]
    fn characters_start_with_full_energy_and_default_level() {
        let config = SimConfig::default();
        let party = Party::new(
            vec![profile("a"), profile("b").with_starting_energy(10.0)],
            CharIndex(1),
            &config,
        )
        .unwrap();

        assert_eq!(party.active(), CharIndex(1));
        let a = party.get(CharIndex(0)).unwrap();
        assert_eq!(a.energy, 60.0);
        assert_eq!(a.level, 90);
        assert_eq!(party.get(CharIndex(1)).unwrap().energy, 10.0);
        assert_eq!(party.find("b").map(|c| c.index), Some(CharIndex(1)));
    }
}
