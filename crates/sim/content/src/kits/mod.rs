//! Character kits and the registry that maps keys to them.

mod travelerelectro;
mod xiangling;
mod yoimiya;

use std::collections::HashMap;
use std::fmt;

use sim_core::{
    ActionInfo, AttackCallback, AttackInfo, AttackPattern, AttackTag, CharIndex, CharacterKit,
    Element, IcdGroup, IcdTag, Simulation, TargetId,
};

use crate::scenario::CharacterParams;

pub use travelerelectro::TravelerElectro;
pub use xiangling::Xiangling;
pub use yoimiya::Yoimiya;

/// Constructs a fresh kit for one trial.
pub type KitBuilder = fn(&CharacterParams) -> Box<dyn CharacterKit>;

/// Static data a kit contributes to the character profile, plus its
/// constructor.
#[derive(Clone, Copy)]
pub struct KitEntry {
    pub element: Element,
    pub energy_max: f64,
    pub build: KitBuilder,
}

impl fmt::Debug for KitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KitEntry")
            .field("element", &self.element)
            .field("energy_max", &self.energy_max)
            .finish_non_exhaustive()
    }
}

/// Character key to kit lookup.
///
/// Holds only constructors, so one registry is shared by every worker
/// thread while each trial gets its own kit instances.
#[derive(Clone, Debug, Default)]
pub struct KitRegistry {
    entries: HashMap<String, KitEntry>,
}

impl KitRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every kit shipped with this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            TravelerElectro::KEY,
            KitEntry {
                element: Element::Electro,
                energy_max: TravelerElectro::ENERGY_MAX,
                build: TravelerElectro::boxed,
            },
        );
        registry.register(
            Yoimiya::KEY,
            KitEntry {
                element: Element::Pyro,
                energy_max: Yoimiya::ENERGY_MAX,
                build: Yoimiya::boxed,
            },
        );
        registry.register(
            Xiangling::KEY,
            KitEntry {
                element: Element::Pyro,
                energy_max: Xiangling::ENERGY_MAX,
                build: Xiangling::boxed,
            },
        );
        registry
    }

    /// Adds or replaces the kit for `key`.
    pub fn register(&mut self, key: impl Into<String>, entry: KitEntry) -> Option<KitEntry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&KitEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn build(&self, key: &str, params: &CharacterParams) -> Option<Box<dyn CharacterKit>> {
        self.entries.get(key).map(|entry| (entry.build)(params))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

const TALENT_SCALE: [f64; 15] = [
    1.0, 1.075, 1.15, 1.25, 1.325, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 2.125, 2.25, 2.375,
];

/// Multiplier growth of a talent at `level`, relative to level 1.
///
/// Levels outside 1..=15 clamp to the nearest end.
pub(crate) fn talent_scale(level: u8) -> f64 {
    let i = (level.clamp(1, 15) - 1) as usize;
    TALENT_SCALE[i]
}

/// One hit of a normal-attack string.
pub(crate) struct NormalHit {
    pub abil: &'static str,
    /// Level-1 multiplier.
    pub mult: f64,
    pub hitmark: u64,
    pub frames: u32,
}

/// Position in a normal-attack string.
///
/// Any other action restarts the string at its first hit.
pub(crate) struct NormalChain {
    hits: &'static [NormalHit],
    next: usize,
}

impl NormalChain {
    pub fn new(hits: &'static [NormalHit]) -> Self {
        Self { hits, next: 0 }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Returns the next hit and moves along the string, wrapping at its end.
    pub fn advance(&mut self) -> &'static NormalHit {
        let hit = &self.hits[self.next % self.hits.len()];
        self.next = (self.next + 1) % self.hits.len();
        hit
    }

    /// Queues the next hit as a physical single-target attack on the nearest
    /// target and returns its frame data.
    pub fn swing(&mut self, sim: &mut Simulation, index: CharIndex, talent: u8) -> ActionInfo {
        self.swing_as(sim, index, talent, Infusion::PHYSICAL, Vec::new())
    }

    /// Like [`swing`](Self::swing) with an infusion and on-hit callbacks.
    pub fn swing_as(
        &mut self,
        sim: &mut Simulation,
        index: CharIndex,
        talent: u8,
        infusion: Infusion,
        callbacks: Vec<AttackCallback>,
    ) -> ActionInfo {
        let hit = self.advance();
        // Physical hits never open an ICD window.
        let icd = if infusion.element.is_elemental() {
            IcdTag::NormalAttack
        } else {
            IcdTag::None
        };
        let info = AttackInfo::new(index, hit.abil)
            .tag(AttackTag::Normal)
            .icd(icd, IcdGroup::Default)
            .element(infusion.element, infusion.durability)
            .mult(hit.mult * talent_scale(talent) * infusion.factor);
        if let Some(target) = nearest_target(sim) {
            sim.queue_attack_live(info, AttackPattern::single(target), hit.hitmark, callbacks);
        }
        ActionInfo::new(hit.frames)
    }
}

/// Element and damage factor a normal attack is converted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Infusion {
    pub element: Element,
    pub durability: f64,
    pub factor: f64,
}

impl Infusion {
    pub const PHYSICAL: Self = Self {
        element: Element::Physical,
        durability: 0.0,
        factor: 1.0,
    };
}

/// Closest living target to the player.
pub(crate) fn nearest_target(sim: &Simulation) -> Option<TargetId> {
    let player = sim.player_position();
    sim.targets()
        .iter()
        .filter(|t| t.is_alive())
        .min_by(|a, b| {
            a.position
                .distance(&player)
                .total_cmp(&b.position.distance(&player))
        })
        .map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    static HITS: [NormalHit; 2] = [
        NormalHit {
            abil: "N1",
            mult: 0.5,
            hitmark: 10,
            frames: 20,
        },
        NormalHit {
            abil: "N2",
            mult: 0.6,
            hitmark: 12,
            frames: 25,
        },
    ];

    #[test]
    fn default_registry_has_sample_kits() {
        let registry = KitRegistry::with_defaults();
        assert_eq!(registry.keys(), vec!["travelerelectro", "xiangling", "yoimiya"]);
        assert_eq!(registry.get("xiangling").map(|e| e.energy_max), Some(80.0));

        let kit = registry
            .build("yoimiya", &CharacterParams::default())
            .unwrap();
        assert_eq!(kit.key(), "yoimiya");
        assert!(registry.build("nobody", &CharacterParams::default()).is_none());
    }

    #[test]
    fn talent_scale_clamps() {
        assert_eq!(talent_scale(0), 1.0);
        assert_eq!(talent_scale(1), 1.0);
        assert_eq!(talent_scale(9), 1.7);
        assert_eq!(talent_scale(20), 2.375);
    }

    #[test]
    fn normal_chain_wraps_and_resets() {
        let mut chain = NormalChain::new(&HITS);
        assert_eq!(chain.advance().abil, "N1");
        assert_eq!(chain.advance().abil, "N2");
        assert_eq!(chain.advance().abil, "N1");
        chain.reset();
        assert_eq!(chain.advance().abil, "N1");
    }
}
