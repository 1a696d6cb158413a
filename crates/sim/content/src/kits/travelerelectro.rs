//! Traveler (Electro).
//!
//! Lightning Blade throws up to three blades. Every blade that lands can drop
//! an Abundance Amulet; the active character picks all of them up at once
//! after a short delay, gaining flat energy and energy recharge.

use std::cell::Cell;
use std::rc::Rc;

use sim_core::{
    ActionInfo, ActionParams, ActionSlot, AttackCallback, AttackInfo, AttackPattern, AttackTag,
    CharIndex, CharacterKit, Element, IcdGroup, IcdTag, ProcLimit, Simulation, StatKind, StatMod,
    StatSet, StatVector, Talents,
};
use tracing::debug;

use super::{NormalChain, NormalHit, talent_scale};
use crate::scenario::CharacterParams;

const SKILL_ABIL: &str = "Lightning Blade";
const SKILL_MULT: f64 = 0.787;
const SKILL_HITMARK: u64 = 21;
const SKILL_RADIUS: f64 = 0.3;
const SKILL_COOLDOWN: u64 = 810;
const SKILL_COOLDOWN_DELAY: u64 = 20;
const MAX_BLADES: u32 = 3;

const AMULET_KEY: &str = "abundance-amulet";
/// Earliest pickup after the cast.
const MIN_AMULET_DELAY: u64 = 107;
const AMULET_ER: f64 = 0.2;
const AMULET_DURATION: u64 = 360;
/// Skill cooldown reduction per amulet picked up by someone else.
const A1_REDUCTION: u64 = 90;
/// Energy fraction under which C4 doubles amulet energy.
const C4_THRESHOLD: f64 = 0.35;

const BURST_ABIL: &str = "Bellowing Thunder";
const BURST_MULT: f64 = 1.144;
const BURST_HITMARK: u64 = 35;
const BURST_RADIUS: f64 = 5.0;
const BURST_COOLDOWN: u64 = 1200;
const BURST_ENERGY_DELAY: u64 = 5;
const BURST_FRAMES: u32 = 61;

static NORMALS: [NormalHit; 5] = [
    NormalHit {
        abil: "Normal 0",
        mult: 0.445,
        hitmark: 14,
        frames: 24,
    },
    NormalHit {
        abil: "Normal 1",
        mult: 0.434,
        hitmark: 12,
        frames: 27,
    },
    NormalHit {
        abil: "Normal 2",
        mult: 0.53,
        hitmark: 14,
        frames: 33,
    },
    NormalHit {
        abil: "Normal 3",
        mult: 0.583,
        hitmark: 16,
        frames: 41,
    },
    NormalHit {
        abil: "Normal 4",
        mult: 0.708,
        hitmark: 23,
        frames: 53,
    },
];

/// Flat energy per amulet by skill talent level.
fn amulet_energy(level: u8) -> f64 {
    match level {
        0..=6 => 3.0,
        7..=12 => 3.5,
        _ => 4.0,
    }
}

pub struct TravelerElectro {
    index: CharIndex,
    female: bool,
    constellation: u8,
    talents: Talents,
    /// Energy recharge before any modifier; the amulet bonus scales on it.
    base_er: f64,
    /// Amulets generated by the latest cast and not yet picked up.
    amulets: Rc<Cell<u32>>,
    normals: NormalChain,
}

impl TravelerElectro {
    pub const KEY: &'static str = "travelerelectro";
    pub const ENERGY_MAX: f64 = 80.0;

    pub fn new(params: &CharacterParams) -> Self {
        Self {
            index: CharIndex(0),
            female: params.female,
            constellation: 0,
            talents: Talents::default(),
            base_er: 0.0,
            amulets: Rc::new(Cell::new(0)),
            normals: NormalChain::new(&NORMALS),
        }
    }

    pub fn boxed(params: &CharacterParams) -> Box<dyn CharacterKit> {
        Box::new(Self::new(params))
    }

    fn skill_frames(&self) -> ActionInfo {
        let info = ActionInfo::new(57)
            .with_can_queue_after(42)
            .with_frames(ActionSlot::Dash, 42)
            .with_frames(ActionSlot::Jump, 42);
        if self.female {
            info.with_frames(ActionSlot::Swap, 55)
        } else {
            info.with_frames(ActionSlot::Burst, 56)
                .with_frames(ActionSlot::Swap, 56)
        }
    }
}

impl CharacterKit for TravelerElectro {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn init(&mut self, sim: &mut Simulation, index: CharIndex) {
        self.index = index;
        if let Some(c) = sim.character(index) {
            self.constellation = c.constellation;
            self.talents = c.talents;
            self.base_er = c.base[StatKind::Er];
        }
    }

    fn attack(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.swing(sim, self.index, self.talents.attack)
    }

    fn skill(&mut self, sim: &mut Simulation, params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        let index = self.index;

        let blades = params.hits_or(1).min(MAX_BLADES);
        let mut max_amulets = if self.constellation >= 1 { 3 } else { 2 };
        if let Some(cap) = params.max_amulets {
            max_amulets = max_amulets.min(cap);
        }
        let pickup_delay = params.amulet_delay.map_or(0, u64::from).max(MIN_AMULET_DELAY);

        // Amulets left over from an earlier cast are lost.
        self.amulets.set(0);

        let info = AttackInfo::new(index, SKILL_ABIL)
            .tag(AttackTag::ElementalArt)
            .icd(IcdTag::ElementalArt, IcdGroup::Default)
            .element(Element::Electro, 25.0)
            .mult(SKILL_MULT * talent_scale(self.talents.skill));
        let snapshot = sim.snapshot(index);
        let particle_delay = sim.config().particle_delay;

        // One particle per cast, however many blades land.
        let particles = AttackCallback::once(move |sim, _| {
            sim.queue_particle(Self::KEY, 1, Element::Electro, particle_delay);
        })
        .with_limit(ProcLimit::once());

        let amulets = Rc::clone(&self.amulets);
        let generate = AttackCallback::once(move |sim, _| {
            let held = amulets.get();
            if held >= max_amulets {
                return;
            }
            amulets.set(held + 1);
            debug!(
                target: "sim_core::combat",
                frame = sim.now().0,
                amulets = held + 1,
                "abundance amulet generated"
            );
        });

        for _ in 0..blades {
            let pattern = AttackPattern::circle(sim.player_position(), SKILL_RADIUS);
            sim.queue_attack(
                info.clone(),
                snapshot.clone(),
                pattern,
                SKILL_HITMARK,
                vec![particles.clone(), generate.clone()],
            );
        }

        let amulets = Rc::clone(&self.amulets);
        let pickup = Pickup {
            owner: index,
            constellation: self.constellation,
            energy_per_amulet: amulet_energy(self.talents.skill),
            er_bonus: AMULET_ER + self.base_er * 0.1,
        };
        sim.schedule(pickup_delay, move |sim| {
            let collector = sim.active();
            pickup.collect(sim, collector, &amulets);
        });

        sim.start_cooldown(index, ActionSlot::Skill, SKILL_COOLDOWN, SKILL_COOLDOWN_DELAY);
        self.skill_frames()
    }

    fn burst(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        let index = self.index;
        let info = AttackInfo::new(index, BURST_ABIL)
            .tag(AttackTag::ElementalBurst)
            .icd(IcdTag::ElementalBurst, IcdGroup::Default)
            .element(Element::Electro, 50.0)
            .mult(BURST_MULT * talent_scale(self.talents.burst));
        let pattern = AttackPattern::circle(sim.player_position(), BURST_RADIUS);
        sim.queue_attack_live(info, pattern, BURST_HITMARK, Vec::new());

        sim.consume_energy(index, BURST_ENERGY_DELAY);
        sim.start_cooldown(index, ActionSlot::Burst, BURST_COOLDOWN, 0);
        ActionInfo::new(BURST_FRAMES).with_can_queue_after(BURST_HITMARK as u32)
    }
}

/// Values fixed at cast time for the amulet pickup.
struct Pickup {
    owner: CharIndex,
    constellation: u8,
    energy_per_amulet: f64,
    er_bonus: f64,
}

impl Pickup {
    /// Hands every pending amulet to `collector` at once.
    fn collect(&self, sim: &mut Simulation, collector: CharIndex, amulets: &Cell<u32>) {
        let count = amulets.get();
        if count == 0 {
            return;
        }

        let mut energy = self.energy_per_amulet * count as f64;
        if self.constellation >= 4
            && sim
                .character(collector)
                .is_some_and(|c| c.energy < c.energy_max * C4_THRESHOLD)
        {
            energy *= 2.0;
        }
        sim.add_energy(collector, AMULET_KEY, energy);

        if collector != self.owner {
            sim.reduce_cooldown(self.owner, ActionSlot::Skill, A1_REDUCTION * count as u64);
        }

        let er = StatVector::new().with(StatKind::Er, self.er_bonus);
        sim.add_stat_mod(
            collector,
            StatMod::constant(AMULET_KEY, AMULET_DURATION, StatSet::ER, er),
        );

        debug!(
            target: "sim_core::combat",
            frame = sim.now().0,
            %collector,
            count,
            energy,
            "abundance amulets collected"
        );
        amulets.set(0);
    }
}
