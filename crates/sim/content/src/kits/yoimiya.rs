//! Yoimiya.
//!
//! Niwabi Fire-Dance turns normal attacks into Pyro kindling arrows for ten
//! seconds. Leaving the field ends it early. Each arrow that hits adds a
//! stack of Tricks of the Trouble-Maker, a Pyro DMG bonus that lasts three
//! seconds from the latest hit.

use sim_core::{
    ActionInfo, ActionParams, ActionSlot, AttackCallback, AttackInfo, AttackPattern, AttackTag,
    CharIndex, CharacterKit, Element, Event, EventTag, IcdGroup, IcdTag, RefreshPolicy,
    Simulation, StatKind, StatMod, StatSet, StatVector, Talents,
};

use super::{Infusion, NormalChain, NormalHit, talent_scale};
use crate::scenario::CharacterParams;

const SKILL_KEY: &str = "yoimiyaskill";
const SKILL_START: u64 = 11;
const SKILL_DURATION: u64 = 600 + SKILL_START;
const SKILL_COOLDOWN: u64 = 1080;
/// Kindling arrows deal this multiple of the normal attack.
const KINDLING_FACTOR: f64 = 1.3791;

const A1_KEY: &str = "yoimiya-a1";
const A1_DURATION: u64 = 180;
const A1_MAX_STACKS: u32 = 10;
/// Pyro DMG bonus per stack.
const A1_BONUS: f64 = 0.02;

const BURST_ABIL: &str = "Aurous Blaze";
const BURST_MULT: f64 = 1.272;
const BURST_HITMARK: u64 = 75;
const BURST_RADIUS: f64 = 5.5;
const BURST_COOLDOWN: u64 = 900;
const BURST_FRAMES: u32 = 114;

static NORMALS: [NormalHit; 5] = [
    NormalHit {
        abil: "Normal 0",
        mult: 0.719,
        hitmark: 15,
        frames: 26,
    },
    NormalHit {
        abil: "Normal 1",
        mult: 0.69,
        hitmark: 16,
        frames: 24,
    },
    NormalHit {
        abil: "Normal 2",
        mult: 0.896,
        hitmark: 23,
        frames: 37,
    },
    NormalHit {
        abil: "Normal 3",
        mult: 0.816,
        hitmark: 20,
        frames: 32,
    },
    NormalHit {
        abil: "Normal 4",
        mult: 0.856,
        hitmark: 24,
        frames: 45,
    },
];

pub struct Yoimiya {
    index: CharIndex,
    talents: Talents,
    normals: NormalChain,
}

impl Yoimiya {
    pub const KEY: &'static str = "yoimiya";
    pub const ENERGY_MAX: f64 = 60.0;

    pub fn new(_params: &CharacterParams) -> Self {
        Self {
            index: CharIndex(0),
            talents: Talents::default(),
            normals: NormalChain::new(&NORMALS),
        }
    }

    pub fn boxed(params: &CharacterParams) -> Box<dyn CharacterKit> {
        Box::new(Self::new(params))
    }
}

impl CharacterKit for Yoimiya {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn init(&mut self, sim: &mut Simulation, index: CharIndex) {
        self.index = index;
        if let Some(c) = sim.character(index) {
            self.talents = c.talents;
        }

        sim.subscribe(EventTag::CharacterSwapped, "yoimiya-exit", move |sim, event| {
            if let Event::CharacterSwapped { prev, next } = *event
                && prev == index
                && next != index
            {
                sim.delete_status(index, SKILL_KEY);
            }
            false
        });

        sim.add_stat_mod(
            index,
            StatMod::permanent(A1_KEY, StatSet::PYRO_P, |ctx| {
                let stacks = ctx.statuses.stacks(A1_KEY, ctx.now);
                (stacks > 0)
                    .then(|| StatVector::ZERO.with(StatKind::PyroP, A1_BONUS * f64::from(stacks)))
            }),
        );
    }

    fn attack(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        let index = self.index;
        if !sim.is_status_active(index, SKILL_KEY) {
            return self.normals.swing(sim, index, self.talents.attack);
        }

        let infusion = Infusion {
            element: Element::Pyro,
            durability: 25.0,
            factor: KINDLING_FACTOR * talent_scale(self.talents.skill),
        };
        let trouble_maker = AttackCallback::per_target(move |sim, _| {
            sim.add_status(
                index,
                A1_KEY,
                A1_DURATION,
                RefreshPolicy::Stack {
                    max: A1_MAX_STACKS,
                },
            );
        });
        self.normals
            .swing_as(sim, index, self.talents.attack, infusion, vec![trouble_maker])
    }

    fn skill(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        // Running Trouble-Maker stacks carry over; a lapsed status restarts
        // from one stack on the next hit.
        sim.add_status(self.index, SKILL_KEY, SKILL_DURATION, RefreshPolicy::Restart);
        sim.start_cooldown(self.index, ActionSlot::Skill, SKILL_COOLDOWN, SKILL_START);

        ActionInfo::new(34)
            .with_can_queue_after(22)
            .with_frames(ActionSlot::Attack, 22)
            .with_frames(ActionSlot::Charge, 22)
            .with_frames(ActionSlot::Burst, 23)
            .with_frames(ActionSlot::Jump, 32)
            .with_frames(ActionSlot::Swap, 31)
    }

    fn burst(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        let index = self.index;
        let info = AttackInfo::new(index, BURST_ABIL)
            .tag(AttackTag::ElementalBurst)
            .icd(IcdTag::ElementalBurst, IcdGroup::Default)
            .element(Element::Pyro, 25.0)
            .mult(BURST_MULT * talent_scale(self.talents.burst));
        let pattern = AttackPattern::circle(sim.player_position(), BURST_RADIUS);
        sim.queue_attack_live(info, pattern, BURST_HITMARK, Vec::new());

        sim.consume_energy(index, 0);
        sim.start_cooldown(index, ActionSlot::Burst, BURST_COOLDOWN, 0);
        ActionInfo::new(BURST_FRAMES)
    }
}
