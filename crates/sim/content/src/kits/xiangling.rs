//! Xiangling.
//!
//! Guoba breathes fire four times from where it was placed. Pyronado spins
//! around the player while its status lasts, with stats fixed at cast time.

use sim_core::{
    ActionInfo, ActionParams, ActionSlot, AttackCallback, AttackInfo, AttackPattern, AttackTag,
    CharIndex, CharacterKit, Element, IcdGroup, IcdTag, RefreshPolicy, Simulation, Snapshot,
    Talents,
};
use tracing::trace;

use super::{NormalChain, NormalHit, talent_scale};
use crate::scenario::CharacterParams;

const GUOBA_ABIL: &str = "Guoba";
const GUOBA_MULT: f64 = 1.113;
const GUOBA_HITS: u64 = 4;
const GUOBA_FIRST_HIT: u64 = 126;
const GUOBA_INTERVAL: u64 = 100;
const GUOBA_RADIUS: f64 = 2.5;
const SKILL_COOLDOWN: u64 = 720;

const BURST_KEY: &str = "xianglingburst";
const SWING_ABIL: &str = "Pyronado Initial";
/// Hitmark and level-1 multiplier of the three opening swings.
const SWINGS: [(u64, f64); 3] = [(18, 0.72), (33, 0.88), (56, 1.096)];
const SPIN_ABIL: &str = "Pyronado";
const SPIN_MULT: f64 = 1.12;
const SPIN_START: u64 = 56;
const SPIN_INTERVAL: u64 = 73;
const SPIN_RADIUS: f64 = 2.5;
const BURST_DURATION: u64 = 600 + SPIN_START;
const BURST_COOLDOWN: u64 = 1200;
const BURST_FRAMES: u32 = 80;

static NORMALS: [NormalHit; 5] = [
    NormalHit {
        abil: "Normal 0",
        mult: 0.4205,
        hitmark: 12,
        frames: 22,
    },
    NormalHit {
        abil: "Normal 1",
        mult: 0.4214,
        hitmark: 12,
        frames: 24,
    },
    NormalHit {
        abil: "Normal 2",
        mult: 0.5229,
        hitmark: 16,
        frames: 35,
    },
    NormalHit {
        abil: "Normal 3",
        mult: 0.5676,
        hitmark: 18,
        frames: 38,
    },
    NormalHit {
        abil: "Normal 4",
        mult: 0.7104,
        hitmark: 26,
        frames: 56,
    },
];

pub struct Xiangling {
    index: CharIndex,
    talents: Talents,
    normals: NormalChain,
}

impl Xiangling {
    pub const KEY: &'static str = "xiangling";
    pub const ENERGY_MAX: f64 = 80.0;

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

    fn burst_info(&self, abil: &'static str, mult: f64) -> AttackInfo {
        AttackInfo::new(self.index, abil)
            .tag(AttackTag::ElementalBurst)
            .icd(IcdTag::ElementalBurst, IcdGroup::Default)
            .element(Element::Pyro, 25.0)
            .mult(mult * talent_scale(self.talents.burst))
    }
}

impl CharacterKit for Xiangling {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn init(&mut self, sim: &mut Simulation, index: CharIndex) {
        self.index = index;
        if let Some(c) = sim.character(index) {
            self.talents = c.talents;
        }
    }

    fn attack(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.swing(sim, self.index, self.talents.attack)
    }

    fn skill(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        let info = AttackInfo::new(self.index, GUOBA_ABIL)
            .tag(AttackTag::ElementalArt)
            .icd(IcdTag::ElementalArt, IcdGroup::Default)
            .element(Element::Pyro, 25.0)
            .mult(GUOBA_MULT * talent_scale(self.talents.skill));
        let snapshot = sim.snapshot(self.index);
        let pattern = AttackPattern::circle(sim.player_position(), GUOBA_RADIUS);
        let particle_delay = sim.config().particle_delay;

        for i in 0..GUOBA_HITS {
            let particle = AttackCallback::once(move |sim, _| {
                sim.queue_particle(Self::KEY, 1, Element::Pyro, particle_delay);
            });
            sim.queue_attack(
                info.clone(),
                snapshot.clone(),
                pattern,
                GUOBA_FIRST_HIT + i * GUOBA_INTERVAL,
                vec![particle],
            );
        }

        sim.start_cooldown(self.index, ActionSlot::Skill, SKILL_COOLDOWN, 0);
        ActionInfo::new(39).with_can_queue_after(24)
    }

    fn burst(&mut self, sim: &mut Simulation, _params: &ActionParams) -> ActionInfo {
        self.normals.reset();
        let index = self.index;
        let snapshot = sim.snapshot(index);

        for (hitmark, mult) in SWINGS {
            let pattern = AttackPattern::circle(sim.player_position(), SPIN_RADIUS);
            sim.queue_attack(
                self.burst_info(SWING_ABIL, mult),
                snapshot.clone(),
                pattern,
                hitmark,
                Vec::new(),
            );
        }

        sim.add_status(index, BURST_KEY, BURST_DURATION, RefreshPolicy::Restart);
        let spin = self.burst_info(SPIN_ABIL, SPIN_MULT);
        sim.schedule(SPIN_START, move |sim| pyronado_spin(sim, spin, snapshot));

        sim.consume_energy(index, 0);
        sim.start_cooldown(index, ActionSlot::Burst, BURST_COOLDOWN, 0);
        ActionInfo::new(BURST_FRAMES)
    }
}

/// One Pyronado revolution; reschedules itself while the status holds.
fn pyronado_spin(sim: &mut Simulation, info: AttackInfo, snapshot: Snapshot) {
    if !sim.is_status_active(info.actor, BURST_KEY) {
        trace!(target: "sim_core::combat", frame = sim.now().0, "pyronado ended");
        return;
    }
    let pattern = AttackPattern::circle(sim.player_position(), SPIN_RADIUS);
    sim.queue_attack(info.clone(), snapshot.clone(), pattern, 0, Vec::new());
    sim.schedule(SPIN_INTERVAL, move |sim| pyronado_spin(sim, info, snapshot));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{CharacterProfile, Event, EventTag, Frame, StatKind, StatVector, Target, TargetId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Simulation, Xiangling) {
        let mut sim = Simulation::builder()
            .character(
                CharacterProfile::new("xiangling", Element::Pyro, 80.0)
                    .with_stats(StatVector::new().with(StatKind::BaseAtk, 800.0)),
            )
            .target(Target::new(TargetId(1), 90))
            .build()
            .unwrap();
        let mut kit = Xiangling::new(&CharacterParams::default());
        kit.init(&mut sim, CharIndex(0));
        (sim, kit)
    }

    fn landed(sim: &mut Simulation) -> Rc<RefCell<Vec<(u64, &'static str)>>> {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&hits);
        sim.subscribe(EventTag::AttackLanded, "landed", move |sim, event| {
            if let Event::AttackLanded { abil, .. } = event {
                seen.borrow_mut().push((sim.now().0, *abil));
            }
            false
        });
        hits
    }

    #[test]
    fn guoba_hits_four_times_with_a_particle_each() {
        let (mut sim, mut kit) = setup();
        let hits = landed(&mut sim);
        kit.skill(&mut sim, &ActionParams::default());

        sim.advance_to(Frame(500));
        let frames: Vec<u64> = hits.borrow().iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![126, 226, 326, 426]);
        assert!(!sim.is_ready(CharIndex(0), ActionSlot::Skill));
    }

    #[test]
    fn pyronado_spins_until_status_ends() {
        let (mut sim, mut kit) = setup();
        let hits = landed(&mut sim);
        kit.burst(&mut sim, &ActionParams::default());
        assert_eq!(sim.character(CharIndex(0)).map(|c| c.energy), Some(0.0));

        sim.advance_to(Frame(1000));
        let spins: Vec<u64> = hits
            .borrow()
            .iter()
            .filter(|(_, abil)| *abil == SPIN_ABIL)
            .map(|(f, _)| *f)
            .collect();
        // A spin task at frame f lands on f + 1; the last task inside the
        // status runs at 56 + 8 * 73 = 640.
        assert_eq!(spins.len(), 9);
        assert_eq!(spins.first(), Some(&57));
        assert_eq!(spins.last(), Some(&641));
        assert_eq!(sim.pending_tasks(), 0);
    }

    #[test]
    fn deleting_the_status_stops_the_spin() {
        let (mut sim, mut kit) = setup();
        let hits = landed(&mut sim);
        kit.burst(&mut sim, &ActionParams::default());
        sim.advance_to(Frame(100));
        sim.delete_status(CharIndex(0), BURST_KEY);
        sim.advance_to(Frame(1000));

        let spins = hits
            .borrow()
            .iter()
            .filter(|(_, abil)| *abil == SPIN_ABIL)
            .count();
        assert_eq!(spins, 1);
    }
}
