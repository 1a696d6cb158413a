//! Collects trial statistics and the event fingerprint from the bus.

use std::cell::RefCell;
use std::rc::Rc;

use sha2::{Digest, Sha256};

use crate::engine::Simulation;
use crate::events::{Event, EventTag};
use crate::state::Frame;

#[derive(Default)]
struct Tally {
    total_damage: f64,
    damage_by_char: Vec<f64>,
    energy_by_char: Vec<f64>,
    particles: u32,
    hits: u64,
    events: u64,
    hasher: Sha256,
}

impl Tally {
    fn record(&mut self, now: Frame, event: &Event) {
        self.events += 1;
        self.hasher.update(format!("{}|{:?}\n", now.0, event).as_bytes());

        match *event {
            Event::AttackLanded { actor, damage, .. } => {
                self.total_damage += damage;
                self.hits += 1;
                if let Some(slot) = self.damage_by_char.get_mut(actor.0) {
                    *slot += damage;
                }
            }
            Event::EnergyAdded { char, pre, post, .. } => {
                if let Some(slot) = self.energy_by_char.get_mut(char.0) {
                    *slot += (post - pre).max(0.0);
                }
            }
            Event::ParticleGenerated { count, .. } => self.particles += count,
            _ => {}
        }
    }
}

/// Totals read back after the frame loop ends.
pub(crate) struct Totals {
    pub total_damage: f64,
    pub damage_by_char: Vec<f64>,
    pub energy_by_char: Vec<f64>,
    pub particles: u32,
    pub hits: u64,
    pub events: u64,
    pub fingerprint: String,
}

pub(crate) struct Recorder {
    tally: Rc<RefCell<Tally>>,
}

impl Recorder {
    const ID: &'static str = "trial-recorder";

    /// Subscribes to every kernel event tag.
    pub(crate) fn attach(sim: &mut Simulation) -> Self {
        let party = sim.party().len();
        let tally = Rc::new(RefCell::new(Tally {
            damage_by_char: vec![0.0; party],
            energy_by_char: vec![0.0; party],
            ..Tally::default()
        }));

        for tag in EventTag::KERNEL {
            let tally = Rc::clone(&tally);
            sim.subscribe(tag, Self::ID, move |sim, event| {
                tally.borrow_mut().record(sim.now(), event);
                false
            });
        }
        Self { tally }
    }

    pub(crate) fn finish(self, sim: &mut Simulation) -> Totals {
        for tag in EventTag::KERNEL {
            sim.unsubscribe(tag, Self::ID);
        }
        let tally = self.tally.take();
        Totals {
            total_damage: tally.total_damage,
            damage_by_char: tally.damage_by_char,
            energy_by_char: tally.energy_by_char,
            particles: tally.particles,
            hits: tally.hits,
            events: tally.events,
            fingerprint: hex::encode(tally.hasher.finalize()),
        }
    }
}
