//! Energy gain, consumption and particle distribution.

use tracing::{debug, warn};

use crate::engine::Simulation;
use crate::events::Event;
use crate::state::CharIndex;
use crate::stats::{Element, StatKind};

/// Energy one particle gives a character of the same element.
const SAME_ELEMENT: f64 = 3.0;
/// Energy one element-less particle gives anyone.
const NO_ELEMENT: f64 = 2.0;
/// Energy one particle gives a character of another element.
const OTHER_ELEMENT: f64 = 1.0;

/// Base energy of one particle of `particle` for a character of `receiver`.
pub(crate) fn particle_base(particle: Element, receiver: Element) -> f64 {
    if particle == Element::NoElement {
        NO_ELEMENT
    } else if particle == receiver {
        SAME_ELEMENT
    } else {
        OTHER_ELEMENT
    }
}

impl Simulation {
    /// Adds flat energy, clamped to the character's capacity.
    ///
    /// Emits [`Event::EnergyAdded`] with the offered amount and the energy
    /// before and after. Returns the energy after.
    pub fn add_energy(&mut self, index: CharIndex, source: &'static str, amount: f64) -> f64 {
        let Some(c) = self.party.get_mut(index) else {
            warn!(target: "sim_core::status", %index, source, "energy for unknown character");
            return 0.0;
        };
        let pre = c.energy;
        c.energy = (pre + amount).clamp(0.0, c.energy_max);
        let post = c.energy;

        debug!(target: "sim_core::status", frame = self.now.0, %index, source, amount, pre, post, "energy added");
        self.emit(Event::EnergyAdded {
            char: index,
            source,
            amount,
            pre,
            post,
        });
        post
    }

    /// Drains the energy bar `delay` frames from now; immediately when
    /// `delay` is zero.
    pub fn consume_energy(&mut self, index: CharIndex, delay: u64) {
        if delay == 0 {
            if let Some(c) = self.party.get_mut(index) {
                c.energy = 0.0;
            }
            return;
        }
        self.schedule(delay, move |sim| sim.consume_energy(index, 0));
    }

    /// Generates `count` particles now and hands them to the party after
    /// `delay` frames.
    ///
    /// Each character receives `count × base × (1 + ER)`, with `base` from
    /// the particle and character elements and ER read at pickup time.
    /// Off-field characters receive [`off_field_energy_ratio`] of that.
    ///
    /// [`off_field_energy_ratio`]: crate::SimConfig::off_field_energy_ratio
    pub fn queue_particle(&mut self, source: &'static str, count: u32, element: Element, delay: u64) {
        self.emit(Event::ParticleGenerated {
            source,
            count,
            element,
        });
        self.schedule(delay, move |sim| sim.distribute_particles(source, count, element));
    }

    fn distribute_particles(&mut self, source: &'static str, count: u32, element: Element) {
        let now = self.now;
        let active = self.party.active();
        let off_field = self.config.off_field_energy_ratio;

        let gains: Vec<(CharIndex, f64)> = self
            .party
            .iter()
            .map(|c| {
                let mut amount = count as f64
                    * particle_base(element, c.element)
                    * (1.0 + c.stat(StatKind::Er, now));
                if c.index != active {
                    amount *= off_field;
                }
                (c.index, amount)
            })
            .collect();

        for (index, amount) in gains {
            self.add_energy(index, source, amount);
        }
    }
}
