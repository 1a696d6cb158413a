//! Snapshot - frozen copy of an actor's stats.
//!
//! A snapshot is taken when an attack is queued. Damage computed at resolution
//! time reads the snapshot, so stat changes between queueing and resolution
//! cannot retroactively alter a hit that is already in flight.

use super::kinds::{Element, StatKind, StatVector};
use crate::state::CharIndex;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub actor: CharIndex,
    pub level: u32,
    /// Base stats plus every modifier active when the snapshot was taken.
    pub stats: StatVector,
}

impl Snapshot {
    pub fn new(actor: CharIndex, level: u32, stats: StatVector) -> Self {
        Self {
            actor,
            level,
            stats,
        }
    }

    pub fn total_atk(&self) -> f64 {
        self.stats.total_atk()
    }

    /// Damage bonus applying to hits of `element`.
    pub fn damage_bonus(&self, element: Element) -> f64 {
        element
            .damage_bonus()
            .map(|kind| self.stats[kind])
            .unwrap_or(0.0)
    }

    /// Crit rate clamped to `[0, 1]`.
    pub fn crit_rate(&self) -> f64 {
        self.stats[StatKind::Cr].clamp(0.0, 1.0)
    }

    pub fn crit_damage(&self) -> f64 {
        self.stats[StatKind::Cd]
    }
}
