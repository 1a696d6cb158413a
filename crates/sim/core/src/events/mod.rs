//! Simulation events and the synchronous publish/subscribe bus.
//!
//! Outbound kernel events have a fixed field order. Reporting code matches on
//! these fields, so reordering or renaming them is a breaking change.

mod bus;

pub use bus::{EventBus, Handler};

use std::borrow::Cow;

use crate::action::ActionSlot;
use crate::state::{CharIndex, Frame, Key, TargetId};
use crate::stats::Element;

/// Entity a status is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Owner {
    Character(CharIndex),
    Target(TargetId),
}

impl From<CharIndex> for Owner {
    fn from(index: CharIndex) -> Self {
        Owner::Character(index)
    }
}

impl From<TargetId> for Owner {
    fn from(id: TargetId) -> Self {
        Owner::Target(id)
    }
}

/// Argument of a script-defined [`Event::Custom`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventArg {
    Int(i64),
    Float(f64),
    Text(Cow<'static, str>),
    Char(CharIndex),
    Target(TargetId),
    Frame(Frame),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Event {
    /// One attack instance hit one target.
    ///
    /// `applied` is false when ICD suppressed the element application.
    AttackLanded {
        actor: CharIndex,
        target: TargetId,
        abil: &'static str,
        element: Element,
        damage: f64,
        crit: bool,
        applied: bool,
    },
    StatusApplied {
        owner: Owner,
        key: Key,
        expiry: Frame,
        stacks: u32,
    },
    StatusRemoved {
        owner: Owner,
        key: Key,
    },
    CharacterSwapped {
        prev: CharIndex,
        next: CharIndex,
    },
    /// `amount` is what was offered; `post - pre` is what was kept after
    /// clamping to the energy cap.
    EnergyAdded {
        char: CharIndex,
        source: &'static str,
        amount: f64,
        pre: f64,
        post: f64,
    },
    /// `delta` is the reduction actually applied.
    CooldownReduced {
        char: CharIndex,
        slot: ActionSlot,
        delta: u64,
        ready_at: Frame,
    },
    ParticleGenerated {
        source: &'static str,
        count: u32,
        element: Element,
    },
    TargetDefeated {
        target: TargetId,
        by: CharIndex,
    },
    StatModAdded {
        owner: CharIndex,
        key: Key,
        expiry: Frame,
    },
    StatModRemoved {
        owner: CharIndex,
        key: Key,
    },
    /// Script-defined event. Subscribers match on the tag name.
    Custom {
        tag: &'static str,
        args: Vec<EventArg>,
    },
}

impl Event {
    pub fn tag(&self) -> EventTag {
        match self {
            Event::AttackLanded { .. } => EventTag::AttackLanded,
            Event::StatusApplied { .. } => EventTag::StatusApplied,
            Event::StatusRemoved { .. } => EventTag::StatusRemoved,
            Event::CharacterSwapped { .. } => EventTag::CharacterSwapped,
            Event::EnergyAdded { .. } => EventTag::EnergyAdded,
            Event::CooldownReduced { .. } => EventTag::CooldownReduced,
            Event::ParticleGenerated { .. } => EventTag::ParticleGenerated,
            Event::TargetDefeated { .. } => EventTag::TargetDefeated,
            Event::StatModAdded { .. } => EventTag::StatModAdded,
            Event::StatModRemoved { .. } => EventTag::StatModRemoved,
            Event::Custom { tag, .. } => EventTag::Custom(tag),
        }
    }
}

/// Routing key of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventTag {
    AttackLanded,
    StatusApplied,
    StatusRemoved,
    CharacterSwapped,
    EnergyAdded,
    CooldownReduced,
    ParticleGenerated,
    TargetDefeated,
    StatModAdded,
    StatModRemoved,
    Custom(&'static str),
}

impl EventTag {
    /// Every tag the kernel itself publishes.
    pub const KERNEL: [EventTag; 10] = [
        EventTag::AttackLanded,
        EventTag::StatusApplied,
        EventTag::StatusRemoved,
        EventTag::CharacterSwapped,
        EventTag::EnergyAdded,
        EventTag::CooldownReduced,
        EventTag::ParticleGenerated,
        EventTag::TargetDefeated,
        EventTag::StatModAdded,
        EventTag::StatModRemoved,
    ];
}
