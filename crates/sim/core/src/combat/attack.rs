//! Attack descriptions, target shapes and reaction callbacks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::icd::{IcdGroup, IcdTag};
use crate::engine::Simulation;
use crate::state::{CharIndex, Frame, Position, TargetId};
use crate::stats::{Element, Snapshot};

/// Kind of ability an attack came from. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackTag {
    #[default]
    None,
    Normal,
    Charged,
    Plunge,
    ElementalArt,
    ElementalArtHold,
    ElementalBurst,
}

/// Immutable metadata of one attack instance.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackInfo {
    pub actor: CharIndex,
    /// Ability name, reported in [`Event::AttackLanded`](crate::Event::AttackLanded).
    pub abil: &'static str,
    pub attack_tag: AttackTag,
    pub icd_tag: IcdTag,
    pub icd_group: IcdGroup,
    pub element: Element,
    /// Gauge units applied when ICD allows.
    pub durability: f64,
    /// Talent multiplier on total attack.
    pub mult: f64,
}

impl AttackInfo {
    pub fn new(actor: CharIndex, abil: &'static str) -> Self {
        Self {
            actor,
            abil,
            attack_tag: AttackTag::None,
            icd_tag: IcdTag::None,
            icd_group: IcdGroup::Default,
            element: Element::Physical,
            durability: 0.0,
            mult: 1.0,
        }
    }

    pub fn tag(mut self, attack_tag: AttackTag) -> Self {
        self.attack_tag = attack_tag;
        self
    }

    pub fn icd(mut self, icd_tag: IcdTag, icd_group: IcdGroup) -> Self {
        self.icd_tag = icd_tag;
        self.icd_group = icd_group;
        self
    }

    pub fn element(mut self, element: Element, durability: f64) -> Self {
        self.element = element;
        self.durability = durability;
        self
    }

    pub fn mult(mut self, mult: f64) -> Self {
        self.mult = mult;
        self
    }
}

/// Area an attack covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackPattern {
    Circle { center: Position, radius: f64 },
    /// Axis-aligned rectangle centred on `center`.
    Rectangle {
        center: Position,
        width: f64,
        height: f64,
    },
    Single(TargetId),
}

impl AttackPattern {
    pub fn circle(center: Position, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    pub fn rectangle(center: Position, width: f64, height: f64) -> Self {
        Self::Rectangle {
            center,
            width,
            height,
        }
    }

    pub fn single(target: TargetId) -> Self {
        Self::Single(target)
    }
}

/// Outcome of one attack instance on one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    pub target: TargetId,
    pub damage: f64,
    pub crit: bool,
    /// False when ICD suppressed the element.
    pub applied: bool,
}

/// What a callback sees when it fires.
pub struct CallbackContext<'a> {
    pub info: &'a AttackInfo,
    pub resolved_at: Frame,
    /// Every hit for [`CallbackMode::Once`]; the single current hit for
    /// [`CallbackMode::PerTarget`].
    pub hits: &'a [HitResult],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackMode {
    /// Once per resolved attack instance that hit anything.
    Once,
    /// Once per target hit.
    PerTarget,
}

/// Shared fire counter with a cap.
///
/// Clones share the counter, so one limit handed to several queued attacks
/// caps their callbacks together, e.g. one particle per skill cast across
/// all of its hits.
#[derive(Clone, Debug)]
pub struct ProcLimit {
    fired: Rc<Cell<u32>>,
    cap: u32,
}

impl ProcLimit {
    pub fn new(cap: u32) -> Self {
        Self {
            fired: Rc::new(Cell::new(0)),
            cap,
        }
    }

    pub fn once() -> Self {
        Self::new(1)
    }

    /// Counts one fire if the cap allows it.
    pub fn try_fire(&self) -> bool {
        let fired = self.fired.get();
        if fired >= self.cap {
            return false;
        }
        self.fired.set(fired + 1);
        true
    }

    pub fn fired(&self) -> u32 {
        self.fired.get()
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn is_exhausted(&self) -> bool {
        self.fired.get() >= self.cap
    }
}

pub type CallbackFn = Rc<dyn Fn(&mut Simulation, &CallbackContext<'_>)>;

/// Reaction callback bound to a queued attack.
#[derive(Clone)]
pub struct AttackCallback {
    pub mode: CallbackMode,
    pub limit: Option<ProcLimit>,
    func: CallbackFn,
}

impl AttackCallback {
    pub fn once(func: impl Fn(&mut Simulation, &CallbackContext<'_>) + 'static) -> Self {
        Self {
            mode: CallbackMode::Once,
            limit: None,
            func: Rc::new(func),
        }
    }

    pub fn per_target(func: impl Fn(&mut Simulation, &CallbackContext<'_>) + 'static) -> Self {
        Self {
            mode: CallbackMode::PerTarget,
            limit: None,
            func: Rc::new(func),
        }
    }

    pub fn with_limit(mut self, limit: ProcLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn fire(&self, sim: &mut Simulation, ctx: &CallbackContext<'_>) {
        if let Some(limit) = &self.limit
            && !limit.try_fire()
        {
            return;
        }
        (self.func)(sim, ctx);
    }
}

impl fmt::Debug for AttackCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttackCallback")
            .field("mode", &self.mode)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// An attack waiting for its resolution frame.
#[derive(Debug)]
pub struct QueuedAttack {
    pub info: AttackInfo,
    pub snapshot: Snapshot,
    pub pattern: AttackPattern,
    pub resolve_at: Frame,
    pub callbacks: Vec<AttackCallback>,
}
