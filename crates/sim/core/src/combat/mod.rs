//! Attack resolution: shapes, ICD gating, damage and reaction callbacks.

mod attack;
mod damage;
mod icd;
mod pipeline;
mod target;

pub use attack::{
    AttackCallback, AttackInfo, AttackPattern, AttackTag, CallbackContext, CallbackFn,
    CallbackMode, HitResult, ProcLimit, QueuedAttack,
};
pub use damage::{calculate_damage, defense_multiplier, resistance_multiplier};
pub use icd::{IcdGroup, IcdPolicy, IcdTable, IcdTag, IcdTracker};
pub use target::{Aura, ResistMod, Target};

use crate::engine::queue::FrameQueue;

/// Combat state owned by one simulation.
pub(crate) struct CombatState {
    pub(crate) pending: FrameQueue<QueuedAttack>,
    pub(crate) targets: Vec<Target>,
    pub(crate) icd: IcdTracker,
    pub(crate) icd_table: IcdTable,
}

impl CombatState {
    pub(crate) fn new(targets: Vec<Target>, icd_table: IcdTable) -> Self {
        Self {
            pending: FrameQueue::new(),
            targets,
            icd: IcdTracker::new(),
            icd_table,
        }
    }
}
