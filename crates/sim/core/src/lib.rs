//! Frame-accurate combat simulation kernel.
//!
//! `sim-core` owns the parts of a party-combat simulation that decide *when*
//! things happen: the frame clock and task scheduler, the event bus, the
//! attack resolution pipeline with internal cooldowns, the status and stat
//! modifier stacks, cooldown tracking and energy. Character kits (see
//! [`action::CharacterKit`]) describe *what* a character does and drive the
//! kernel through [`engine::Simulation`].
//!
//! Every trial owns an independent [`engine::Simulation`]; nothing here is a
//! process-wide singleton, so whole trials can run in parallel.
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod party;
pub mod state;
pub mod stats;
pub mod trial;

pub use action::{ActionInfo, ActionParams, ActionSlot, CharacterKit};
pub use combat::{
    AttackCallback, AttackInfo, AttackPattern, AttackTag, CallbackContext, CallbackMode,
    HitResult, IcdGroup, IcdPolicy, IcdTable, IcdTag, ProcLimit, ResistMod, Target,
};
pub use config::SimConfig;
pub use engine::{Simulation, SimulationBuilder};
pub use env::{SimRng, trial_seed};
pub use error::{BuildError, ErrorSeverity, SimError};
pub use events::{Event, EventArg, EventBus, EventTag, Owner};
pub use party::{Character, CharacterProfile, Party, Talents};
pub use state::{
    CharIndex, CooldownTracker, Frame, Key, Position, RefreshPolicy, Status, StatusStack, TargetId,
};
pub use stats::{
    AmountContext, Element, ModifierStack, Snapshot, StatKind, StatMod, StatSet, StatVector,
};
pub use trial::{ActionStep, Trial, TrialLimits, TrialResult, TrialSource};
