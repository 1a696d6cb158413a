//! Character stats: kinds, vectors, timed modifiers and snapshots.
//!
//! Stats are resolved as `base + Σ active modifiers`. Snapshots freeze that
//! sum at attack-queue time.

pub mod kinds;
pub mod modifiers;
pub mod snapshot;

pub use kinds::{Element, StatKind, StatSet, StatVector};
pub use modifiers::{AmountContext, AmountFn, ModifierStack, StatMod};
pub use snapshot::Snapshot;
