//! Per-owner simulation state: identifiers, statuses and cooldowns.

pub mod common;
pub mod cooldown;
pub mod status;
pub mod timed;

pub use common::{CharIndex, Frame, Key, Position, TargetId};
pub use cooldown::CooldownTracker;
pub use status::{RefreshPolicy, Status, StatusStack};
pub use timed::{Timed, TimedSet};
