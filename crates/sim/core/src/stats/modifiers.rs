//! Timed stat modifiers.
//!
//! A modifier contributes a [`StatVector`] to the stats in its `affected`
//! set until it expires. Contributions come from an amount function that is
//! evaluated on every query, never cached: its inputs (energy, statuses,
//! other stats) may change between two queries in the same frame.

use std::fmt;
use std::rc::Rc;

use super::kinds::{StatKind, StatSet, StatVector};
use crate::state::{Frame, Key, StatusStack, Timed, TimedSet};

/// Read-only view of the owner handed to amount functions.
pub struct AmountContext<'a> {
    pub now: Frame,
    /// Owner's base stats, without any modifier applied.
    pub base: &'a StatVector,
    pub statuses: &'a StatusStack,
    pub energy: f64,
    pub energy_max: f64,
}

/// Produces a modifier's contribution, or `None` while it should not apply.
pub type AmountFn = Rc<dyn Fn(&AmountContext<'_>) -> Option<StatVector>>;

#[derive(Clone)]
pub struct StatMod {
    pub key: Key,
    /// Frames the modifier lasts; `u64::MAX` for permanent.
    pub duration: u64,
    pub affected: StatSet,
    pub amount: AmountFn,
    /// Set when the modifier is attached.
    pub expires_at: Frame,
}

impl StatMod {
    pub fn new(
        key: Key,
        duration: u64,
        affected: StatSet,
        amount: impl Fn(&AmountContext<'_>) -> Option<StatVector> + 'static,
    ) -> Self {
        Self {
            key,
            duration,
            affected,
            amount: Rc::new(amount),
            expires_at: Frame::NEVER,
        }
    }

    /// Modifier with a constant contribution.
    pub fn constant(key: Key, duration: u64, affected: StatSet, value: StatVector) -> Self {
        Self::new(key, duration, affected, move |_| Some(value))
    }

    /// Modifier that never expires.
    pub fn permanent(
        key: Key,
        affected: StatSet,
        amount: impl Fn(&AmountContext<'_>) -> Option<StatVector> + 'static,
    ) -> Self {
        Self::new(key, u64::MAX, affected, amount)
    }
}

impl Timed for StatMod {
    fn key(&self) -> Key {
        self.key
    }

    fn expiry(&self) -> Frame {
        self.expires_at
    }
}

impl fmt::Debug for StatMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatMod")
            .field("key", &self.key)
            .field("duration", &self.duration)
            .field("affected", &self.affected)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Modifiers attached to one character. Distinct keys coexist and sum; the
/// same key replaces the earlier modifier.
#[derive(Clone, Debug, Default)]
pub struct ModifierStack {
    mods: TimedSet<StatMod>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `modifier` at `now`, computing its expiry from its duration.
    pub fn add(&mut self, mut modifier: StatMod, now: Frame) -> Frame {
        modifier.expires_at = now + modifier.duration;
        let expiry = modifier.expires_at;
        self.mods.insert(modifier);
        expiry
    }

    /// Removes a modifier immediately, including one that expired this
    /// frame but has not been pruned.
    pub fn remove(&mut self, key: Key) -> Option<StatMod> {
        self.mods.remove(key)
    }

    /// Removes `key` if it expired at `now` and is still awaiting the
    /// expiry phase.
    pub fn take_lapsed(&mut self, key: Key, now: Frame) -> Option<StatMod> {
        self.mods.take_lapsed(key, now)
    }

    pub fn is_active(&self, key: Key, now: Frame) -> bool {
        self.mods.active(key, now).is_some()
    }

    pub fn expires_at(&self, key: Key, now: Frame) -> Option<Frame> {
        self.mods.active(key, now).map(|m| m.expires_at)
    }

    /// Sum of every active modifier's contribution to `kind`.
    pub fn query(&self, kind: StatKind, ctx: &AmountContext<'_>) -> f64 {
        let bit = StatSet::from(kind);
        self.mods
            .iter_active(ctx.now)
            .filter(|m| m.affected.contains(bit))
            .filter_map(|m| (m.amount)(ctx))
            .map(|v| v[kind])
            .sum()
    }

    /// Sum of every active modifier's contribution, masked by its affected set.
    pub fn totals(&self, ctx: &AmountContext<'_>) -> StatVector {
        let mut total = StatVector::ZERO;
        for m in self.mods.iter_active(ctx.now) {
            if let Some(v) = (m.amount)(ctx) {
                total.add_masked(&v, m.affected);
            }
        }
        total
    }

    /// Removes all modifiers expired at `now` and returns their keys.
    pub fn expire(&mut self, now: Frame) -> Vec<Key> {
        self.mods.expire(now).into_iter().map(|m| m.key).collect()
    }

    pub fn active_keys(&self, now: Frame) -> impl Iterator<Item = Key> + '_ {
        self.mods.iter_active(now).map(|m| m.key)
    }
}
