//! Keyed collection of effects that expire at a frame.
//!
//! Shared storage for statuses and modifiers. Entries are kept in insertion
//! order; replacing an existing key keeps its slot so iteration order stays
//! stable across refreshes.

use super::common::{Frame, Key};

/// An effect identified by key that stops applying at `expiry`.
pub trait Timed {
    fn key(&self) -> Key;

    /// First frame at which the effect no longer applies.
    fn expiry(&self) -> Frame;

    /// Active while `now < expiry`.
    fn is_active_at(&self, now: Frame) -> bool {
        now < self.expiry()
    }
}

#[derive(Clone, Debug)]
pub struct TimedSet<T> {
    items: Vec<T>,
}

impl<T> Default for TimedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Timed> TimedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, replacing any entry with the same key in place.
    ///
    /// Returns the replaced entry.
    pub fn insert(&mut self, item: T) -> Option<T> {
        match self.items.iter_mut().find(|e| e.key() == item.key()) {
            Some(slot) => Some(std::mem::replace(slot, item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    /// Returns the entry for `key`, active or not.
    pub fn get(&self, key: Key) -> Option<&T> {
        self.items.iter().find(|e| e.key() == key)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.items.iter_mut().find(|e| e.key() == key)
    }

    /// Returns the entry for `key` if it is active at `now`.
    pub fn active(&self, key: Key, now: Frame) -> Option<&T> {
        self.get(key).filter(|e| e.is_active_at(now))
    }

    pub fn remove(&mut self, key: Key) -> Option<T> {
        let pos = self.items.iter().position(|e| e.key() == key)?;
        Some(self.items.remove(pos))
    }

    /// Removes the entry for `key` if it has expired at `now` but has not
    /// been pruned yet.
    pub fn take_lapsed(&mut self, key: Key, now: Frame) -> Option<T> {
        let pos = self
            .items
            .iter()
            .position(|e| e.key() == key && !e.is_active_at(now))?;
        Some(self.items.remove(pos))
    }

    /// Removes every entry whose expiry is at or before `now`.
    ///
    /// Returns the removed entries in insertion order.
    pub fn expire(&mut self, now: Frame) -> Vec<T> {
        if !self.items.iter().any(|e| !e.is_active_at(now)) {
            return Vec::new();
        }
        let (expired, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|e| !e.is_active_at(now));
        self.items = kept;
        expired
    }

    /// Iterates over entries active at `now`.
    pub fn iter_active(&self, now: Frame) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().filter(move |e| e.is_active_at(now))
    }

    /// Iterates over all entries, including ones awaiting expiry.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
