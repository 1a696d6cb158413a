//! Per-character action cooldowns.
//!
//! Each slot stores a single ready frame. Cooldowns are never paused; they
//! are started, shortened, or left to run out.

use strum::EnumCount;

use super::common::Frame;
use crate::action::ActionSlot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooldownTracker {
    ready_at: [Frame; ActionSlot::COUNT],
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self {
            ready_at: [Frame::ZERO; ActionSlot::COUNT],
        }
    }
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cooldown of `duration` frames that begins `delay` frames from `now`.
    ///
    /// The slot is unavailable from `now` on; the delay only postpones the
    /// visible start of the countdown.
    pub fn start(&mut self, slot: ActionSlot, duration: u64, delay: u64, now: Frame) -> Frame {
        let ready = now + delay + duration;
        self.ready_at[slot as usize] = ready;
        ready
    }

    /// Shortens the remaining cooldown by `delta` frames, flooring at `now`.
    ///
    /// Returns the new ready frame, or `None` if the slot was already ready
    /// (reductions on an inactive cooldown have no effect).
    pub fn reduce(&mut self, slot: ActionSlot, delta: u64, now: Frame) -> Option<Frame> {
        let current = self.ready_at[slot as usize];
        if current <= now {
            return None;
        }
        let reduced = (current - delta).max(now);
        self.ready_at[slot as usize] = reduced;
        Some(reduced)
    }

    /// Clears a cooldown so the slot is ready at `now`.
    pub fn reset(&mut self, slot: ActionSlot, now: Frame) {
        let ready = &mut self.ready_at[slot as usize];
        *ready = (*ready).min(now);
    }

    pub fn is_ready(&self, slot: ActionSlot, now: Frame) -> bool {
        now >= self.ready_at[slot as usize]
    }

    pub fn ready_at(&self, slot: ActionSlot) -> Frame {
        self.ready_at[slot as usize]
    }

    /// Frames until the slot is ready, zero when it already is.
    pub fn remaining(&self, slot: ActionSlot, now: Frame) -> u64 {
        self.ready_at[slot as usize].since(now)
    }
}
