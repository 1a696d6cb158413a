//! Timed boolean statuses.
//!
//! A status is active while `now < expiry`. Expired statuses are pruned by the
//! engine's expiry phase; until then they read as inactive, so a status never
//! lingers past its expiry frame even within the frame it expires.

use super::common::{Frame, Key};
use super::timed::{Timed, TimedSet};

/// What happens when a status is applied while it is still active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefreshPolicy {
    /// Keep the later of the current and the new expiry.
    #[default]
    Extend,

    /// Replace the expiry with the new one, even if it is earlier.
    Restart,

    /// Add one stack (capped at `max`) and restart the expiry.
    Stack { max: u32 },
}

/// A single status with its expiry frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Status {
    pub key: Key,
    /// Frame at which this status expires.
    pub expires_at: Frame,
    /// Counted stacks; 1 unless applied with [`RefreshPolicy::Stack`].
    pub stacks: u32,
    /// Policy of the most recent application.
    pub policy: RefreshPolicy,
}

impl Timed for Status {
    fn key(&self) -> Key {
        self.key
    }

    fn expiry(&self) -> Frame {
        self.expires_at
    }
}

/// Active statuses on a character or target.
#[derive(Clone, Debug, Default)]
pub struct StatusStack {
    statuses: TimedSet<Status>,
}

impl StatusStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `key` for `duration` frames starting at `now`.
    ///
    /// A key that is absent or no longer active is (re)created with one
    /// stack. An active key follows `policy`. Returns the resulting status.
    pub fn add(&mut self, key: Key, duration: u64, policy: RefreshPolicy, now: Frame) -> Status {
        let expires_at = now + duration;

        if let Some(existing) = self.statuses.get_mut(key)
            && existing.is_active_at(now)
        {
            match policy {
                RefreshPolicy::Extend => {
                    existing.expires_at = existing.expires_at.max(expires_at);
                }
                RefreshPolicy::Restart => {
                    existing.expires_at = expires_at;
                }
                RefreshPolicy::Stack { max } => {
                    existing.stacks = (existing.stacks + 1).min(max.max(1));
                    existing.expires_at = expires_at;
                }
            }
            existing.policy = policy;
            return *existing;
        }

        let status = Status {
            key,
            expires_at,
            stacks: 1,
            policy,
        };
        self.statuses.insert(status);
        status
    }

    /// Removes a status immediately, whether or not it is still active.
    ///
    /// An entry that expired this frame but has not been pruned is returned
    /// too; the caller owes its removal the same as the expiry phase would.
    pub fn remove(&mut self, key: Key) -> Option<Status> {
        self.statuses.remove(key)
    }

    /// Removes `key` if it expired at `now` and is still awaiting the
    /// expiry phase.
    pub fn take_lapsed(&mut self, key: Key, now: Frame) -> Option<Status> {
        self.statuses.take_lapsed(key, now)
    }

    /// Checks if `key` is active at `now`.
    pub fn is_active(&self, key: Key, now: Frame) -> bool {
        self.statuses.active(key, now).is_some()
    }

    /// Gets the expiry of an active status.
    pub fn expires_at(&self, key: Key, now: Frame) -> Option<Frame> {
        self.statuses.active(key, now).map(|s| s.expires_at)
    }

    /// Frames left on an active status, zero when inactive.
    pub fn remaining(&self, key: Key, now: Frame) -> u64 {
        self.expires_at(key, now)
            .map(|expiry| expiry.since(now))
            .unwrap_or(0)
    }

    /// Stack count of an active status, zero when inactive.
    pub fn stacks(&self, key: Key, now: Frame) -> u32 {
        self.statuses.active(key, now).map(|s| s.stacks).unwrap_or(0)
    }

    /// Removes all statuses expired at `now` and returns them.
    pub fn expire(&mut self, now: Frame) -> Vec<Status> {
        self.statuses.expire(now)
    }

    /// Returns an iterator over all statuses active at `now`.
    pub fn active_at(&self, now: Frame) -> impl Iterator<Item = &Status> + '_ {
        self.statuses.iter_active(now)
    }

    /// Returns true if no status is active at `now`.
    pub fn is_empty_at(&self, now: Frame) -> bool {
        self.active_at(now).next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_active_until_expiry_frame() {
        let mut stack = StatusStack::new();
        stack.add("burning", 10, RefreshPolicy::Extend, Frame(0));

        assert!(stack.is_active("burning", Frame(9)));
        assert!(!stack.is_active("burning", Frame(10)));
        assert_eq!(stack.remaining("burning", Frame(4)), 6);
    }

    #[test]
    fn extend_keeps_later_expiry() {
        let mut stack = StatusStack::new();
        stack.add("buff", 100, RefreshPolicy::Extend, Frame(0));
        let status = stack.add("buff", 30, RefreshPolicy::Extend, Frame(20));

        // max(0 + 100, 20 + 30)
        assert_eq!(status.expires_at, Frame(100));

        let status = stack.add("buff", 200, RefreshPolicy::Extend, Frame(50));
        assert_eq!(status.expires_at, Frame(250));
    }

    #[test]
    fn restart_replaces_expiry() {
        let mut stack = StatusStack::new();
        stack.add("buff", 100, RefreshPolicy::Restart, Frame(0));
        let status = stack.add("buff", 30, RefreshPolicy::Restart, Frame(20));

        assert_eq!(status.expires_at, Frame(50));
        assert!(!stack.is_active("buff", Frame(50)));
    }

    #[test]
    fn stacking_counts_and_caps() {
        let mut stack = StatusStack::new();
        let policy = RefreshPolicy::Stack { max: 3 };
        for frame in 0..5 {
            stack.add("stacks", 60, policy, Frame(frame));
        }

        assert_eq!(stack.stacks("stacks", Frame(10)), 3);
        assert_eq!(stack.expires_at("stacks", Frame(10)), Some(Frame(64)));
    }

    #[test]
    fn reapplying_after_expiry_starts_fresh() {
        let mut stack = StatusStack::new();
        let policy = RefreshPolicy::Stack { max: 5 };
        stack.add("stacks", 10, policy, Frame(0));
        stack.add("stacks", 10, policy, Frame(5));

        // Expired but not yet pruned: treated as absent.
        let status = stack.add("stacks", 10, policy, Frame(20));
        assert_eq!(status.stacks, 1);
        assert_eq!(status.expires_at, Frame(30));
    }

    #[test]
    fn expire_prunes_only_expired() {
        let mut stack = StatusStack::new();
        stack.add("short", 5, RefreshPolicy::Extend, Frame(0));
        stack.add("long", 50, RefreshPolicy::Extend, Frame(0));

        let removed = stack.expire(Frame(5));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].key, "short");
        assert!(stack.is_active("long", Frame(5)));
    }

    #[test]
    fn permanent_status_never_expires() {
        let mut stack = StatusStack::new();
        stack.add("forever", u64::MAX, RefreshPolicy::Extend, Frame(10));

        assert_eq!(stack.expires_at("forever", Frame(10)), Some(Frame::NEVER));
        assert!(stack.expire(Frame(1_000_000)).is_empty());
    }

    #[test]
    fn remove_returns_the_entry_once() {
        let mut stack = StatusStack::new();
        stack.add("buff", 10, RefreshPolicy::Extend, Frame(0));

        assert!(stack.remove("buff").is_some_and(|s| s.is_active_at(Frame(3))));
        assert!(stack.remove("buff").is_none());
    }

    #[test]
    fn lapsed_entries_are_taken_only_after_expiry() {
        let mut stack = StatusStack::new();
        stack.add("buff", 10, RefreshPolicy::Extend, Frame(0));

        assert!(stack.take_lapsed("buff", Frame(9)).is_none());
        let lapsed = stack.take_lapsed("buff", Frame(10));
        assert_eq!(lapsed.map(|s| s.expires_at), Some(Frame(10)));
        assert!(stack.expire(Frame(10)).is_empty());
    }
}
