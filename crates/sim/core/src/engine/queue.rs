//! Frame-keyed FIFO queues backing the task scheduler and the attack pipeline.

use std::collections::BTreeMap;

use crate::state::Frame;

/// Items keyed by the frame they become due, FIFO within a frame.
pub struct FrameQueue<T> {
    slots: BTreeMap<Frame, Vec<T>>,
    len: usize,
}

impl<T> Default for FrameQueue<T> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T> FrameQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Frame, item: T) {
        self.slots.entry(at).or_default().push(item);
        self.len += 1;
    }

    /// Removes and returns every item due at or before `now`, ordered by
    /// frame and then by insertion.
    ///
    /// Items pushed while the returned batch is being processed are not part
    /// of it.
    pub fn take_due(&mut self, now: Frame) -> Vec<T> {
        let Some((&first, _)) = self.slots.first_key_value() else {
            return Vec::new();
        };
        if first > now {
            return Vec::new();
        }

        let later = self.slots.split_off(&now.next());
        let due = std::mem::replace(&mut self.slots, later);
        let items: Vec<T> = due.into_values().flatten().collect();
        self.len -= items.len();
        items
    }

    /// Frame of the earliest pending item.
    pub fn next_due(&self) -> Option<Frame> {
        self.slots.first_key_value().map(|(frame, _)| *frame)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_items_come_out_in_frame_then_fifo_order() {
        let mut q = FrameQueue::new();
        q.push(Frame(5), "b1");
        q.push(Frame(3), "a1");
        q.push(Frame(5), "b2");
        q.push(Frame(3), "a2");
        q.push(Frame(9), "c");

        assert_eq!(q.take_due(Frame(2)), Vec::<&str>::new());
        assert_eq!(q.take_due(Frame(5)), vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(Frame(9)));
    }

    #[test]
    fn take_due_on_empty_queue() {
        let mut q: FrameQueue<u32> = FrameQueue::new();
        assert!(q.take_due(Frame(100)).is_empty());
        assert!(q.is_empty());
    }
}
