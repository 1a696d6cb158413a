//! Delayed-task scheduler.
//!
//! Tasks are closures run against the simulation at an absolute frame. There
//! is no cancellation: a task that may become irrelevant checks its own
//! precondition (owner alive, status still active) when it runs.

use super::Simulation;
use super::queue::FrameQueue;
use crate::state::Frame;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce(&mut Simulation)>;

#[derive(Default)]
pub struct TaskQueue {
    queue: FrameQueue<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, at: Frame, task: Task) {
        self.queue.push(at, task);
    }

    pub(crate) fn take_due(&mut self, now: Frame) -> Vec<Task> {
        self.queue.take_due(now)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_due(&self) -> Option<Frame> {
        self.queue.next_due()
    }
}

/// Absolute frame a task scheduled at `now` with `delay` runs at.
///
/// A delay of zero means the very next frame, never the current one.
pub(crate) fn target_frame(now: Frame, delay: u64) -> Frame {
    now + delay.max(1)
}
