use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

use crate::error::LockError;
use crate::types::LockState;

struct QueueState<J> {
    items: VecDeque<J>,
    phase: LockState,
}

/// FIFO of pending jobs feeding a single consumer.
///
/// The queue also carries the lifecycle phase of its owner so that "closed"
/// and "empty" are observed under the same mutex the consumer waits on.
pub struct WorkQueue<J> {
    state: Mutex<QueueState<J>>,
    ready: Condvar,
}

impl<J> WorkQueue<J> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                phase: LockState::Running,
            }),
            ready: Condvar::new(),
        }
    }

    /// Appends a job. Refused once the queue has been closed.
    pub fn push(&self, item: J) -> Result<(), LockError> {
        let mut state = self.state.lock();
        if state.phase != LockState::Running {
            return Err(LockError::ShutDown);
        }
        state.items.push_back(item);
        drop(state);

        self.ready.notify_one();
        Ok(())
    }

    /// Blocks until a job is available and returns the oldest one.
    /// Returns `None` once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<J> {
        let mut state = self.state.lock();
        while state.items.is_empty() && state.phase == LockState::Running {
            self.ready.wait(&mut state);
        }
        state.items.pop_front()
    }

    /// Stops accepting jobs. Returns true on the first call only.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        let first = state.phase == LockState::Running;
        if first {
            state.phase = LockState::Draining;
        }
        drop(state);

        self.ready.notify_all();
        first
    }

    /// Marks the consumer as gone. Jobs still queued are dropped.
    pub fn mark_stopped(&self) {
        let mut state = self.state.lock();
        state.phase = LockState::Stopped;
        state.items.clear();
    }

    pub fn phase(&self) -> LockState {
        self.state.lock().phase
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<J> Default for WorkQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}
