//! Time-ordered task scheduler.
//!
//! Uses a `BinaryHeap` with reversed `Ord` on `Task` to act as a
//! min-heap keyed by `(due, seq)`. Sequence numbers are strictly
//! increasing, so tasks due at the same time come out in the order they
//! were scheduled.
//!
//! The scheduler also owns the simulation clock. Only the control loop
//! moves it forward, through [`Scheduler::advance_to`].

use std::collections::BinaryHeap;

use tracing::trace;

use crate::entity::EntityId;
use crate::error::{SimError, SimResult};
use crate::task::{SeqGen, Task, TaskSeq};
use crate::time::SimTime;

/// The pending list plus the clock.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    /// Min-heap (via reversed Ord on Task).
    queue: BinaryHeap<Task<K>>,

    /// Monotonic insertion-sequence generator.
    seq_gen: SeqGen,

    /// Current simulation time.
    now: SimTime,
}

impl<K: std::fmt::Debug> Scheduler<K> {
    /// Create an empty scheduler with the clock at zero.
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            seq_gen: SeqGen::new(),
            now: SimTime::ZERO,
        }
    }

    /// Current simulation time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `kind` to run `delay` after the current time.
    ///
    /// # Panics
    /// Panics if `delay` is negative, NaN or infinite. Use
    /// [`try_schedule`](Self::try_schedule) to get an error instead.
    pub fn schedule(&mut self, delay: f64, kind: K, entity: Option<EntityId>) -> TaskSeq {
        match self.try_schedule(delay, kind, entity) {
            Ok(seq) => seq,
            Err(e) => panic!("{}", e),
        }
    }

    /// Schedule `kind` to run `delay` after the current time, rejecting
    /// delays that would put the task in the past.
    pub fn try_schedule(
        &mut self,
        delay: f64,
        kind: K,
        entity: Option<EntityId>,
    ) -> SimResult<TaskSeq> {
        if !(delay >= 0.0 && delay.is_finite()) {
            return Err(SimError::InvalidDelay {
                delay,
                now: self.now.as_f64(),
            });
        }
        let due = self.now.plus(delay);
        Ok(self.schedule_at(due, kind, entity))
    }

    /// Schedule `kind` at an absolute time.
    ///
    /// Callers are expected to pass `due >= now()`; the control loop only
    /// uses this for the bootstrap task at time zero.
    pub fn schedule_at(&mut self, due: SimTime, kind: K, entity: Option<EntityId>) -> TaskSeq {
        let seq = self.seq_gen.next_seq();
        trace!(%seq, %due, ?kind, ?entity, "task scheduled");
        self.queue.push(Task::new(seq, due, kind, entity));
        seq
    }

    /// Remove and return the earliest task (lowest `seq` among ties).
    ///
    /// Returns [`SimError::SchedulerEmpty`] when nothing is pending.
    pub fn pull_earliest(&mut self) -> SimResult<Task<K>> {
        self.queue.pop().ok_or(SimError::SchedulerEmpty)
    }

    /// Peek at the earliest task without removing it.
    pub fn peek_next(&self) -> Option<&Task<K>> {
        self.queue.peek()
    }

    /// Move the clock to `to`.
    ///
    /// # Panics
    /// Panics if `to` is before the current time: the clock never runs
    /// backward.
    pub(crate) fn advance_to(&mut self, to: SimTime) {
        assert!(
            to >= self.now,
            "Time went backward! current={}, task={}",
            self.now,
            to
        );
        self.now = to;
    }

    /// Returns `true` if no tasks are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The sequence number the next scheduled task will receive.
    pub fn next_seq(&self) -> TaskSeq {
        self.seq_gen.peek()
    }

    /// Drop every pending task. The clock is left where it is.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Drain all pending tasks in dispatch order into a `Vec`.
    pub fn drain_ordered(&mut self) -> Vec<Task<K>> {
        let mut tasks = Vec::with_capacity(self.queue.len());
        while let Some(t) = self.queue.pop() {
            tasks.push(t);
        }
        tasks
    }
}

impl<K: std::fmt::Debug> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
