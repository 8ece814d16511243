//! Scheduled tasks for the simulation kernel.
//!
//! A `Task` is a pending dispatch: "at time `due`, run the handler for
//! `kind`, optionally on behalf of `entity`". Tasks sit in the
//! scheduler's heap and are consumed exactly once.

use std::cmp::Ordering;

use crate::entity::EntityId;
use crate::time::SimTime;

// ── Task sequence number ─────────────────────────────────────────────

/// Strictly-increasing insertion sequence number.
///
/// Two tasks due at the same `SimTime` are dispatched in ascending
/// `TaskSeq` order, which is the order they were scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSeq(u64);

impl TaskSeq {
    /// Wrap a raw u64 into a `TaskSeq`.
    #[inline]
    pub fn new(raw: u64) -> Self {
        TaskSeq(raw)
    }

    /// Return the raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Sequence generator ───────────────────────────────────────────────

/// Mints `TaskSeq` values. Each scheduler owns one.
#[derive(Debug, Clone, Default)]
pub struct SeqGen {
    next: u64,
}

impl SeqGen {
    /// Create a generator starting at 0.
    pub fn new() -> Self {
        SeqGen { next: 0 }
    }

    /// Mint the next sequence number.
    pub fn next_seq(&mut self) -> TaskSeq {
        let seq = TaskSeq(self.next);
        self.next += 1;
        seq
    }

    /// Peek at the next sequence number without consuming it.
    pub fn peek(&self) -> TaskSeq {
        TaskSeq(self.next)
    }
}

// ── Task ──────────────────────────────────────────────────────────────

/// A single scheduled task.
#[derive(Debug, Clone)]
pub struct Task<K> {
    /// Insertion sequence, used as the tie-break.
    pub seq: TaskSeq,

    /// The simulation time at which the task is dispatched.
    pub due: SimTime,

    /// Which handler runs it.
    pub kind: K,

    /// The entity the handler acts on, if any.
    pub entity: Option<EntityId>,
}

impl<K> Task<K> {
    /// Convenience constructor.
    pub fn new(seq: TaskSeq, due: SimTime, kind: K, entity: Option<EntityId>) -> Self {
        Task {
            seq,
            due,
            kind,
            entity,
        }
    }
}

// Ordering only looks at `(due, seq)`; `seq` is unique per scheduler,
// so the payload never has to be compared.
impl<K> PartialEq for Task<K> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<K> Eq for Task<K> {}

/// Ordering: smallest `(due, seq)` first.
///
/// `BinaryHeap` is a max-heap, so the natural ordering is reversed here
/// to make it pop the earliest task.
impl<K> Ord for Task<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K> PartialOrd for Task<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
