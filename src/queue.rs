//! FIFO wait queue of entity ids.
//!
//! A building block for a model's *resources* block: customers waiting
//! for a server, jobs waiting for a machine. Insert at the tail, pull
//! from the head, no capacity bound.

use std::collections::VecDeque;

use crate::entity::EntityId;

/// An unbounded first-in first-out queue of [`EntityId`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitQueue {
    ids: VecDeque<EntityId>,
}

impl WaitQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        WaitQueue {
            ids: VecDeque::new(),
        }
    }

    /// Append `id` at the tail.
    pub fn insert(&mut self, id: EntityId) {
        self.ids.push_back(id);
    }

    /// Take the id at the head. `None` if the queue is empty.
    pub fn pull(&mut self) -> Option<EntityId> {
        self.ids.pop_front()
    }

    /// The id at the head, without removing it.
    pub fn peek(&self) -> Option<EntityId> {
        self.ids.front().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget every waiting id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Waiting ids, head first.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }
}
