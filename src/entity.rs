//! Entity ids and the entity registry.
//!
//! Entities are the objects that flow through a model (customers, jobs,
//! packets). Handlers create them with [`EntityRegistry::insert`] and
//! drop them with [`EntityRegistry::remove`]; tasks and wait queues
//! refer to them by [`EntityId`] only.

use std::collections::BTreeMap;

use tracing::trace;

/// A unique identifier for a simulated entity.
///
/// A newtype around `u64` so ids cannot be mixed up with task sequence
/// numbers or plain counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(u64);

impl EntityId {
    /// Create an entity id from a raw integer.
    #[inline]
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Return the underlying integer.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Owns every live entity and mints their ids.
///
/// The id counter belongs to the registry: it starts at zero when the
/// registry is built, only ever goes up, and is never rewound by
/// `remove` or `clear`. Two registries never share a counter.
#[derive(Debug, Clone)]
pub struct EntityRegistry<P> {
    entities: BTreeMap<EntityId, P>,
    next_id: u64,
}

impl<P> EntityRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        EntityRegistry {
            entities: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Store `payload` under a fresh id and return the id.
    pub fn insert(&mut self, payload: P) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, payload);
        trace!(%id, live = self.entities.len(), "entity created");
        id
    }

    /// Look up an entity's payload. `None` if it is not (or no longer)
    /// registered.
    pub fn get(&self, id: EntityId) -> Option<&P> {
        self.entities.get(&id)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut P> {
        self.entities.get_mut(&id)
    }

    /// Remove an entity and hand back its payload.
    ///
    /// Removing an id that is not registered does nothing and returns
    /// `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<P> {
        let removed = self.entities.remove(&id);
        if removed.is_some() {
            trace!(%id, live = self.entities.len(), "entity removed");
        }
        removed
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Drop every remaining entity.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are live.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live ids in ascending (creation) order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// The id the next `insert` will return.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next_id)
    }
}

impl<P> Default for EntityRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
