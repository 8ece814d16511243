//! Event kinds, handlers and the dispatch table.
//!
//! | Item | Role |
//! |---|---|
//! | [`EventKind`] | tag type a model uses to name its events |
//! | [`EventHandler`] | code that runs when a task of one kind is due |
//! | [`DispatchTable`] | kind → handler map, filled before the run |

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::entity::EntityId;
use crate::error::{SimError, SimResult};
use crate::simulation::{Model, SimulationContext};

// ── EventKind ─────────────────────────────────────────────────────────

/// A tag naming one kind of event in a model, usually a fieldless enum.
///
/// `ALL` lists every kind the model may schedule. `Simulation::start`
/// refuses to run unless each of them has a handler, so a missing
/// registration shows up before the first dispatch instead of halfway
/// through a run.
///
/// # Example
///
/// ```rust
/// use selene::EventKind;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Shop { Open, Arrival, Close }
///
/// impl EventKind for Shop {
///     const ALL: &'static [Self] = &[Shop::Open, Shop::Arrival, Shop::Close];
/// }
/// ```
pub trait EventKind: Copy + Eq + Hash + Debug + 'static {
    /// Every kind the model uses.
    const ALL: &'static [Self];
}

// ── EventHandler ──────────────────────────────────────────────────────

/// Logic run when a task of one kind is dispatched.
///
/// The handler gets the simulation context (clock, scheduler, entities,
/// the model's blocks) and the entity the task was scheduled for, if
/// any. Handlers are the only code that mutates model state.
pub trait EventHandler<M: Model> {
    /// Called once per dispatched task of the registered kind.
    fn handle(&mut self, ctx: &mut SimulationContext<M>, entity: Option<EntityId>);
}

/// A handler backed by a closure.
impl<M, F> EventHandler<M> for F
where
    M: Model,
    F: FnMut(&mut SimulationContext<M>, Option<EntityId>),
{
    fn handle(&mut self, ctx: &mut SimulationContext<M>, entity: Option<EntityId>) {
        (self)(ctx, entity);
    }
}

// ── DispatchTable ─────────────────────────────────────────────────────

/// Maps each event kind to exactly one handler.
pub struct DispatchTable<M: Model> {
    handlers: HashMap<M::Kind, Box<dyn EventHandler<M>>>,
}

impl<M: Model> DispatchTable<M> {
    /// Create an empty table.
    pub fn new() -> Self {
        DispatchTable {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for `kind`.
    ///
    /// A second registration for the same kind is rejected and the
    /// original handler stays in place.
    pub fn register(&mut self, kind: M::Kind, handler: Box<dyn EventHandler<M>>) -> SimResult<()> {
        if self.handlers.contains_key(&kind) {
            return Err(SimError::DuplicateEventKind {
                kind: format!("{:?}", kind),
            });
        }
        self.handlers.insert(kind, handler);
        Ok(())
    }

    /// The handler for `kind`.
    ///
    /// A miss is [`SimError::UnregisteredEventKind`]: the control loop
    /// never skips a task it cannot dispatch.
    pub fn lookup(&mut self, kind: M::Kind) -> SimResult<&mut (dyn EventHandler<M> + 'static)> {
        match self.handlers.get_mut(&kind) {
            Some(handler) => Ok(handler.as_mut()),
            None => Err(SimError::UnregisteredEventKind {
                kind: format!("{:?}", kind),
            }),
        }
    }

    /// Whether `kind` has a handler.
    pub fn contains(&self, kind: M::Kind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// The kinds in `kinds` that have no handler, in input order.
    pub fn missing(&self, kinds: impl IntoIterator<Item = M::Kind>) -> Vec<M::Kind> {
        kinds.into_iter().filter(|k| !self.contains(*k)).collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drop every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<M: Model> Default for DispatchTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> std::fmt::Debug for DispatchTable<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Ping,
        Pong,
    }

    impl EventKind for Kind {
        const ALL: &'static [Self] = &[Kind::Ping, Kind::Pong];
    }

    struct PingPong;

    impl Model for PingPong {
        type Kind = Kind;
        type Entity = ();
        type Variables = u32;
        type Resources = ();
        type Statistics = ();
    }

    fn bump(ctx: &mut SimulationContext<PingPong>, _entity: Option<EntityId>) {
        ctx.variables += 1;
    }

    #[test]
    fn test_register_and_lookup() {
        let mut table: DispatchTable<PingPong> = DispatchTable::new();
        table.register(Kind::Ping, Box::new(bump)).unwrap();

        assert!(table.contains(Kind::Ping));
        assert!(!table.contains(Kind::Pong));
        assert_eq!(table.len(), 1);

        let mut ctx = SimulationContext::<PingPong>::new(0, (), ());
        table.lookup(Kind::Ping).unwrap().handle(&mut ctx, None);
        table.lookup(Kind::Ping).unwrap().handle(&mut ctx, None);
        assert_eq!(ctx.variables, 2);
    }

    #[test]
    fn test_lookup_miss_is_an_error() {
        let mut table: DispatchTable<PingPong> = DispatchTable::new();
        let err = table.lookup(Kind::Pong).err().unwrap();
        assert_eq!(
            err,
            SimError::UnregisteredEventKind {
                kind: "Pong".into()
            }
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut table: DispatchTable<PingPong> = DispatchTable::new();
        table.register(Kind::Ping, Box::new(bump)).unwrap();
        let err = table.register(Kind::Ping, Box::new(bump)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateEventKind { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_lists_unregistered_kinds() {
        let mut table: DispatchTable<PingPong> = DispatchTable::new();
        assert_eq!(table.missing(Kind::ALL.iter().copied()), vec![Kind::Ping, Kind::Pong]);
        table.register(Kind::Pong, Box::new(bump)).unwrap();
        assert_eq!(table.missing(Kind::ALL.iter().copied()), vec![Kind::Ping]);
    }

    #[test]
    fn test_clear() {
        let mut table: DispatchTable<PingPong> = DispatchTable::new();
        table.register(Kind::Ping, Box::new(bump)).unwrap();
        table.clear();
        assert!(table.is_empty());
    }
}
