//! Fluent builder for simulation setup.
//!
//! Collects handlers, the start kind, the statistics hook and run
//! settings, then assembles a validated, idle [`Simulation`].

use crate::dispatch::EventHandler;
use crate::entity::EntityId;
use crate::error::SimResult;
use crate::simulation::{Model, Simulation, SimulationConfig, SimulationContext};
use crate::stats::{HookMode, StatisticsHook};

// ── SimulationBuilder ─────────────────────────────────────────────────

/// Fluent builder for a [`Simulation`].
///
/// # Example
/// ```rust
/// use selene::{EventKind, Model, SimulationBuilder};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Kind { Start, Tick }
///
/// impl EventKind for Kind {
///     const ALL: &'static [Self] = &[Kind::Start, Kind::Tick];
/// }
///
/// struct Clock;
///
/// impl Model for Clock {
///     type Kind = Kind;
///     type Entity = ();
///     type Variables = u32;
///     type Resources = ();
///     type Statistics = ();
/// }
///
/// let mut sim = SimulationBuilder::<Clock>::new()
///     .start_with(Kind::Start)
///     .on_fn(Kind::Start, |ctx, _| {
///         ctx.schedule(1.0, Kind::Tick, None);
///     })
///     .on_fn(Kind::Tick, |ctx, _| {
///         ctx.variables += 1;
///         if ctx.variables < 5 {
///             ctx.schedule(1.0, Kind::Tick, None);
///         }
///     })
///     .build(0, (), ())
///     .unwrap();
///
/// let summary = sim.start().unwrap();
/// assert_eq!(*sim.variables(), 5);
/// assert_eq!(summary.final_time.as_f64(), 5.0);
/// ```
pub struct SimulationBuilder<M: Model> {
    config: SimulationConfig,
    start: Option<M::Kind>,
    handlers: Vec<(M::Kind, Box<dyn EventHandler<M>>)>,
    hook: Option<Box<dyn StatisticsHook<M>>>,
}

impl<M: Model> SimulationBuilder<M> {
    /// Create a new builder.
    pub fn new() -> Self {
        SimulationBuilder {
            config: SimulationConfig::default(),
            start: None,
            handlers: Vec::new(),
            hook: None,
        }
    }

    // ── Run settings ──────────────────────────────────────────

    /// Replace the run settings.
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Cap the run at `n` dispatched tasks.
    pub fn max_events(mut self, n: u64) -> Self {
        self.config = self.config.with_max_events(n);
        self
    }

    /// The kind of the bootstrap task.
    pub fn start_with(mut self, kind: M::Kind) -> Self {
        self.start = Some(kind);
        self
    }

    // ── Handlers ──────────────────────────────────────────────

    /// Register a handler.
    pub fn on<H>(mut self, kind: M::Kind, handler: H) -> Self
    where
        H: EventHandler<M> + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
        self
    }

    /// Register a closure handler with inferred argument types.
    pub fn on_fn<F>(self, kind: M::Kind, handler: F) -> Self
    where
        F: FnMut(&mut SimulationContext<M>, Option<EntityId>) + 'static,
    {
        self.on(kind, handler)
    }

    // ── Statistics ────────────────────────────────────────────

    /// Install the statistics hook.
    pub fn statistics<H>(mut self, hook: H) -> Self
    where
        H: StatisticsHook<M> + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Install a closure hook with inferred argument types.
    pub fn statistics_fn<F>(self, hook: F) -> Self
    where
        F: FnMut(&mut SimulationContext<M>, HookMode) + 'static,
    {
        self.statistics(hook)
    }

    // ── Build ─────────────────────────────────────────────────

    /// Assemble the simulation around the model's state blocks.
    ///
    /// Fails on a duplicate handler, a missing start kind, or an event
    /// kind with no handler.
    pub fn build(
        self,
        variables: M::Variables,
        resources: M::Resources,
        statistics: M::Statistics,
    ) -> SimResult<Simulation<M>> {
        let mut sim = Simulation::with_config(self.config, variables, resources, statistics);
        for (kind, handler) in self.handlers {
            sim.register_boxed(kind, handler)?;
        }
        if let Some(kind) = self.start {
            sim.set_start_event(kind);
        }
        if let Some(hook) = self.hook {
            sim.set_boxed_hook(hook);
        }
        sim.validate()?;
        Ok(sim)
    }
}

impl<M: Model> Default for SimulationBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}
