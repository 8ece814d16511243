//! Simulation context and control loop.
//!
//! The control loop pulls the earliest task from the scheduler, moves the
//! clock to its due time, runs the handler registered for its kind, then
//! calls the statistics hook. Everything is synchronous and
//! single-threaded: handlers run one at a time and nothing else touches
//! the state in between.

use std::iter;

use tracing::{debug, info, warn};

use crate::dispatch::{DispatchTable, EventHandler, EventKind};
use crate::entity::{EntityId, EntityRegistry};
use crate::error::{SimError, SimResult};
use crate::random::Variates;
use crate::scheduler::Scheduler;
use crate::stats::{HookMode, StatisticsHook};
use crate::task::TaskSeq;
use crate::time::SimTime;

// ── Model ─────────────────────────────────────────────────────────────

/// The types a client plugs into the kernel.
///
/// The kernel never looks inside the entity payload or the three state
/// blocks; it only stores them and hands them to handlers.
pub trait Model: 'static {
    /// Tag naming the model's events.
    type Kind: EventKind;
    /// Per-entity payload kept in the registry.
    type Entity;
    /// Transient model state (queue lengths, busy flags).
    type Variables;
    /// Model resources (wait queues).
    type Resources;
    /// Statistics accumulators and final metrics.
    type Statistics;
}

// ── Phase ─────────────────────────────────────────────────────────────

/// Lifecycle of a [`Simulation`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Built, not started yet.
    Idle,
    /// Inside `start()`, dispatching tasks.
    Running,
    /// The run is over; only `clean()` and inspection remain.
    Stopped,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Running => write!(f, "Running"),
            Phase::Stopped => write!(f, "Stopped"),
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────

/// Kernel-level run settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Stop after this many dispatched tasks. `None` runs until the
    /// pending list is empty or a handler calls `stop()`.
    pub max_events: Option<u64>,
}

impl SimulationConfig {
    /// No dispatch cap.
    pub fn unbounded() -> Self {
        SimulationConfig { max_events: None }
    }

    /// Cap the run at `max_events` dispatched tasks.
    pub fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }
}

// ── Run summary ───────────────────────────────────────────────────────

/// What ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The pending list ran dry.
    Exhausted,
    /// A handler called `stop()`.
    Stopped,
    /// `SimulationConfig::max_events` was reached.
    EventLimit,
}

/// Returned by [`Simulation::start`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub events_dispatched: u64,
    pub final_time: SimTime,
    pub reason: StopReason,
}

// ── Simulation Context ───────────────────────────────────────────────

/// Everything a handler can see and change.
///
/// Kernel-owned state (clock, pending list, running flag) is reached
/// through methods. The entity registry and the model's three blocks are
/// public fields so a handler can borrow them independently, e.g. read
/// an entity while updating statistics.
pub struct SimulationContext<M: Model> {
    scheduler: Scheduler<M::Kind>,
    variates: Variates,
    running: bool,
    events_dispatched: u64,

    /// Live entities.
    pub entities: EntityRegistry<M::Entity>,
    /// Transient model state.
    pub variables: M::Variables,
    /// Model resources.
    pub resources: M::Resources,
    /// Statistics accumulators.
    pub statistics: M::Statistics,
}

impl<M: Model> SimulationContext<M> {
    pub(crate) fn new(
        variables: M::Variables,
        resources: M::Resources,
        statistics: M::Statistics,
    ) -> Self {
        SimulationContext {
            scheduler: Scheduler::new(),
            variates: Variates::new(),
            running: false,
            events_dispatched: 0,
            entities: EntityRegistry::new(),
            variables,
            resources,
            statistics,
        }
    }

    /// Current simulation time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Schedule `kind` to run `delay` after now, optionally on behalf of
    /// `entity`. Tasks due at the same time run in scheduling order.
    ///
    /// # Panics
    /// Panics if `delay` is negative, NaN or infinite.
    pub fn schedule(&mut self, delay: f64, kind: M::Kind, entity: Option<EntityId>) -> TaskSeq {
        self.scheduler.schedule(delay, kind, entity)
    }

    /// Like [`schedule`](Self::schedule), returning an error for a bad
    /// delay instead of panicking.
    pub fn try_schedule(
        &mut self,
        delay: f64,
        kind: M::Kind,
        entity: Option<EntityId>,
    ) -> SimResult<TaskSeq> {
        self.scheduler.try_schedule(delay, kind, entity)
    }

    /// Ask the control loop to stop once the current handler returns.
    /// Calling it more than once has no further effect.
    pub fn stop(&mut self) {
        if self.running {
            debug!(now = %self.now(), "stop requested");
        }
        self.running = false;
    }

    /// `false` once `stop()` has been called or the run is over.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Tasks dispatched so far in this run.
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched
    }

    /// Read-only view of the scheduler.
    pub fn scheduler(&self) -> &Scheduler<M::Kind> {
        &self.scheduler
    }

    /// Random variate source.
    pub fn variates(&mut self) -> &mut Variates {
        &mut self.variates
    }

    /// Shorthand for `variates().exponential(rate)`.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        self.variates.exponential(rate)
    }

    /// Shorthand for `variates().uniform(low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.variates.uniform(low, high)
    }

    /// Shorthand for `variates().normal(mean, sigma)`.
    pub fn normal(&mut self, mean: f64, sigma: f64) -> f64 {
        self.variates.normal(mean, sigma)
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation driver.
///
/// Register a handler for every event kind, set the start kind,
/// optionally install a statistics hook, then call [`start`](Self::start).
/// `start` runs the whole simulation and returns once it has stopped.
pub struct Simulation<M: Model> {
    ctx: SimulationContext<M>,
    table: DispatchTable<M>,
    hook: Option<Box<dyn StatisticsHook<M>>>,
    start_kind: Option<M::Kind>,
    phase: Phase,
    config: SimulationConfig,
}

impl<M: Model> Simulation<M> {
    /// Create an idle simulation around the model's three state blocks.
    pub fn new(variables: M::Variables, resources: M::Resources, statistics: M::Statistics) -> Self {
        Self::with_config(SimulationConfig::default(), variables, resources, statistics)
    }

    /// Create an idle simulation with explicit run settings.
    pub fn with_config(
        config: SimulationConfig,
        variables: M::Variables,
        resources: M::Resources,
        statistics: M::Statistics,
    ) -> Self {
        Simulation {
            ctx: SimulationContext::new(variables, resources, statistics),
            table: DispatchTable::new(),
            hook: None,
            start_kind: None,
            phase: Phase::Idle,
            config,
        }
    }

    // ── Setup ─────────────────────────────────────────────────

    /// Register the handler for `kind`. Each kind takes exactly one.
    pub fn register<H>(&mut self, kind: M::Kind, handler: H) -> SimResult<()>
    where
        H: EventHandler<M> + 'static,
    {
        self.table.register(kind, Box::new(handler))
    }

    pub(crate) fn register_boxed(
        &mut self,
        kind: M::Kind,
        handler: Box<dyn EventHandler<M>>,
    ) -> SimResult<()> {
        self.table.register(kind, handler)
    }

    /// Register a closure handler; the closure's argument types are
    /// inferred.
    pub fn register_fn<F>(&mut self, kind: M::Kind, handler: F) -> SimResult<()>
    where
        F: FnMut(&mut SimulationContext<M>, Option<EntityId>) + 'static,
    {
        self.register(kind, handler)
    }

    /// The kind of the bootstrap task `start()` schedules at time zero.
    pub fn set_start_event(&mut self, kind: M::Kind) {
        self.start_kind = Some(kind);
    }

    /// Install (or replace) the statistics hook.
    pub fn set_statistics_hook<H>(&mut self, hook: H)
    where
        H: StatisticsHook<M> + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    pub(crate) fn set_boxed_hook(&mut self, hook: Box<dyn StatisticsHook<M>>) {
        self.hook = Some(hook);
    }

    /// Install a closure hook; the closure's argument types are inferred.
    pub fn set_statistics_fn<F>(&mut self, hook: F)
    where
        F: FnMut(&mut SimulationContext<M>, HookMode) + 'static,
    {
        self.set_statistics_hook(hook)
    }

    /// Check that a start kind is set and that it, and every kind in
    /// `EventKind::ALL`, has a handler.
    pub fn validate(&self) -> SimResult<()> {
        let start_kind = self.start_kind.ok_or(SimError::MissingStartEvent)?;
        let kinds = iter::once(start_kind).chain(<M::Kind as EventKind>::ALL.iter().copied());
        match self.table.missing(kinds).first() {
            Some(kind) => Err(SimError::UnregisteredEventKind {
                kind: format!("{:?}", kind),
            }),
            None => Ok(()),
        }
    }

    // ── Control loop ──────────────────────────────────────────

    /// Run the simulation: Idle → Running → Stopped.
    ///
    /// Seeds a bootstrap task for the start kind at time zero, then
    /// dispatches until the pending list is empty, a handler calls
    /// `stop()`, or the configured event cap is reached. The statistics
    /// hook gets one `Accumulate` call per dispatched task (including the
    /// one that called `stop()`) and exactly one `Finalize` call at the
    /// end.
    ///
    /// A simulation runs once: calling `start` again is an
    /// [`SimError::InvalidTransition`]. If dispatch hits an unregistered
    /// kind the run is aborted, the simulation is left `Stopped`, and the
    /// error is returned without a `Finalize` call.
    pub fn start(&mut self) -> SimResult<RunSummary> {
        if self.phase != Phase::Idle {
            return Err(SimError::InvalidTransition {
                from: self.phase,
                to: Phase::Running,
            });
        }
        self.validate()?;
        let start_kind = self.start_kind.ok_or(SimError::MissingStartEvent)?;

        self.phase = Phase::Running;
        self.ctx.running = true;
        self.ctx.scheduler.schedule_at(SimTime::ZERO, start_kind, None);
        info!(
            start = ?start_kind,
            handlers = self.table.len(),
            max_events = ?self.config.max_events,
            "simulation started"
        );

        let outcome = self.dispatch_loop();

        self.ctx.running = false;
        self.phase = Phase::Stopped;

        let reason = match outcome {
            Ok(reason) => reason,
            Err(e) => {
                warn!(error = %e, now = %self.ctx.now(), "simulation aborted");
                return Err(e);
            }
        };

        if let Some(hook) = self.hook.as_mut() {
            hook.observe(&mut self.ctx, HookMode::Finalize);
        }

        let summary = RunSummary {
            events_dispatched: self.ctx.events_dispatched,
            final_time: self.ctx.now(),
            reason,
        };
        info!(
            events = summary.events_dispatched,
            final_time = %summary.final_time,
            reason = ?summary.reason,
            pending = self.ctx.pending_count(),
            live_entities = self.ctx.entities.len(),
            "simulation finished"
        );
        Ok(summary)
    }

    fn dispatch_loop(&mut self) -> SimResult<StopReason> {
        loop {
            if !self.ctx.running {
                return Ok(StopReason::Stopped);
            }
            if self.ctx.scheduler.is_empty() {
                return Ok(StopReason::Exhausted);
            }
            if let Some(max) = self.config.max_events {
                if self.ctx.events_dispatched >= max {
                    return Ok(StopReason::EventLimit);
                }
            }

            let task = self.ctx.scheduler.pull_earliest()?;
            let previous = self.ctx.now();
            self.ctx.scheduler.advance_to(task.due);

            let handler = self.table.lookup(task.kind)?;
            debug!(
                seq = %task.seq,
                now = %task.due,
                kind = ?task.kind,
                entity = ?task.entity,
                "dispatching"
            );
            handler.handle(&mut self.ctx, task.entity);
            self.ctx.events_dispatched += 1;

            if let Some(hook) = self.hook.as_mut() {
                hook.observe(&mut self.ctx, HookMode::Accumulate { previous });
            }
        }
    }

    /// Release the dispatch table, any still-pending tasks and every
    /// remaining entity. Only valid once the run has stopped.
    ///
    /// The model's variables, resources and statistics are kept so the
    /// caller can still read the final numbers.
    pub fn clean(&mut self) -> SimResult<()> {
        if self.phase != Phase::Stopped {
            return Err(SimError::NotStopped(self.phase));
        }
        debug!(
            pending = self.ctx.pending_count(),
            live_entities = self.ctx.entities.len(),
            "cleaning simulation"
        );
        self.table.clear();
        self.ctx.scheduler.clear();
        self.ctx.entities.clear();
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.ctx.now()
    }

    /// Tasks dispatched so far.
    pub fn events_dispatched(&self) -> u64 {
        self.ctx.events_dispatched
    }

    /// Number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.ctx.pending_count()
    }

    /// Run settings.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The context handlers see.
    pub fn context(&self) -> &SimulationContext<M> {
        &self.ctx
    }

    /// Mutable access to the context, e.g. to pre-populate entities or
    /// resources before `start()`.
    pub fn context_mut(&mut self) -> &mut SimulationContext<M> {
        &mut self.ctx
    }

    pub fn entities(&self) -> &EntityRegistry<M::Entity> {
        &self.ctx.entities
    }

    pub fn variables(&self) -> &M::Variables {
        &self.ctx.variables
    }

    pub fn resources(&self) -> &M::Resources {
        &self.ctx.resources
    }

    pub fn statistics(&self) -> &M::Statistics {
        &self.ctx.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tick {
        Start,
        Step,
        Halt,
    }

    impl EventKind for Tick {
        const ALL: &'static [Self] = &[Tick::Start, Tick::Step, Tick::Halt];
    }

    #[derive(Debug, Default)]
    struct HookLog {
        accumulate: u64,
        finalize: u64,
        running_at_finalize: Option<bool>,
        intervals: Vec<(f64, f64)>,
    }

    struct Ticker;

    impl Model for Ticker {
        type Kind = Tick;
        type Entity = &'static str;
        /// (time, kind, entity) of every dispatch.
        type Variables = Vec<(f64, Tick, Option<EntityId>)>;
        type Resources = ();
        type Statistics = HookLog;
    }

    fn record(ctx: &mut SimulationContext<Ticker>, kind: Tick, entity: Option<EntityId>) {
        let now = ctx.now().as_f64();
        ctx.variables.push((now, kind, entity));
    }

    /// A simulation whose start handler schedules `steps` at the given
    /// delays, and a Halt at `halt_at` if given.
    fn ticker(steps: &'static [f64], halt_at: Option<f64>) -> Simulation<Ticker> {
        let mut sim = Simulation::new(Vec::new(), (), HookLog::default());
        sim.register_fn(Tick::Start, move |ctx, entity| {
            record(ctx, Tick::Start, entity);
            for &d in steps {
                ctx.schedule(d, Tick::Step, None);
            }
            if let Some(h) = halt_at {
                ctx.schedule(h, Tick::Halt, None);
            }
        })
        .unwrap();
        sim.register_fn(Tick::Step, |ctx, entity| record(ctx, Tick::Step, entity))
            .unwrap();
        sim.register_fn(Tick::Halt, |ctx, entity| {
            record(ctx, Tick::Halt, entity);
            ctx.stop();
        })
        .unwrap();
        sim.set_statistics_fn(|ctx, mode| match mode {
            HookMode::Accumulate { previous } => {
                let now = ctx.now().as_f64();
                ctx.statistics.accumulate += 1;
                ctx.statistics.intervals.push((previous.as_f64(), now));
            }
            HookMode::Finalize => {
                ctx.statistics.finalize += 1;
                ctx.statistics.running_at_finalize = Some(ctx.is_running());
            }
        });
        sim.set_start_event(Tick::Start);
        sim
    }

    #[test]
    fn test_runs_until_exhausted() {
        let mut sim = ticker(&[3.0, 1.0, 2.0], None);
        let summary = sim.start().unwrap();

        assert_eq!(summary.reason, StopReason::Exhausted);
        assert_eq!(summary.events_dispatched, 4);
        assert_eq!(summary.final_time, SimTime::new(3.0));
        assert_eq!(sim.phase(), Phase::Stopped);

        let times: Vec<f64> = sim.variables().iter().map(|(t, _, _)| *t).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(sim.variables()[0].1, Tick::Start);
        assert_eq!(sim.variables()[0].2, None);
    }

    #[test]
    fn test_same_time_tasks_dispatch_in_schedule_order() {
        let mut sim: Simulation<Ticker> = Simulation::new(Vec::new(), (), HookLog::default());
        sim.register_fn(Tick::Start, |ctx, _| {
            let a = ctx.entities.insert("a");
            let b = ctx.entities.insert("b");
            ctx.schedule(1.0, Tick::Step, Some(b));
            ctx.schedule(1.0, Tick::Step, Some(a));
            ctx.schedule(0.5, Tick::Halt, None);
        })
        .unwrap();
        sim.register_fn(Tick::Step, |ctx, entity| {
            let name = entity.and_then(|id| ctx.entities.remove(id)).unwrap();
            let now = ctx.now().as_f64();
            ctx.variables.push((now, Tick::Step, entity));
            assert!(name == "a" || name == "b");
        })
        .unwrap();
        sim.register_fn(Tick::Halt, |_ctx, _| {}).unwrap();
        sim.set_start_event(Tick::Start);

        sim.start().unwrap();

        let entities: Vec<u64> = sim
            .variables()
            .iter()
            .map(|(_, _, e)| e.unwrap().raw())
            .collect();
        // b (id 1) was scheduled before a (id 0).
        assert_eq!(entities, vec![1, 0]);
        assert!(sim.entities().is_empty());
    }

    #[test]
    fn test_stop_ends_run_after_current_task() {
        let mut sim = ticker(&[1.0, 5.0, 9.0], Some(5.0));
        let summary = sim.start().unwrap();

        assert_eq!(summary.reason, StopReason::Stopped);
        assert_eq!(summary.final_time, SimTime::new(5.0));
        // Start, Step@1, Step@5, Halt@5; Step@9 never runs.
        assert_eq!(summary.events_dispatched, 4);
        assert_eq!(sim.variables().last().unwrap().1, Tick::Halt);
        assert_eq!(sim.pending_count(), 1);
    }

    #[test]
    fn test_hook_called_once_per_task_and_finalized_once() {
        let cases: [(&'static [f64], Option<f64>); 2] =
            [(&[1.0, 2.0], None), (&[1.0, 2.0, 7.0], Some(2.0))];
        for (steps, halt) in cases {
            let mut sim = ticker(steps, halt);
            let summary = sim.start().unwrap();
            let log = sim.statistics();
            assert_eq!(log.accumulate, summary.events_dispatched);
            assert_eq!(log.finalize, 1);
            assert_eq!(log.running_at_finalize, Some(false));
        }
    }

    #[test]
    fn test_accumulate_reports_previous_time() {
        let mut sim = ticker(&[1.5, 4.0], None);
        sim.start().unwrap();
        assert_eq!(
            sim.statistics().intervals,
            vec![(0.0, 0.0), (0.0, 1.5), (1.5, 4.0)]
        );
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut sim = ticker(&[], None);
        sim.start().unwrap();
        let err = sim.start().unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidTransition {
                from: Phase::Stopped,
                to: Phase::Running,
            }
        );
        assert_eq!(sim.statistics().finalize, 1);
    }

    #[test]
    fn test_start_without_start_event() {
        let mut sim: Simulation<Ticker> = Simulation::new(Vec::new(), (), HookLog::default());
        assert_eq!(sim.start().unwrap_err(), SimError::MissingStartEvent);
        assert_eq!(sim.phase(), Phase::Idle);
    }

    #[test]
    fn test_start_with_missing_handler_dispatches_nothing() {
        let mut sim: Simulation<Ticker> = Simulation::new(Vec::new(), (), HookLog::default());
        sim.register_fn(Tick::Start, |ctx, _| {
            ctx.schedule(1.0, Tick::Step, None);
        })
        .unwrap();
        sim.register_fn(Tick::Step, |_, _| {}).unwrap();
        sim.set_start_event(Tick::Start);

        let err = sim.start().unwrap_err();
        assert_eq!(err, SimError::UnregisteredEventKind { kind: "Halt".into() });
        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.events_dispatched(), 0);
    }

    #[test]
    fn test_duplicate_handler_rejected() {
        let mut sim = ticker(&[], None);
        let err = sim.register_fn(Tick::Step, |_, _| {}).unwrap_err();
        assert!(matches!(err, SimError::DuplicateEventKind { .. }));
    }

    #[test]
    fn test_event_limit() {
        let mut sim: Simulation<Ticker> = Simulation::with_config(
            SimulationConfig::unbounded().with_max_events(10),
            Vec::new(),
            (),
            HookLog::default(),
        );
        sim.register_fn(Tick::Start, |ctx, _| {
            ctx.schedule(1.0, Tick::Step, None);
        })
        .unwrap();
        // Every step schedules another: the run would never end on its own.
        sim.register_fn(Tick::Step, |ctx, _| {
            ctx.schedule(1.0, Tick::Step, None);
        })
        .unwrap();
        sim.register_fn(Tick::Halt, |_, _| {}).unwrap();
        sim.set_start_event(Tick::Start);

        let summary = sim.start().unwrap();
        assert_eq!(summary.reason, StopReason::EventLimit);
        assert_eq!(summary.events_dispatched, 10);
        assert_eq!(summary.final_time, SimTime::new(9.0));
    }

    #[test]
    fn test_clean_requires_stopped() {
        let mut sim = ticker(&[1.0], None);
        assert_eq!(sim.clean().unwrap_err(), SimError::NotStopped(Phase::Idle));
    }

    #[test]
    fn test_clean_after_exhaustion_and_after_stop() {
        for halt in [None, Some(2.0)] {
            let mut sim = ticker(&[1.0, 2.0, 3.0, 4.0], halt);
            sim.context_mut().entities.insert("left over");
            sim.start().unwrap();
            sim.context_mut().entities.insert("another");

            sim.clean().unwrap();
            assert!(sim.entities().is_empty());
            assert_eq!(sim.entities().get(EntityId::new(0)), None);
            assert_eq!(sim.pending_count(), 0);
            // Final statistics stay readable.
            assert_eq!(sim.statistics().finalize, 1);
        }
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sim: Simulation<Ticker> = Simulation::new(Vec::new(), (), HookLog::default());
        sim.register_fn(Tick::Start, |ctx, _| {
            ctx.stop();
            ctx.stop();
            assert!(!ctx.is_running());
        })
        .unwrap();
        sim.register_fn(Tick::Step, |_, _| {}).unwrap();
        sim.register_fn(Tick::Halt, |_, _| {}).unwrap();
        sim.set_start_event(Tick::Start);

        let summary = sim.start().unwrap();
        assert_eq!(summary.reason, StopReason::Stopped);
        assert_eq!(summary.events_dispatched, 1);
    }

    #[test]
    fn test_handler_struct() {
        struct CountSteps {
            seen: u32,
        }

        impl EventHandler<Ticker> for CountSteps {
            fn handle(&mut self, ctx: &mut SimulationContext<Ticker>, entity: Option<EntityId>) {
                self.seen += 1;
                if self.seen < 3 {
                    ctx.schedule(2.0, Tick::Step, entity);
                }
            }
        }

        let mut sim: Simulation<Ticker> = Simulation::new(Vec::new(), (), HookLog::default());
        sim.register(Tick::Start, CountSteps { seen: 0 }).unwrap();
        sim.register_fn(Tick::Step, |ctx, _| {
            ctx.schedule(0.0, Tick::Start, None);
        })
        .unwrap();
        sim.register_fn(Tick::Halt, |_, _| {}).unwrap();
        sim.set_start_event(Tick::Start);

        let summary = sim.start().unwrap();
        // Start@0, Step@2, Start@2, Step@4, Start@4
        assert_eq!(summary.events_dispatched, 5);
        assert_eq!(summary.final_time, SimTime::new(4.0));
    }

    /// `ALL` leaves out `Hidden`, so validation passes and dispatch fails.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Partial {
        Boot,
        Hidden,
    }

    impl EventKind for Partial {
        const ALL: &'static [Self] = &[Partial::Boot];
    }

    struct Leaky;

    impl Model for Leaky {
        type Kind = Partial;
        type Entity = ();
        type Variables = ();
        type Resources = ();
        type Statistics = Vec<HookMode>;
    }

    #[traced_test]
    #[test]
    fn test_unregistered_kind_aborts_run() {
        let mut sim: Simulation<Leaky> = Simulation::new((), (), Vec::new());
        sim.register_fn(Partial::Boot, |ctx, _| {
            ctx.entities.insert(());
            ctx.schedule(1.0, Partial::Hidden, None);
            ctx.schedule(2.0, Partial::Boot, None);
        })
        .unwrap();
        sim.set_statistics_fn(|ctx, mode| ctx.statistics.push(mode));
        sim.set_start_event(Partial::Boot);
        assert!(sim.validate().is_ok());

        let err = sim.start().unwrap_err();
        assert_eq!(
            err,
            SimError::UnregisteredEventKind {
                kind: "Hidden".into()
            }
        );
        assert_eq!(sim.phase(), Phase::Stopped);
        assert_eq!(sim.events_dispatched(), 1);
        assert_eq!(sim.now(), SimTime::new(1.0));
        assert!(!sim.context().is_running());
        // One Accumulate for Boot, no Finalize.
        assert_eq!(
            sim.statistics(),
            &vec![HookMode::Accumulate {
                previous: SimTime::ZERO
            }]
        );
        assert!(logs_contain("simulation aborted"));
        assert!(!logs_contain("simulation finished"));

        // The aborted run can still be torn down, and not restarted.
        assert_eq!(sim.pending_count(), 1);
        sim.clean().unwrap();
        assert_eq!(sim.pending_count(), 0);
        assert!(sim.entities().is_empty());
        assert!(matches!(
            sim.start(),
            Err(SimError::InvalidTransition { .. })
        ));
    }

    #[traced_test]
    #[test]
    fn test_logs_run_lifecycle() {
        let mut sim = ticker(&[1.0], None);
        sim.start().unwrap();
        assert!(logs_contain("simulation started"));
        assert!(logs_contain("simulation finished"));
    }
}
