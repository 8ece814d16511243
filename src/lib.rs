//! # Selene — Discrete-Event Simulation Kernel
//!
//! A single-threaded kernel for models whose state changes only at
//! discrete instants. Handlers react to events, mutate model state and
//! schedule further events on a virtual clock. No threads, no wall-clock
//! time.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐
//! │          Simulation            │ ← lifecycle + dispatch loop
//! │  ┌─────────────────────────┐  │
//! │  │    DispatchTable         │  │ ← kind → handler
//! │  └─────────────────────────┘  │
//! │  ┌─────────────────────────┐  │
//! │  │   SimulationContext      │  │ ← what handlers see
//! │  │  ┌───────────────────┐  │  │
//! │  │  │    Scheduler       │  │  │ ← min-heap on (due, seq)
//! │  │  └───────────────────┘  │  │
//! │  │  ┌───────────────────┐  │  │
//! │  │  │  EntityRegistry    │  │  │ ← id → payload
//! │  │  └───────────────────┘  │  │
//! │  │  variables · resources  │  │
//! │  │  statistics · Variates  │  │
//! │  └─────────────────────────┘  │
//! │  StatisticsHook                │ ← Accumulate per event, Finalize once
//! └───────────────────────────────┘
//! ```
//!
//! [`tandem`] is a complete client model: two single-server stations in
//! series fed by Poisson arrivals.

pub mod dispatch;
pub mod dsl;
pub mod entity;
pub mod error;
pub mod queue;
pub mod random;
pub mod scheduler;
pub mod simulation;
pub mod stats;
pub mod tandem;
pub mod task;
pub mod time;

// Re-exports for convenience.
pub use dispatch::{DispatchTable, EventHandler, EventKind};
pub use dsl::SimulationBuilder;
pub use entity::{EntityId, EntityRegistry};
pub use error::{SimError, SimResult};
pub use queue::WaitQueue;
pub use random::Variates;
pub use scheduler::Scheduler;
pub use simulation::{
    Model, Phase, RunSummary, Simulation, SimulationConfig, SimulationContext, StopReason,
};
pub use stats::{HookMode, StatisticsHook, TimeWeighted};
pub use task::{Task, TaskSeq};
pub use time::SimTime;
