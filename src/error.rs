//! Structured error types for the simulation kernel.
//!
//! Every fallible public API returns `SimResult<T>`. The variants cover
//! the programmer-error class of failures: a kernel that hits one of
//! these stops instead of dispatching against a broken setup. Benign
//! misses (looking up or removing an absent entity) are `Option`s, not
//! errors.

use thiserror::Error;

use crate::simulation::Phase;

/// The top-level error type for the kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    // ── Dispatch errors ───────────────────────────────────

    /// A task was due for a kind that has no registered handler.
    #[error("no handler registered for event kind {kind}")]
    UnregisteredEventKind { kind: String },

    /// A handler was registered twice for the same kind.
    #[error("event kind {kind} already has a handler")]
    DuplicateEventKind { kind: String },

    /// `start()` was called before a start event kind was set.
    #[error("no start event kind has been set")]
    MissingStartEvent,

    // ── Scheduling errors ─────────────────────────────────

    /// Attempted to pull from an empty pending list.
    #[error("scheduler has no pending tasks")]
    SchedulerEmpty,

    /// A delay was negative, NaN or infinite.
    #[error("invalid scheduling delay {delay} at {now}")]
    InvalidDelay { delay: f64, now: f64 },

    // ── Lifecycle errors ──────────────────────────────────

    /// A lifecycle call was made from the wrong phase.
    #[error("cannot move simulation from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },

    /// `clean()` was called before the run stopped.
    #[error("cannot clean a simulation that is {0}")]
    NotStopped(Phase),

    // ── Config errors ─────────────────────────────────────

    /// A model configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
