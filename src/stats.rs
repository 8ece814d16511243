//! Statistics hook contract and a time-weighted accumulator.
//!
//! The control loop calls the installed [`StatisticsHook`] after every
//! dispatched task with [`HookMode::Accumulate`], and exactly once after
//! the run ends with [`HookMode::Finalize`]. The mode is passed in
//! explicitly; a hook never has to infer it from the running flag.

use crate::simulation::{Model, SimulationContext};
use crate::time::SimTime;

/// Why the hook is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMode {
    /// A task was just dispatched. `previous` is the clock value of the
    /// task dispatched before it (zero for the first task), so the
    /// interval `previous..ctx.now()` is the one that just elapsed.
    Accumulate { previous: SimTime },

    /// The run is over. Derive the summary metrics.
    Finalize,
}

/// Client-supplied statistics logic.
pub trait StatisticsHook<M: Model> {
    fn observe(&mut self, ctx: &mut SimulationContext<M>, mode: HookMode);
}

/// A hook backed by a closure.
impl<M, F> StatisticsHook<M> for F
where
    M: Model,
    F: FnMut(&mut SimulationContext<M>, HookMode),
{
    fn observe(&mut self, ctx: &mut SimulationContext<M>, mode: HookMode) {
        (self)(ctx, mode);
    }
}

// ── TimeWeighted ──────────────────────────────────────────────────────

/// Area under a step function of time.
///
/// Holds the current level of some state variable (queue length, busy
/// flag) and integrates it over time. Call [`observe`](Self::observe)
/// with the new level whenever it may have changed; the old level is
/// charged for the time since the previous observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWeighted {
    area: f64,
    level: f64,
    last: SimTime,
}

impl TimeWeighted {
    /// Start at level zero at time zero.
    pub fn new() -> Self {
        TimeWeighted {
            area: 0.0,
            level: 0.0,
            last: SimTime::ZERO,
        }
    }

    /// Charge the current level up to `now`, then switch to `level`.
    ///
    /// An observation earlier than the previous one adds nothing.
    pub fn observe(&mut self, now: SimTime, level: f64) {
        let elapsed = now.since(self.last);
        if elapsed > 0.0 {
            self.area += self.level * elapsed;
            self.last = now;
        }
        self.level = level;
    }

    /// Integral accumulated so far.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Current level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Time of the last observation that moved the integral forward.
    pub fn last_observed(&self) -> SimTime {
        self.last
    }

    /// Time average over `duration`. Zero for an empty interval.
    pub fn mean(&self, duration: f64) -> f64 {
        if duration > 0.0 {
            self.area / duration
        } else {
            0.0
        }
    }
}

impl Default for TimeWeighted {
    fn default() -> Self {
        Self::new()
    }
}
