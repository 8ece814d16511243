//! Simulation clock for the discrete-event kernel.
//!
//! Time is a real number that advances only when the control loop
//! dispatches a task. There is no dependency on `std::time`: nothing
//! in the kernel ever looks at the wall clock.

use std::cmp::Ordering;

/// A point on the simulation time axis.
///
/// Wraps an `f64` and orders it with [`f64::total_cmp`], which makes the
/// type `Ord` and therefore usable as a heap key. The scheduler refuses
/// NaN and infinite delays, so in practice every `SimTime` the kernel
/// produces is finite.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    /// The zero-point of simulation time; every run starts here.
    pub const ZERO: SimTime = SimTime(0.0);

    /// Wrap a raw time value.
    #[inline]
    pub fn new(value: f64) -> Self {
        SimTime(value)
    }

    /// Return the raw time value.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// The time that is `delta` after `self`.
    #[inline]
    pub fn plus(self, delta: f64) -> SimTime {
        SimTime(self.0 + delta)
    }

    /// Elapsed time from `earlier` to `self`. Negative if `earlier` is
    /// actually later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: SimTime) -> bool {
        self < other
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::ZERO
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={:.3}", self.0)
    }
}
