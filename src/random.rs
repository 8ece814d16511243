//! Random variates for model handlers.
//!
//! Every draw comes from one `StdRng` per `Variates`, seeded once from
//! OS entropy when the value is built. There is no seeding API, so runs
//! are not reproducible.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the exponential, uniform and normal variates used by
/// handlers. Each [`SimulationContext`](crate::SimulationContext) owns one.
#[derive(Debug, Clone)]
pub struct Variates {
    rng: StdRng,
    /// Second Box–Muller value, returned by the next `normal` call.
    spare_normal: Option<f64>,
}

impl Variates {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Variates {
            rng: StdRng::from_entropy(),
            spare_normal: None,
        }
    }

    /// A uniform draw in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Exponential variate with the given rate (mean `1 / rate`), by
    /// inverse transform.
    ///
    /// `1 - u` lies in `(0, 1]`, so the logarithm is always finite.
    ///
    /// # Panics
    /// Panics if `rate` is not strictly positive.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        assert!(rate > 0.0, "exponential rate must be > 0, got {}", rate);
        let u = self.unit();
        -(1.0 - u).ln() / rate
    }

    /// Uniform variate in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u = self.unit();
        low + u * (high - low)
    }

    /// Normal variate with the given mean and standard deviation, by the
    /// Box–Muller transform.
    ///
    /// Each transform yields two independent values; the second is kept
    /// and returned by the following call. The result can be negative:
    /// clamp it before using it as a scheduling delay.
    pub fn normal(&mut self, mean: f64, sigma: f64) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return mean + sigma * z;
        }
        let u1 = 1.0 - self.unit();
        let u2 = self.unit();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * PI * u2;
        self.spare_normal = Some(radius * angle.sin());
        mean + sigma * radius * angle.cos()
    }
}

impl Default for Variates {
    fn default() -> Self {
        Self::new()
    }
}
