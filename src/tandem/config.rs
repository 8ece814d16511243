//! `TandemConfig` — rates and horizon for the two-station model.

use crate::error::{SimError, SimResult};

/// Parameters of a tandem queue run.
///
/// Customers arrive as a Poisson process, wait for station 1, are
/// served, then wait for station 2 and are served again. Service times
/// are exponential at both stations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TandemConfig {
    /// Customer arrival rate (λ).
    pub arrival_rate: f64,
    /// Station 1 service rate (μ1).
    pub service_rate_1: f64,
    /// Station 2 service rate (μ2).
    pub service_rate_2: f64,
    /// Simulation time at which the terminal event stops the run.
    pub horizon: f64,
}

impl TandemConfig {
    /// λ = 1, mean service 0.7 and 0.9, run to one million time units.
    pub fn standard() -> Self {
        TandemConfig {
            arrival_rate: 1.0,
            service_rate_1: 1.0 / 0.7,
            service_rate_2: 1.0 / 0.9,
            horizon: 1_000_000.0,
        }
    }

    /// Explicit rates with the standard horizon.
    pub fn new(arrival_rate: f64, service_rate_1: f64, service_rate_2: f64) -> Self {
        TandemConfig {
            arrival_rate,
            service_rate_1,
            service_rate_2,
            ..Self::standard()
        }
    }

    /// Set the horizon.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Offered load λ/μ1 at station 1.
    pub fn load_1(&self) -> f64 {
        self.arrival_rate / self.service_rate_1
    }

    /// Offered load λ/μ2 at station 2.
    pub fn load_2(&self) -> f64 {
        self.arrival_rate / self.service_rate_2
    }

    /// Every rate and the horizon must be finite and strictly positive.
    pub fn validate(&self) -> SimResult<()> {
        let fields = [
            ("arrival_rate", self.arrival_rate),
            ("service_rate_1", self.service_rate_1),
            ("service_rate_2", self.service_rate_2),
            ("horizon", self.horizon),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite and > 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for TandemConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_loads() {
        let cfg = TandemConfig::standard();
        assert!((cfg.load_1() - 0.7).abs() < 1e-12);
        assert!((cfg.load_2() - 0.9).abs() < 1e-12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = TandemConfig::new(0.5, 1.0, 2.0).with_horizon(100.0);
        assert_eq!(cfg.horizon, 100.0);
        assert_eq!(cfg.load_2(), 0.25);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TandemConfig::new(0.0, 1.0, 1.0),
            TandemConfig::new(1.0, -1.0, 1.0),
            TandemConfig::new(1.0, 1.0, f64::NAN),
            TandemConfig::standard().with_horizon(f64::INFINITY),
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
        }
    }
}
