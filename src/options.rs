//! Run configuration: seeding, worker pool size and the degenerate-trial policy.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Worker count used by parallel runs unless overridden.
pub const DEFAULT_WORKERS: usize = 5;

/// Two-sided 95% standard normal quantile.
pub const DEFAULT_CRITICAL_VALUE: f64 = 1.959_963_984_540_054;

/// What to do with trials whose observed sample is too small for some estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Leave undefined fields out of their Monte Carlo mean.
    #[default]
    Exclude,
    /// Abort the run at the first degenerate trial.
    Fail,
}

/// Configuration shared by sequential and parallel runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Run seed; trial `r` draws from a stream derived from `(seed, r)`.
    pub seed: u64,
    /// Size of the worker pool used by parallel runs.
    pub workers: usize,
    /// Handling of trials with undefined estimates.
    pub degenerate: DegeneratePolicy,
    /// Normal quantile defining the coverage interval `mean ± z * se`.
    pub critical_value: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            workers: DEFAULT_WORKERS,
            degenerate: DegeneratePolicy::Exclude,
            critical_value: DEFAULT_CRITICAL_VALUE,
        }
    }
}

impl SimulationOptions {
    /// Override the run seed while preserving other defaults.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of worker threads for parallel runs.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Choose how degenerate trials are handled.
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Set the critical value of the coverage interval.
    pub fn with_critical_value(mut self, critical_value: f64) -> Self {
        self.critical_value = critical_value;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SimulationError::invalid_option(
                "workers",
                "at least one worker is required",
            ));
        }
        if !(self.critical_value.is_finite() && self.critical_value > 0.0) {
            return Err(SimulationError::invalid_option(
                "critical_value",
                "must be finite and positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = SimulationOptions::default();
        assert_eq!(options.workers, DEFAULT_WORKERS);
        assert_eq!(options.degenerate, DegeneratePolicy::Exclude);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let options = SimulationOptions::default().with_workers(0);
        assert!(matches!(
            options.validate(),
            Err(SimulationError::InvalidOption { option: "workers", .. })
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: SimulationOptions =
            serde_json::from_str(r#"{"seed": 9, "degenerate": "fail"}"#).unwrap();
        assert_eq!(options.seed, 9);
        assert_eq!(options.degenerate, DegeneratePolicy::Fail);
        assert_eq!(options.workers, DEFAULT_WORKERS);
    }
}
