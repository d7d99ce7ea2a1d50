//! Reduction of per-trial records into Monte Carlo means.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::trial::TrialResult;

/// The five Monte Carlo means handed back to the calling environment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloEstimates {
    /// Mean OLS intercept.
    pub intercept: f64,
    /// Mean OLS slope.
    pub slope: f64,
    /// Mean of the HT mean estimates.
    #[serde(rename = "HT.mean")]
    pub ht_mean: f64,
    /// Mean of the HT variance estimates.
    #[serde(rename = "var.HT.mean")]
    pub var_ht_mean: f64,
    /// Mean number of responding units per trial.
    #[serde(rename = "num.response")]
    pub num_response: f64,
}

impl MonteCarloEstimates {
    /// Field names as exposed to the host, in output order.
    pub const FIELD_NAMES: [&'static str; 5] =
        ["intercept", "slope", "HT.mean", "var.HT.mean", "num.response"];

    /// Flat `(name, value)` view in [`FIELD_NAMES`](Self::FIELD_NAMES) order.
    pub fn to_named_fields(&self) -> [(&'static str, f64); 5] {
        let [intercept, slope, ht_mean, var_ht_mean, num_response] = Self::FIELD_NAMES;
        [
            (intercept, self.intercept),
            (slope, self.slope),
            (ht_mean, self.ht_mean),
            (var_ht_mean, self.var_ht_mean),
            (num_response, self.num_response),
        ]
    }
}

/// Number of trials that contributed to each Monte Carlo mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributingTrials {
    /// Trials with a defined intercept and slope.
    pub regression: usize,
    /// Trials with at least one responding unit.
    pub ht_mean: usize,
    /// Trials with at least two responding units.
    pub var_ht_mean: usize,
    /// Trials with a coverage indicator.
    pub coverage: usize,
}

/// Full reduction of a run: the host-facing estimates plus diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    /// The five host-facing Monte Carlo means.
    pub estimates: MonteCarloEstimates,
    /// Share of trials whose interval covered the population mean, if any trial had one.
    pub coverage_probability: Option<f64>,
    /// Target of the HT mean estimator.
    pub population_mean: f64,
    /// Number of trials `R`.
    pub trials: usize,
    /// Trials with at least one undefined estimate.
    pub degenerate_trials: usize,
    /// Per-field counts of trials that entered each mean.
    pub contributing: ContributingTrials,
}

#[derive(Default)]
struct FieldMean {
    sum: f64,
    count: usize,
}

impl FieldMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    fn require(&self, field: &'static str) -> Result<f64> {
        self.mean().ok_or(SimulationError::NoUsableTrials { field })
    }
}

/// Averages every field over the trials that produced it.
pub fn aggregate(trials: &[TrialResult], population_mean: f64) -> Result<MonteCarloSummary> {
    if trials.is_empty() {
        return Err(SimulationError::NoTrials);
    }

    let mut intercept = FieldMean::default();
    let mut slope = FieldMean::default();
    let mut ht_mean = FieldMean::default();
    let mut var_ht_mean = FieldMean::default();
    let mut num_response = FieldMean::default();
    let mut coverage = FieldMean::default();
    let mut degenerate_trials = 0usize;

    for trial in trials {
        intercept.push(trial.coefficients.map(|c| c.intercept));
        slope.push(trial.coefficients.map(|c| c.slope));
        ht_mean.push(trial.ht_mean);
        var_ht_mean.push(trial.var_ht_mean);
        num_response.push(Some(trial.num_response as f64));
        coverage.push(trial.covers_population_mean.map(|c| if c { 1.0 } else { 0.0 }));
        if trial.is_degenerate() {
            degenerate_trials += 1;
        }
    }

    let estimates = MonteCarloEstimates {
        intercept: intercept.require("intercept")?,
        slope: slope.require("slope")?,
        ht_mean: ht_mean.require("HT.mean")?,
        var_ht_mean: var_ht_mean.require("var.HT.mean")?,
        num_response: num_response.require("num.response")?,
    };

    Ok(MonteCarloSummary {
        estimates,
        coverage_probability: coverage.mean(),
        population_mean,
        trials: trials.len(),
        degenerate_trials,
        contributing: ContributingTrials {
            regression: intercept.count,
            ht_mean: ht_mean.count,
            var_ht_mean: var_ht_mean.count,
            coverage: coverage.count,
        },
    })
}
