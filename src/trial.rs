//! Per-trial estimators: OLS fit, Horvitz–Thompson mean and its variance.

use std::fmt;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::data::Population;

/// Reasons a trial cannot produce all of its estimates, from most to least severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Degeneracy {
    /// No sampled unit responded; nothing can be estimated.
    EmptySample,
    /// One responding unit: the mean exists but neither the regression nor the variance.
    TooFewForRegression,
    /// The covariate is (numerically) constant over responding units.
    SingularDesign,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Degeneracy::EmptySample => "no sampled unit responded",
            Degeneracy::TooFewForRegression => "fewer than two responding units",
            Degeneracy::SingularDesign => "covariate is constant over responding units",
        };
        f.write_str(message)
    }
}

/// Intercept and slope of the regression of `y` on `x`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Fitted value at `x = 0`.
    pub intercept: f64,
    /// Change in fitted `y` per unit of `x`.
    pub slope: f64,
}

/// Estimates produced by one Monte Carlo trial.
///
/// Fields that are undefined for the trial's observed sample are `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// OLS fit over the responding units, absent below two distinct covariate values.
    pub coefficients: Option<Coefficients>,
    /// Sample mean of the responding units' outcomes.
    pub ht_mean: Option<f64>,
    /// Finite-population-corrected variance estimate of `ht_mean`.
    pub var_ht_mean: Option<f64>,
    /// Number of sampled units that responded.
    pub num_response: usize,
    /// Whether the normal-theory interval around `ht_mean` contains the population mean.
    pub covers_population_mean: Option<bool>,
    /// Most severe degeneracy hit by this trial, if any.
    pub degeneracy: Option<Degeneracy>,
}

impl TrialResult {
    /// Whether any estimate of this trial is undefined.
    pub fn is_degenerate(&self) -> bool {
        self.degeneracy.is_some()
    }
}

/// Evaluates every estimator on one drawn sample.
///
/// `critical_value` is the normal quantile used for the coverage interval.
pub fn evaluate(population: &Population, sample: &[usize], critical_value: f64) -> TrialResult {
    let mut observed: Vec<usize> = sample
        .iter()
        .copied()
        .filter(|&i| population.responds(i))
        .collect();
    observed.sort_unstable();
    let n_obs = observed.len();

    let y = DVector::from_iterator(n_obs, observed.iter().map(|&i| population.y()[i]));
    let x = DVector::from_iterator(n_obs, observed.iter().map(|&i| population.x()[i]));

    let (coefficients, regression_issue) = match fit_ols(&y, &x) {
        Ok(coefficients) => (Some(coefficients), None),
        Err(reason) => (None, Some(reason)),
    };

    let ht_mean = (n_obs > 0).then(|| y.mean());
    let var_ht_mean = match ht_mean {
        Some(mean) if n_obs > 1 => {
            let fpc = 1.0 - n_obs as f64 / population.size() as f64;
            let s2 = y.iter().map(|yi| (yi - mean).powi(2)).sum::<f64>() / (n_obs - 1) as f64;
            Some(fpc * s2 / n_obs as f64)
        }
        _ => None,
    };

    let covers_population_mean = match (ht_mean, var_ht_mean) {
        (Some(mean), Some(variance)) => {
            Some((mean - population.mean_y()).abs() <= critical_value * variance.sqrt())
        }
        _ => None,
    };

    let degeneracy = if n_obs == 0 {
        Some(Degeneracy::EmptySample)
    } else {
        regression_issue
    };

    TrialResult {
        coefficients,
        ht_mean,
        var_ht_mean,
        num_response: n_obs,
        covers_population_mean,
        degeneracy,
    }
}

/// Least-squares fit of `y = intercept + slope * x` on the centred covariate.
///
/// The design counts as singular when the covariate's spread vanishes
/// relative to its magnitude, i.e. `Sxx <= eps * sum(x^2)`.
pub fn fit_ols(
    y: &DVector<f64>,
    x: &DVector<f64>,
) -> std::result::Result<Coefficients, Degeneracy> {
    let n = y.len();
    if n < 2 {
        return Err(if n == 0 {
            Degeneracy::EmptySample
        } else {
            Degeneracy::TooFewForRegression
        });
    }

    let x_bar = x.mean();
    let y_bar = y.mean();
    let dx = x.add_scalar(-x_bar);
    let dy = y.add_scalar(-y_bar);

    let sxx = dx.norm_squared();
    if sxx <= f64::EPSILON * x.norm_squared() {
        return Err(Degeneracy::SingularDesign);
    }
    let slope = dx.dot(&dy) / sxx;
    let intercept = y_bar - slope * x_bar;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(Degeneracy::SingularDesign);
    }
    Ok(Coefficients { intercept, slope })
}
