//! Finite-population containers and validation utilities used by the simulation engine.

use nalgebra::DVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, SimulationError};

/// Outcome and covariate values of a finite population together with the
/// units that respond when sampled.
#[derive(Clone, Debug)]
pub struct Population {
    y: DVector<f64>,
    x: DVector<f64>,
    /// Sorted, de-duplicated, 0-based.
    response: Vec<usize>,
    is_respondent: Vec<bool>,
    mean_y: f64,
}

impl Population {
    /// Creates a population in which every unit responds.
    pub fn full_response(y: Vec<f64>, x: Vec<f64>) -> Result<Self> {
        PopulationBuilder::new(y, x).build()
    }

    /// Builds a noisy linear population `y = intercept + slope * x + e` with
    /// `x = 0, 1, .., size - 1` and `e ~ N(0, noise_sd^2)`. Every unit responds.
    pub fn synthetic_linear(
        size: usize,
        intercept: f64,
        slope: f64,
        noise_sd: f64,
        seed: u64,
    ) -> Result<Self> {
        let noise = Normal::new(0.0, noise_sd)
            .map_err(|_| SimulationError::invalid_option("noise_sd", "must be finite and >= 0"))?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let x: Vec<f64> = (0..size).map(|i| i as f64).collect();
        let y = x
            .iter()
            .map(|xi| intercept + slope * xi + noise.sample(&mut rng))
            .collect();
        Self::full_response(y, x)
    }

    /// Number of units `N`.
    pub fn size(&self) -> usize {
        self.y.len()
    }

    /// Returns a read-only view of the outcome vector.
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Returns a read-only view of the covariate vector.
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// 0-based indices of responding units, in increasing order.
    pub fn response_indices(&self) -> &[usize] {
        &self.response
    }

    /// Number of responding units.
    pub fn respondent_count(&self) -> usize {
        self.response.len()
    }

    /// Whether unit `index` responds when sampled.
    pub fn responds(&self, index: usize) -> bool {
        self.is_respondent.get(index).copied().unwrap_or(false)
    }

    /// Population mean of `y`, the target of the HT mean estimator.
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }
}

/// Builder that validates lengths and response indices before constructing a [`Population`].
#[derive(Debug)]
pub struct PopulationBuilder {
    y: Vec<f64>,
    x: Vec<f64>,
    response: ResponseSet,
}

#[derive(Debug)]
enum ResponseSet {
    All,
    ZeroBased(Vec<usize>),
    OneBased(Vec<usize>),
}

impl PopulationBuilder {
    /// Start building a population from outcome and covariate values.
    pub fn new(y: Vec<f64>, x: Vec<f64>) -> Self {
        Self {
            y,
            x,
            response: ResponseSet::All,
        }
    }

    /// Restricts responding units to the given 0-based indices.
    pub fn response_indices(mut self, indices: Vec<usize>) -> Self {
        self.response = ResponseSet::ZeroBased(indices);
        self
    }

    /// Restricts responding units to the given 1-based indices, as supplied
    /// by statistical hosts that count from one.
    pub fn response_indices_one_based(mut self, indices: Vec<usize>) -> Self {
        self.response = ResponseSet::OneBased(indices);
        self
    }

    /// Finalizes construction after validating shapes and response indices.
    pub fn build(self) -> Result<Population> {
        let n = self.y.len();
        if n == 0 {
            return Err(SimulationError::EmptySample {
                context: "population",
            });
        }
        if self.x.len() != n {
            return Err(SimulationError::dimension_mismatch(
                "x length",
                n,
                self.x.len(),
            ));
        }
        check_finite("y", &self.y)?;
        check_finite("x", &self.x)?;

        let mut response = match self.response {
            ResponseSet::All => (0..n).collect(),
            ResponseSet::ZeroBased(indices) => indices,
            ResponseSet::OneBased(indices) => indices
                .into_iter()
                .enumerate()
                .map(|(position, index)| {
                    index
                        .checked_sub(1)
                        .ok_or(SimulationError::ZeroBasedResponseIndex { position })
                })
                .collect::<Result<Vec<_>>>()?,
        };
        response.sort_unstable();
        response.dedup();

        let mut is_respondent = vec![false; n];
        for &index in &response {
            let slot = is_respondent
                .get_mut(index)
                .ok_or(SimulationError::ResponseIndexOutOfRange {
                    index,
                    population: n,
                })?;
            *slot = true;
        }

        let y = DVector::from_vec(self.y);
        let mean_y = y.mean();

        Ok(Population {
            y,
            x: DVector::from_vec(self.x),
            response,
            is_respondent,
            mean_y,
        })
    }
}

fn check_finite(context: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SimulationError::NonFiniteValue {
            context,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
