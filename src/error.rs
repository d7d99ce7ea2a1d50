use thiserror::Error;

use crate::trial::Degeneracy;

/// Unified error type for simulation runs.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Raised when provided vectors have incompatible lengths.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required length, usually the population size.
        expected: usize,
        /// The length that was actually supplied.
        found: usize,
    },

    /// Raised when more units are requested than the population holds.
    #[error("sample size {sample_size} exceeds population size {population}")]
    SampleTooLarge { sample_size: usize, population: usize },

    /// Raised when a zero sample size or an empty population is supplied.
    #[error("{context} must contain at least one unit")]
    EmptySample { context: &'static str },

    /// Raised when a run is configured with zero trials.
    #[error("at least one Monte Carlo trial is required")]
    NoTrials,

    /// Raised when a response index does not address a population unit.
    #[error("response index {index} is outside the population range [0, {population})")]
    ResponseIndexOutOfRange { index: usize, population: usize },

    /// Raised when a 1-based response index of zero is supplied.
    #[error("1-based response index at position {position} is zero")]
    ZeroBasedResponseIndex { position: usize },

    /// Raised when population values contain NaN or infinities.
    #[error("{context} value at index {index} is not finite ({value})")]
    NonFiniteValue {
        context: &'static str,
        index: usize,
        value: f64,
    },

    /// Raised when a simulation option is outside its admissible range.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },

    /// Raised under the failing policy when a trial cannot produce every estimate.
    #[error("trial {trial} is degenerate with {observed} responding units: {reason}")]
    DegenerateTrial {
        /// Index of the offending trial.
        trial: usize,
        /// Observed (responding) sample size of that trial.
        observed: usize,
        /// What made the trial degenerate.
        reason: Degeneracy,
    },

    /// Raised when no trial produced a value for a summary field.
    #[error("no trial produced a usable value for `{field}`")]
    NoUsableTrials { field: &'static str },

    /// Raised when the worker pool for parallel runs cannot be created.
    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SimulationError {
    /// Helper to format a [`DimensionMismatch`](SimulationError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for rejecting an out-of-range option value.
    pub fn invalid_option(option: &'static str, reason: &'static str) -> Self {
        Self::InvalidOption { option, reason }
    }

    /// Whether the error was raised by input validation, before any trial ran.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::DegenerateTrial { .. } | Self::NoUsableTrials { .. } | Self::ThreadPool(_)
        )
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_configuration_errors() {
        assert!(SimulationError::NoTrials.is_configuration());
        assert!(SimulationError::dimension_mismatch("x length", 3, 2).is_configuration());
        let degenerate = SimulationError::DegenerateTrial {
            trial: 4,
            observed: 1,
            reason: Degeneracy::TooFewForRegression,
        };
        assert!(!degenerate.is_configuration());
        assert_eq!(
            degenerate.to_string(),
            "trial 4 is degenerate with 1 responding units: fewer than two responding units"
        );
    }
}
