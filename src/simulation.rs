//! Orchestration of repeated SRSWOR trials in sequential and parallel modes.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::aggregate::{aggregate, MonteCarloEstimates, MonteCarloSummary};
use crate::data::{Population, PopulationBuilder};
use crate::error::{Result, SimulationError};
use crate::options::{DegeneratePolicy, SimulationOptions};
use crate::sampling::{draw, trial_rng};
use crate::trial::{evaluate, TrialResult};

/// A validated Monte Carlo study: a population, a trial count and a sample size.
#[derive(Clone, Debug)]
pub struct Simulation {
    population: Population,
    trials: usize,
    sample_size: usize,
}

impl Simulation {
    /// Validates the run configuration before any trial is executed.
    pub fn new(population: Population, trials: usize, sample_size: usize) -> Result<Self> {
        if trials == 0 {
            return Err(SimulationError::NoTrials);
        }
        if sample_size == 0 {
            return Err(SimulationError::EmptySample {
                context: "sample",
            });
        }
        if sample_size > population.size() {
            return Err(SimulationError::SampleTooLarge {
                sample_size,
                population: population.size(),
            });
        }
        Ok(Self {
            population,
            trials,
            sample_size,
        })
    }

    /// Accessor for the population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of Monte Carlo trials `R`.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Units drawn per trial, before nonresponse filtering.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Runs trials `0..R` one after another on the calling thread.
    pub fn run_sequential(&self, options: &SimulationOptions) -> Result<SimulationResults> {
        options.validate()?;
        info!(
            "running {} sequential trials (n = {}, N = {}, seed = {})",
            self.trials,
            self.sample_size,
            self.population.size(),
            options.seed
        );
        let trials = (0..self.trials)
            .map(|trial| self.run_trial(trial, options))
            .collect::<Result<Vec<_>>>()?;
        self.finish(trials, options)
    }

    /// Runs all trials on a dedicated pool of `options.workers` threads.
    ///
    /// Per-trial records are identical to [`run_sequential`](Self::run_sequential)
    /// for the same seed.
    pub fn run_parallel(&self, options: &SimulationOptions) -> Result<SimulationResults> {
        options.validate()?;
        info!(
            "running {} trials on {} workers (n = {}, N = {}, seed = {})",
            self.trials,
            options.workers,
            self.sample_size,
            self.population.size(),
            options.seed
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()?;
        let trials = pool.install(|| {
            (0..self.trials)
                .into_par_iter()
                .map(|trial| self.run_trial(trial, options))
                .collect::<Vec<_>>()
        });
        // Surface the lowest-indexed failure so both modes report the same trial.
        let trials = trials.into_iter().collect::<Result<Vec<_>>>()?;
        self.finish(trials, options)
    }

    fn run_trial(&self, trial: usize, options: &SimulationOptions) -> Result<TrialResult> {
        let mut rng = trial_rng(options.seed, trial);
        let sample = draw(self.population.size(), self.sample_size, &mut rng)?;
        let result = evaluate(&self.population, &sample, options.critical_value);

        if let Some(reason) = result.degeneracy {
            debug!(
                "trial {trial} degenerate with {} respondents: {reason}",
                result.num_response
            );
            if options.degenerate == DegeneratePolicy::Fail {
                return Err(SimulationError::DegenerateTrial {
                    trial,
                    observed: result.num_response,
                    reason,
                });
            }
        }
        Ok(result)
    }

    fn finish(
        &self,
        trials: Vec<TrialResult>,
        options: &SimulationOptions,
    ) -> Result<SimulationResults> {
        let summary = aggregate(&trials, self.population.mean_y())?;
        if summary.degenerate_trials > 0 {
            warn!(
                "{} of {} trials were degenerate; policy {:?}",
                summary.degenerate_trials, summary.trials, options.degenerate
            );
        }
        info!(
            "finished {} trials: HT.mean = {:.6}, num.response = {:.3}",
            summary.trials, summary.estimates.ht_mean, summary.estimates.num_response
        );
        Ok(SimulationResults { trials, summary })
    }
}

/// Per-trial records of one run, indexed by trial, and their reduction.
#[derive(Clone, Debug)]
pub struct SimulationResults {
    trials: Vec<TrialResult>,
    summary: MonteCarloSummary,
}

impl SimulationResults {
    /// Record written by each trial, in trial order.
    pub fn trials(&self) -> &[TrialResult] {
        &self.trials
    }

    /// Monte Carlo means and diagnostics of the run.
    pub fn summary(&self) -> &MonteCarloSummary {
        &self.summary
    }

    /// The five Monte Carlo means returned to the host.
    pub fn estimates(&self) -> MonteCarloEstimates {
        self.summary.estimates
    }
}

/// Sequential entry point taking 1-based response indices.
///
/// Runs with [`SimulationOptions::default`], whose seed is fixed: repeated
/// calls with the same inputs return the same estimates. Use
/// [`simulation_with_options`] to vary the seed.
pub fn simulation(
    trials: usize,
    sample_size: usize,
    y: Vec<f64>,
    x: Vec<f64>,
    response_index: Vec<usize>,
) -> Result<MonteCarloEstimates> {
    let simulation = host_simulation(trials, sample_size, y, x, response_index)?;
    Ok(simulation
        .run_sequential(&SimulationOptions::default())?
        .estimates())
}

/// Parallel entry point taking 1-based response indices.
///
/// Runs with [`SimulationOptions::default`] (fixed seed, default pool size),
/// so repeated calls with the same inputs return the same estimates and match
/// [`simulation`].
pub fn simulation_p(
    trials: usize,
    sample_size: usize,
    y: Vec<f64>,
    x: Vec<f64>,
    response_index: Vec<usize>,
) -> Result<MonteCarloEstimates> {
    let simulation = host_simulation(trials, sample_size, y, x, response_index)?;
    Ok(simulation
        .run_parallel(&SimulationOptions::default())?
        .estimates())
}

/// Entry point taking 1-based response indices and explicit options.
///
/// `parallel` selects [`Simulation::run_parallel`] over
/// [`Simulation::run_sequential`].
pub fn simulation_with_options(
    trials: usize,
    sample_size: usize,
    y: Vec<f64>,
    x: Vec<f64>,
    response_index: Vec<usize>,
    options: &SimulationOptions,
    parallel: bool,
) -> Result<MonteCarloEstimates> {
    let simulation = host_simulation(trials, sample_size, y, x, response_index)?;
    let results = if parallel {
        simulation.run_parallel(options)?
    } else {
        simulation.run_sequential(options)?
    };
    Ok(results.estimates())
}

fn host_simulation(
    trials: usize,
    sample_size: usize,
    y: Vec<f64>,
    x: Vec<f64>,
    response_index: Vec<usize>,
) -> Result<Simulation> {
    let population = PopulationBuilder::new(y, x)
        .response_indices_one_based(response_index)
        .build()?;
    Simulation::new(population, trials, sample_size)
}
