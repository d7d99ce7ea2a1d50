//! Monte Carlo evaluation of survey estimators under simple random sampling
//! without replacement (SRSWOR) from a finite population with nonresponse.
//!
//! Each trial draws a sample from the population, keeps the units that
//! respond, and computes
//!
//! - the OLS intercept and slope of `y` on `x` (`trial` module),
//! - the Horvitz–Thompson mean of `y` under equal-probability sampling,
//! - its finite-population-corrected variance estimate, and
//! - the number of responding units.
//!
//! The per-trial records are reduced into Monte Carlo means (`aggregate`
//! module). Runs can be executed sequentially or on a fixed-size worker pool
//! (`simulation` module); each trial draws from its own seeded stream, so both
//! modes yield identical per-trial records for the same seed.
//!
//! # Quick start
//!
//! ```no_run
//! use srswor_sim::data::PopulationBuilder;
//! use srswor_sim::{Simulation, SimulationOptions};
//!
//! let y: Vec<f64> = (0..100).map(|i| i as f64).collect();
//! let x = y.clone();
//!
//! // Units 1..=60 respond; indices are 1-based at this boundary.
//! let population = PopulationBuilder::new(y, x)
//!     .response_indices_one_based((1..=60).collect())
//!     .build()
//!     .expect("validated population");
//!
//! let simulation = Simulation::new(population, 1_000, 10).expect("valid study");
//! let options = SimulationOptions::default().with_seed(2022).with_workers(5);
//! let results = simulation.run_parallel(&options).expect("completed run");
//!
//! for (name, value) in results.estimates().to_named_fields() {
//!     println!("{name}: {value}");
//! }
//! ```

pub mod aggregate;
pub mod data;
pub mod error;
pub mod options;
pub mod sampling;
pub mod simulation;
pub mod trial;

pub use aggregate::{MonteCarloEstimates, MonteCarloSummary};
pub use error::{Result, SimulationError};
pub use options::{DegeneratePolicy, SimulationOptions};
pub use simulation::{
    simulation, simulation_p, simulation_with_options, Simulation, SimulationResults,
};
pub use trial::{Degeneracy, TrialResult};
