use approx::assert_relative_eq;
use srswor_sim::data::{Population, PopulationBuilder};
use srswor_sim::{simulation, simulation_p, MonteCarloEstimates, Simulation, SimulationOptions};

fn identity_values(size: usize) -> Vec<f64> {
    (0..size).map(|i| i as f64).collect()
}

/// N = 100 with y_i = i, every unit responding, R = 1000 and n = 10.
#[test]
fn full_response_converges_to_population_mean() {
    let values = identity_values(100);
    let response = (1..=100).collect::<Vec<_>>();

    for estimates in [
        simulation(1_000, 10, values.clone(), values.clone(), response.clone()).unwrap(),
        simulation_p(1_000, 10, values.clone(), values.clone(), response.clone()).unwrap(),
    ] {
        assert_eq!(estimates.num_response, 10.0);
        assert_relative_eq!(estimates.ht_mean, 49.5, epsilon = 1.5);
        // y = x exactly, so every fit is the identity line.
        assert_relative_eq!(estimates.intercept, 0.0, epsilon = 1e-8);
        assert_relative_eq!(estimates.slope, 1.0, epsilon = 1e-10);
    }
}

/// E[var.HT.mean] equals the design variance (1 - n/N) S^2 / n under SRSWOR.
#[test]
fn variance_estimator_is_unbiased_for_design_variance() {
    let values = identity_values(100);
    let population = Population::full_response(values.clone(), values).unwrap();
    let simulation = Simulation::new(population, 4_000, 10).unwrap();
    let results = simulation
        .run_parallel(&SimulationOptions::default().with_seed(7))
        .unwrap();

    // S^2 of 0..99 with the n-1 denominator is 841.6667.
    let design_variance = (1.0 - 10.0 / 100.0) * (100.0 * 101.0 / 12.0) / 10.0;
    let estimates = results.estimates();
    assert_relative_eq!(estimates.var_ht_mean, design_variance, max_relative = 0.05);
    assert!(results
        .trials()
        .iter()
        .all(|t| t.var_ht_mean.is_some_and(|v| v >= 0.0)));
}

#[test]
fn noisy_regression_recovers_population_line() {
    let population = Population::synthetic_linear(500, 2.0, 3.0, 1.0, 11).unwrap();
    let simulation = Simulation::new(population, 500, 50).unwrap();
    let estimates = simulation
        .run_sequential(&SimulationOptions::default().with_seed(3))
        .unwrap()
        .estimates();

    assert_relative_eq!(estimates.slope, 3.0, epsilon = 0.01);
    assert_relative_eq!(estimates.intercept, 2.0, epsilon = 0.5);
}

#[test]
fn nonresponse_bounds_observed_sample_size() {
    let values = identity_values(50);
    let population = PopulationBuilder::new(values.clone(), values)
        .response_indices_one_based((1..=50).step_by(2).collect())
        .build()
        .unwrap();
    let simulation = Simulation::new(population, 300, 12).unwrap();
    let results = simulation
        .run_parallel(&SimulationOptions::default().with_workers(2))
        .unwrap();

    assert!(results
        .trials()
        .iter()
        .all(|t| t.num_response <= 12 && t.num_response <= 25));
    assert_relative_eq!(results.estimates().num_response, 6.0, epsilon = 0.5);
}

#[test]
fn coverage_is_near_nominal_level() {
    let population = Population::synthetic_linear(2_000, 0.0, 0.5, 10.0, 5).unwrap();
    let simulation = Simulation::new(population, 2_000, 100).unwrap();
    let summary = simulation
        .run_parallel(&SimulationOptions::default().with_seed(21))
        .unwrap()
        .summary()
        .clone();

    let coverage = summary.coverage_probability.expect("coverage defined");
    assert!((0.92..=0.98).contains(&coverage), "coverage {coverage}");
    assert_eq!(summary.contributing.coverage, 2_000);
}

#[test]
fn estimates_serialize_with_host_field_names() {
    let values = identity_values(20);
    let estimates = simulation(10, 5, values.clone(), values, (1..=20).collect()).unwrap();

    let json = serde_json::to_value(estimates).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 5);
    for name in MonteCarloEstimates::FIELD_NAMES {
        assert!(object.contains_key(name), "missing {name}");
    }
    assert_eq!(object["num.response"], 5.0);
}
