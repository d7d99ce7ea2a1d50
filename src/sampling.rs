//! Simple random sampling without replacement and per-trial random streams.

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SimulationError};

/// Draws `sample_size` distinct indices uniformly from `0..population` (SRSWOR).
///
/// The order of the returned indices is unspecified.
pub fn draw<R: Rng + ?Sized>(
    population: usize,
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if sample_size > population {
        return Err(SimulationError::SampleTooLarge {
            sample_size,
            population,
        });
    }
    Ok(index::sample(rng, population, sample_size).into_vec())
}

/// Independent generator for trial `trial` of a run seeded with `seed`.
///
/// The stream depends only on `(seed, trial)`, so a trial draws the same
/// sample whichever worker executes it.
pub fn trial_rng(seed: u64, trial: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ splitmix(trial as u64))
}

fn splitmix(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn draw_returns_distinct_indices_in_range() {
        let mut rng = trial_rng(11, 0);
        for (population, sample_size) in [(1, 1), (10, 3), (50, 50), (1000, 17)] {
            let sample = draw(population, sample_size, &mut rng).unwrap();
            assert_eq!(sample.len(), sample_size);
            let unique: HashSet<_> = sample.iter().copied().collect();
            assert_eq!(unique.len(), sample_size);
            assert!(sample.iter().all(|&i| i < population));
        }
    }

    #[test]
    fn draw_rejects_oversized_samples() {
        let mut rng = trial_rng(11, 0);
        assert!(matches!(
            draw(4, 5, &mut rng),
            Err(SimulationError::SampleTooLarge {
                sample_size: 5,
                population: 4
            })
        ));
    }

    #[test]
    fn trial_streams_are_reproducible_and_distinct() {
        let a = draw(100, 10, &mut trial_rng(3, 7)).unwrap();
        let b = draw(100, 10, &mut trial_rng(3, 7)).unwrap();
        let c = draw(100, 10, &mut trial_rng(3, 8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn every_unit_is_eventually_drawn() {
        let mut counts = [0usize; 20];
        for trial in 0..2_000 {
            for i in draw(20, 5, &mut trial_rng(42, trial)).unwrap() {
                counts[i] += 1;
            }
        }
        // Expected 500 per unit.
        assert!(counts.iter().all(|&c| (400..600).contains(&c)));
    }
}
