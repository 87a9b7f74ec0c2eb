//! Differential evolution (best/1/bin)
//!
//! ## Algorithm
//!
//! ```text
//! population: 15 · dims points, Latin hypercube in the unit cube
//! each generation:
//!   F ~ U[0.5, 1)                       (dither, one draw per generation)
//!   mutant_i = best + F · (x_r1 − x_r2)
//!   trial_i  = binomial crossover(x_i, mutant_i, CR = 0.7)
//!   keep trial_i if f(trial_i) ≤ f(x_i)
//! stop when std(f) ≤ tol · |mean(f)| or after max_generations
//! ```
//!
//! Trial vectors are generated sequentially from one seeded stream and then
//! evaluated as a batch with rayon. The outcome depends only on the seed, not
//! on thread count. Coordinates that leave the unit cube are redrawn
//! uniformly.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult};

use crate::bounds::Bounds;
use crate::solution::Solution;

/// Differential evolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferentialEvolutionConfig {
    /// Population size per dimension
    pub population_factor: usize,
    /// Dither range for the mutation factor
    pub mutation: (f64, f64),
    /// Crossover probability
    pub crossover: f64,
    /// Generation budget
    pub max_generations: usize,
    /// Relative convergence tolerance on population energies
    pub tolerance: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for DifferentialEvolutionConfig {
    fn default() -> Self {
        Self {
            population_factor: 15,
            mutation: (0.5, 1.0),
            crossover: 0.7,
            max_generations: 50,
            tolerance: 0.01,
            seed: 42,
        }
    }
}

impl DifferentialEvolutionConfig {
    fn validate(&self) -> DecisionResult<()> {
        let (lo, hi) = self.mutation;
        if self.population_factor == 0 {
            return Err(DecisionError::validation("population factor must be positive"));
        }
        if !(0.0..=2.0).contains(&lo) || !(lo..=2.0).contains(&hi) {
            return Err(DecisionError::validation(format!(
                "mutation range ({lo}, {hi}) must be ordered within [0, 2]"
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover) {
            return Err(DecisionError::validation(format!(
                "crossover {} outside [0, 1]",
                self.crossover
            )));
        }
        Ok(())
    }
}

/// Population-based global minimizer
#[derive(Debug, Clone, Default)]
pub struct DifferentialEvolution {
    config: DifferentialEvolutionConfig,
}

impl DifferentialEvolution {
    /// Minimizer with custom settings
    pub fn new(config: DifferentialEvolutionConfig) -> Self {
        Self { config }
    }

    /// Settings
    pub fn config(&self) -> &DifferentialEvolutionConfig {
        &self.config
    }

    /// Minimize `f` over `bounds`
    pub fn minimize<F>(&self, f: F, bounds: &Bounds) -> DecisionResult<Solution>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        self.config.validate()?;
        let dims = bounds.dims();
        // best/1 needs the candidate plus two distinct donors
        let size = (self.config.population_factor * dims).max(4);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut population = latin_hypercube(size, dims, &mut rng);
        let mut energies = evaluate(&f, bounds, &population);
        let mut evaluations = size;
        let mut best = argmin(&energies);

        let mut generation = 0;
        let mut converged = has_converged(&energies, self.config.tolerance);
        while !converged && generation < self.config.max_generations {
            generation += 1;

            let (lo, hi) = self.config.mutation;
            let scale = if hi > lo { rng.gen_range(lo..hi) } else { lo };
            let trials: Vec<Vec<f64>> = (0..size)
                .map(|i| self.trial(i, best, scale, &population, &mut rng))
                .collect();

            let trial_energies = evaluate(&f, bounds, &trials);
            evaluations += size;

            for (i, (trial, energy)) in trials.into_iter().zip(trial_energies).enumerate() {
                if energy <= energies[i] {
                    population[i] = trial;
                    energies[i] = energy;
                }
            }
            best = argmin(&energies);
            converged = has_converged(&energies, self.config.tolerance);
        }

        if !converged {
            warn!(
                "differential evolution stopped after {} generations without converging",
                generation
            );
        }
        debug!(
            "differential evolution: f = {:.6} after {} generations, {} evaluations",
            energies[best], generation, evaluations
        );

        Ok(Solution {
            x: bounds.from_unit(&population[best]),
            fun: energies[best],
            iterations: generation,
            evaluations,
            converged,
        })
    }

    fn trial(
        &self,
        i: usize,
        best: usize,
        scale: f64,
        population: &[Vec<f64>],
        rng: &mut ChaCha8Rng,
    ) -> Vec<f64> {
        let size = population.len();
        let dims = population[i].len();

        let donors: Vec<usize> = (0..size).filter(|&k| k != i).collect();
        let picked: Vec<usize> = donors.choose_multiple(rng, 2).copied().collect();
        let (r1, r2) = (picked[0], picked[1]);

        let mut trial = population[i].clone();
        let forced = rng.gen_range(0..dims);
        for j in 0..dims {
            if j == forced || rng.gen::<f64>() < self.config.crossover {
                let v = population[best][j] + scale * (population[r1][j] - population[r2][j]);
                trial[j] = if (0.0..=1.0).contains(&v) { v } else { rng.gen() };
            }
        }
        trial
    }
}

fn latin_hypercube(size: usize, dims: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let mut population = vec![vec![0.0; dims]; size];
    for j in 0..dims {
        let mut strata: Vec<usize> = (0..size).collect();
        strata.shuffle(rng);
        for (member, stratum) in population.iter_mut().zip(strata) {
            member[j] = (stratum as f64 + rng.gen::<f64>()) / size as f64;
        }
    }
    population
}

fn evaluate<F>(f: &F, bounds: &Bounds, points: &[Vec<f64>]) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    points
        .par_iter()
        .map(|u| {
            let value = f(&bounds.from_unit(u));
            if value.is_nan() {
                f64::INFINITY
            } else {
                value
            }
        })
        .collect()
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |best, (i, v)| if *v < values[best] { i } else { best })
}

fn has_converged(energies: &[f64], tolerance: f64) -> bool {
    if energies.iter().any(|e| !e.is_finite()) {
        return false;
    }
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let std = (energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n).sqrt();
    std <= tolerance * mean.abs()
}
