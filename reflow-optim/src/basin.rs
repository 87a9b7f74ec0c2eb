//! Basin hopping around a local minimizer
//!
//! Starts with a local search from `x0`, then repeatedly perturbs the current
//! point by a uniform step in `[-step, step]` per coordinate, clamps it into
//! the box, runs the local search again and accepts the new basin with the
//! Metropolis rule at temperature `T`. The best basin visited is returned.
//! Each hop depends on the previous one, so hops run sequentially.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult};

use crate::bounds::Bounds;
use crate::nelder_mead::{NelderMead, NelderMeadConfig};
use crate::solution::Solution;

/// Basin hopping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasinHoppingConfig {
    /// Number of hops after the initial local search
    pub hops: usize,
    /// Metropolis temperature
    pub temperature: f64,
    /// Maximum displacement per coordinate
    pub step_size: f64,
    /// Local search
    pub local: NelderMeadConfig,
    /// Random seed
    pub seed: u64,
}

impl Default for BasinHoppingConfig {
    fn default() -> Self {
        Self {
            hops: 30,
            temperature: 1.0,
            step_size: 0.5,
            local: NelderMeadConfig::default(),
            seed: 42,
        }
    }
}

/// Local-restart global minimizer
#[derive(Debug, Clone, Default)]
pub struct BasinHopping {
    config: BasinHoppingConfig,
}

impl BasinHopping {
    /// Minimizer with custom settings
    pub fn new(config: BasinHoppingConfig) -> Self {
        Self { config }
    }

    /// Settings
    pub fn config(&self) -> &BasinHoppingConfig {
        &self.config
    }

    /// Minimize `f` over `bounds` starting from `x0`
    pub fn minimize<F>(&self, f: F, x0: &[f64], bounds: &Bounds) -> DecisionResult<Solution>
    where
        F: Fn(&[f64]) -> f64,
    {
        if x0.len() != bounds.dims() {
            return Err(DecisionError::validation(format!(
                "start point has {} coordinates, search space has {}",
                x0.len(),
                bounds.dims()
            )));
        }
        if self.config.temperature.is_nan() || self.config.temperature < 0.0 {
            return Err(DecisionError::validation("basin hopping temperature must be non-negative"));
        }

        let local = NelderMead::new(self.config.local.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut current = local.minimize(&f, x0, bounds);
        let mut evaluations = current.evaluations;
        let mut best = current.clone();
        let mut accepted = 0;

        for _ in 0..self.config.hops {
            let mut start: Vec<f64> = current
                .x
                .iter()
                .map(|v| v + rng.gen_range(-self.config.step_size..=self.config.step_size))
                .collect();
            bounds.clamp(&mut start);

            let candidate = local.minimize(&f, &start, bounds);
            evaluations += candidate.evaluations;

            if self.accept(candidate.fun, current.fun, &mut rng) {
                accepted += 1;
                current = candidate;
                if current.fun < best.fun {
                    best = current.clone();
                }
            }
        }

        debug!(
            "basin hopping: f = {:.6} after {} hops ({} accepted), {} evaluations",
            best.fun, self.config.hops, accepted, evaluations
        );

        Ok(Solution {
            iterations: self.config.hops,
            evaluations,
            ..best
        })
    }

    fn accept(&self, candidate: f64, current: f64, rng: &mut ChaCha8Rng) -> bool {
        if candidate < current {
            return true;
        }
        if self.config.temperature == 0.0 || !candidate.is_finite() {
            return false;
        }
        let p = (-(candidate - current) / self.config.temperature).exp();
        rng.gen::<f64>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two wells; the deeper one sits at x = 2
    fn double_well(x: &[f64]) -> f64 {
        let a = (x[0] + 1.0).powi(2);
        let b = (x[0] - 2.0).powi(2) - 0.5;
        a.min(b)
    }

    #[test]
    fn escapes_the_shallow_well() {
        let bounds = Bounds::new(vec![(-3.0, 3.0)]).unwrap();
        let config = BasinHoppingConfig {
            step_size: 3.0,
            ..BasinHoppingConfig::default()
        };

        let solution = BasinHopping::new(config).minimize(double_well, &[-1.0], &bounds).unwrap();

        assert!((solution.x[0] - 2.0).abs() < 1e-2, "x = {:?}", solution.x);
        assert!(solution.fun < -0.49);
        assert_eq!(solution.iterations, 30);
    }

    #[test]
    fn deterministic_under_seed() {
        let bounds = Bounds::new(vec![(-3.0, 3.0)]).unwrap();
        let bh = BasinHopping::default();

        assert_eq!(
            bh.minimize(double_well, &[0.0], &bounds).unwrap(),
            bh.minimize(double_well, &[0.0], &bounds).unwrap()
        );
    }

    #[test]
    fn start_point_must_match_space() {
        let bounds = Bounds::new(vec![(-3.0, 3.0)]).unwrap();
        assert!(BasinHopping::default().minimize(double_well, &[0.0, 1.0], &bounds).is_err());
    }
}
