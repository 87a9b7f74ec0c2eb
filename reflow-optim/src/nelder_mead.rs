//! Box-clamped Nelder-Mead simplex search
//!
//! Standard reflection, expansion, contraction and shrink steps
//! (coefficients 1, 2, 0.5, 0.5). Every vertex is projected onto the box
//! before it is evaluated, so the search never leaves the feasible region.

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::solution::Solution;

/// Simplex search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Iteration budget per dimension
    pub iterations_per_dim: usize,
    /// Stop when every vertex is within this distance of the best, per coordinate
    pub x_tolerance: f64,
    /// Stop when every vertex value is within this of the best
    pub f_tolerance: f64,
    /// Initial simplex edge as a fraction of each coordinate's range
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            iterations_per_dim: 200,
            x_tolerance: 1e-4,
            f_tolerance: 1e-4,
            initial_step: 0.05,
        }
    }
}

/// Local derivative-free minimizer
#[derive(Debug, Clone, Default)]
pub struct NelderMead {
    config: NelderMeadConfig,
}

impl NelderMead {
    /// Minimizer with custom settings
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    /// Minimize `f` from `x0`, staying inside `bounds`
    pub fn minimize<F>(&self, f: &F, x0: &[f64], bounds: &Bounds) -> Solution
    where
        F: Fn(&[f64]) -> f64,
    {
        let dims = bounds.dims();
        let mut evaluations = 0;
        let mut eval = |x: &[f64]| {
            evaluations += 1;
            let v = f(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };

        let mut start = x0.to_vec();
        bounds.clamp(&mut start);

        let mut simplex = vec![start.clone()];
        for j in 0..dims {
            let (lo, hi) = bounds.range(j);
            let step = (hi - lo) * self.config.initial_step;
            let mut vertex = start.clone();
            // step away from the nearer wall
            vertex[j] = if vertex[j] + step <= hi { vertex[j] + step } else { vertex[j] - step };
            bounds.clamp(&mut vertex);
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

        let budget = self.config.iterations_per_dim * dims.max(1);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < budget {
            order(&mut simplex, &mut values);
            if self.done(&simplex, &values) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = dims;
            let centroid: Vec<f64> = (0..dims)
                .map(|j| simplex[..worst].iter().map(|v| v[j]).sum::<f64>() / dims as f64)
                .collect();
            let towards = |coefficient: f64| -> Vec<f64> {
                let mut point: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex[worst])
                    .map(|(c, w)| c + coefficient * (c - w))
                    .collect();
                bounds.clamp(&mut point);
                point
            };

            let reflected = towards(1.0);
            let f_reflected = eval(&reflected);

            if f_reflected < values[0] {
                let expanded = towards(2.0);
                let f_expanded = eval(&expanded);
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
                continue;
            }
            if f_reflected < values[worst - 1] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
                continue;
            }

            let (contracted, f_contracted, accept_below) = if f_reflected < values[worst] {
                let outside = towards(0.5);
                let value = eval(&outside);
                (outside, value, f_reflected)
            } else {
                let inside = towards(-0.5);
                let value = eval(&inside);
                (inside, value, values[worst])
            };
            if f_contracted <= accept_below {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
                continue;
            }

            let best = simplex[0].clone();
            for k in 1..=dims {
                let mut shrunk: Vec<f64> = best
                    .iter()
                    .zip(&simplex[k])
                    .map(|(b, v)| b + 0.5 * (v - b))
                    .collect();
                bounds.clamp(&mut shrunk);
                values[k] = eval(&shrunk);
                simplex[k] = shrunk;
            }
        }

        order(&mut simplex, &mut values);
        Solution {
            x: simplex.swap_remove(0),
            fun: values[0],
            iterations,
            evaluations,
            converged,
        }
    }

    fn done(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        let f_spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0, f64::max);
        x_spread <= self.config.x_tolerance && f_spread <= self.config.f_tolerance
    }
}

fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut pairs: Vec<(Vec<f64>, f64)> = simplex.drain(..).zip(values.drain(..)).collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    for (vertex, value) in pairs {
        simplex.push(vertex);
        values.push(value);
    }
}
