//! Optimizer output shared by every search method

use serde::{Deserialize, Serialize};

/// Best point found by a minimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Minimizer
    pub x: Vec<f64>,
    /// Objective at `x`
    pub fun: f64,
    /// Generations, hops or simplex iterations performed
    pub iterations: usize,
    /// Objective evaluations performed
    pub evaluations: usize,
    /// True when the convergence test passed before the budget ran out
    pub converged: bool,
}

impl Solution {
    /// Lower objective wins; `self` wins ties
    pub fn better_of(self, other: Solution) -> Solution {
        if other.fun < self.fun {
            other
        } else {
            self
        }
    }
}
