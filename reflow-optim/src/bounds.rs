//! Box bounds for continuous search spaces

use rand::Rng;
use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult};

/// Inclusive `[min, max]` per coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    ranges: Vec<(f64, f64)>,
}

impl Bounds {
    /// Validate finite, ordered ranges
    pub fn new(ranges: Vec<(f64, f64)>) -> DecisionResult<Self> {
        if ranges.is_empty() {
            return Err(DecisionError::validation("search space has no dimensions"));
        }
        for (i, (lo, hi)) in ranges.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(DecisionError::validation(format!("bound {i} is not finite")));
            }
            if lo > hi {
                return Err(DecisionError::validation(format!(
                    "bound {i} has min {lo} above max {hi}"
                )));
            }
        }
        Ok(Self { ranges })
    }

    /// Unit cube of the given dimension
    pub fn unit(dims: usize) -> DecisionResult<Self> {
        Self::new(vec![(0.0, 1.0); dims])
    }

    /// Number of coordinates
    pub fn dims(&self) -> usize {
        self.ranges.len()
    }

    /// Range of coordinate `i`
    pub fn range(&self, i: usize) -> (f64, f64) {
        self.ranges[i]
    }

    /// All ranges
    pub fn ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    /// Centre of the box
    pub fn midpoint(&self) -> Vec<f64> {
        self.ranges.iter().map(|(lo, hi)| (lo + hi) / 2.0).collect()
    }

    /// True when every coordinate is inside its range
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dims()
            && x.iter().zip(&self.ranges).all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }

    /// Project a point onto the box in place
    pub fn clamp(&self, x: &mut [f64]) {
        for (v, (lo, hi)) in x.iter_mut().zip(&self.ranges) {
            *v = v.clamp(*lo, *hi);
        }
    }

    /// Map a point of the unit cube into the box
    pub fn from_unit(&self, u: &[f64]) -> Vec<f64> {
        u.iter()
            .zip(&self.ranges)
            .map(|(t, (lo, hi))| lo + t * (hi - lo))
            .collect()
    }

    /// Uniform sample from the box
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.ranges
            .iter()
            .map(|&(lo, hi)| if hi > lo { rng.gen_range(lo..=hi) } else { lo })
            .collect()
    }
}
