//! Anomaly score from path lengths
//!
//! ```text
//! s(x) = 2^(−E[h(x)] / c(ψ))
//! c(n) = 2·(ln(n − 1) + γ) − 2·(n − 1)/n     n > 2
//! ```
//!
//! `ψ` is the subsample size each tree was grown on. Scores near 1 are
//! isolated quickly; scores well below 0.5 sit deep inside the corpus.

use serde::{Deserialize, Serialize};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Forest verdict for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScore {
    /// Score in (0, 1]; higher is more anomalous
    pub score: f64,
    /// Mean path length across trees
    pub avg_path_length: f64,
    /// Trees averaged over
    pub num_trees: usize,
}

impl AnomalyScore {
    /// Bundle a score with its path statistics
    pub fn new(score: f64, avg_path_length: f64, num_trees: usize) -> Self {
        Self {
            score,
            avg_path_length,
            num_trees,
        }
    }

    /// Strictly above `threshold`
    pub fn is_anomaly(&self, threshold: f64) -> bool {
        self.score > threshold
    }
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn c_factor(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Score for a mean path length over trees grown on `sample_size` points
pub fn calculate_anomaly_score(avg_path_length: f64, sample_size: usize) -> f64 {
    let expected = c_factor(sample_size);
    if expected == 0.0 {
        return 0.5;
    }
    2.0_f64.powf(-avg_path_length / expected)
}
