//! Three-sigma statistical baseline
//!
//! Scores raw (unscaled) features against the per-feature mean and standard
//! deviation of the normal-operation corpus.

use serde::{Deserialize, Serialize};

use reflow_core::constants::thresholds::{Z_SCORE_EPSILON, Z_SCORE_THRESHOLD};

use crate::errors::{ensure_finite, matrix_width, MlError, MlResult};
use crate::stats::{column, mean, percentile, std_dev};

/// Per-feature summary of the normal corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalBaseline {
    mean: Vec<f64>,
    std: Vec<f64>,
    p95: Vec<f64>,
    p99: Vec<f64>,
    threshold: f64,
}

impl StatisticalBaseline {
    /// Summarize a corpus with the default three-sigma threshold
    pub fn fit(rows: &[Vec<f64>]) -> MlResult<Self> {
        Self::fit_with_threshold(rows, Z_SCORE_THRESHOLD)
    }

    /// Summarize a corpus with a custom z-score threshold
    pub fn fit_with_threshold(rows: &[Vec<f64>], threshold: f64) -> MlResult<Self> {
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(MlError::InvalidConfig(format!(
                "z-score threshold must be positive, got {threshold}"
            )));
        }
        let width = matrix_width(rows)?;
        for row in rows {
            ensure_finite(row, None)?;
        }

        let columns: Vec<Vec<f64>> = (0..width).map(|j| column(rows, j)).collect();
        Ok(Self {
            mean: columns.iter().map(|c| mean(c)).collect(),
            std: columns.iter().map(|c| std_dev(c)).collect(),
            p95: columns.iter().map(|c| percentile(c, 95.0)).collect(),
            p99: columns.iter().map(|c| percentile(c, 99.0)).collect(),
            threshold,
        })
    }

    /// Largest absolute z-score across features
    pub fn max_z_score(&self, row: &[f64]) -> MlResult<f64> {
        if row.len() != self.mean.len() {
            return Err(MlError::DimensionMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| ((x - m) / (s + Z_SCORE_EPSILON)).abs())
            .fold(0.0, f64::max))
    }

    /// True when the score exceeds the threshold
    pub fn is_anomaly(&self, max_z: f64) -> bool {
        max_z > self.threshold
    }

    /// Feature means
    pub fn means(&self) -> &[f64] {
        &self.mean
    }

    /// Feature standard deviations
    pub fn std_devs(&self) -> &[f64] {
        &self.std
    }

    /// 95th percentiles
    pub fn p95(&self) -> &[f64] {
        &self.p95
    }

    /// 99th percentiles
    pub fn p99(&self) -> &[f64] {
        &self.p99
    }

    /// Z-score threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
