//! Per-feature standardization
//!
//! Parameters are fit once on the training corpus and frozen. Scoring with
//! parameters refit on the query would make every query look normal, so the
//! scaler has no refit path after [`StandardScaler::fit`].

use serde::{Deserialize, Serialize};

use crate::errors::{matrix_width, MlError, MlResult};
use crate::stats::{column, mean, std_dev};

/// Zero-mean, unit-variance transform
///
/// Constant columns keep a scale of 1 so they map to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations
    pub fn fit(rows: &[Vec<f64>]) -> MlResult<Self> {
        let width = matrix_width(rows)?;

        let (means, scales) = (0..width)
            .map(|j| {
                let col = column(rows, j);
                let std = std_dev(&col);
                (mean(&col), if std > 0.0 { std } else { 1.0 })
            })
            .unzip();

        Ok(Self { means, scales })
    }

    /// Number of features
    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Fitted column means
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted column scales
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize one row
    pub fn transform(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        self.check(row)?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Standardize a batch
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> MlResult<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    /// Map a standardized row back to raw units
    pub fn inverse_transform(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        self.check(row)?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(z, (m, s))| z * s + m)
            .collect())
    }

    fn check(&self, row: &[f64]) -> MlResult<()> {
        if row.len() != self.width() {
            return Err(MlError::DimensionMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}
