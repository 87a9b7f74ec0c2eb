//! Bootstrap regression forest
//!
//! Each tree is grown on a bootstrap resample of the corpus with every
//! feature considered at every split. The point prediction is the mean over
//! trees; the spread of per-tree predictions is the uncertainty.

use log::debug;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, matrix_width, MlError, MlResult};
use crate::regression::tree::{RegressionTree, TreeParams};
use crate::rng::derived;
use crate::stats::{mean, std_dev};

/// Forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionForestConfig {
    /// Number of trees
    pub num_trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for RegressionForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// Point estimate with its spread across trees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestPrediction {
    /// Mean of per-tree predictions
    pub mean: f64,
    /// Population standard deviation of per-tree predictions
    pub std_dev: f64,
}

/// Fitted regression forest
#[derive(Debug, Clone)]
pub struct RegressionForest {
    trees: Vec<RegressionTree>,
    width: usize,
}

impl RegressionForest {
    /// Fit on rows and targets
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: &RegressionForestConfig) -> MlResult<Self> {
        if rows.len() != targets.len() {
            return Err(MlError::LengthMismatch {
                samples: rows.len(),
                targets: targets.len(),
            });
        }
        if config.num_trees == 0 {
            return Err(MlError::InvalidConfig("regression forest needs at least one tree".to_string()));
        }
        let width = matrix_width(rows)?;
        for row in rows {
            ensure_finite(row, None)?;
        }
        ensure_finite(targets, None).map_err(|_| MlError::InvalidConfig("targets must be finite".to_string()))?;

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        };
        let n = rows.len();

        let trees = (0..config.num_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = derived(config.seed, i);
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, &bootstrap, params)
            })
            .collect::<MlResult<Vec<_>>>()?;

        debug!("regression forest: {} trees on {} samples", trees.len(), n);

        Ok(Self { trees, width })
    }

    /// Per-tree predictions for one row
    pub fn tree_predictions(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        if row.len() != self.width {
            return Err(MlError::DimensionMismatch {
                expected: self.width,
                actual: row.len(),
            });
        }
        Ok(self.trees.iter().map(|t| t.predict(row)).collect())
    }

    /// Mean prediction and its spread
    pub fn predict(&self, row: &[f64]) -> MlResult<ForestPrediction> {
        let per_tree = self.tree_predictions(row)?;
        Ok(ForestPrediction {
            mean: mean(&per_tree),
            std_dev: std_dev(&per_tree),
        })
    }

    /// Coefficient of determination on a labelled set
    pub fn r2_score(&self, rows: &[Vec<f64>], targets: &[f64]) -> MlResult<f64> {
        let predictions = rows
            .iter()
            .map(|r| self.predict(r).map(|p| p.mean))
            .collect::<MlResult<Vec<_>>>()?;
        Ok(r2_score(targets, &predictions))
    }

    /// Impurity-based importances, normalized to sum to 1
    ///
    /// Each tree's importances are normalized first, then averaged.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.width];
        for tree in &self.trees {
            let sum: f64 = tree.importances().iter().sum();
            if sum > 0.0 {
                for (acc, imp) in total.iter_mut().zip(tree.importances()) {
                    *acc += imp / sum;
                }
            }
        }

        let grand: f64 = total.iter().sum();
        if grand > 0.0 {
            total.iter_mut().for_each(|v| *v /= grand);
        }
        total
    }

    /// Number of trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Feature width
    pub fn width(&self) -> usize {
        self.width
    }
}

/// `1 − SS_res / SS_tot`; a constant target scores 1 when matched exactly, else 0
pub fn r2_score(targets: &[f64], predictions: &[f64]) -> f64 {
    let m = mean(targets);
    let ss_res: f64 = targets.iter().zip(predictions).map(|(y, p)| (y - p).powi(2)).sum();
    let ss_tot: f64 = targets.iter().map(|y| (y - m).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..12 {
            for j in 0..6 {
                let x = i as f64;
                let noise = j as f64 * 0.01;
                rows.push(vec![x, noise]);
                targets.push(3.0 * x + 1.0);
            }
        }
        (rows, targets)
    }

    fn small() -> RegressionForestConfig {
        RegressionForestConfig {
            num_trees: 30,
            ..RegressionForestConfig::default()
        }
    }

    #[test]
    fn fits_a_line() {
        let (rows, targets) = corpus();
        let forest = RegressionForest::fit(&rows, &targets, &small()).unwrap();

        assert!(forest.r2_score(&rows, &targets).unwrap() > 0.95);
        let p = forest.predict(&[6.0, 0.02]).unwrap();
        assert!((p.mean - 19.0).abs() < 3.0);
        assert!(p.std_dev >= 0.0);
    }

    #[test]
    fn importance_lands_on_signal() {
        let (rows, targets) = corpus();
        let forest = RegressionForest::fit(&rows, &targets, &small()).unwrap();
        let importances = forest.feature_importances();

        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > 0.9);
    }

    #[test]
    fn deterministic_under_seed() {
        let (rows, targets) = corpus();
        let a = RegressionForest::fit(&rows, &targets, &small()).unwrap();
        let b = RegressionForest::fit(&rows, &targets, &small()).unwrap();

        assert_eq!(a.predict(&[4.5, 0.0]).unwrap(), b.predict(&[4.5, 0.0]).unwrap());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let (rows, _) = corpus();
        assert!(matches!(
            RegressionForest::fit(&rows, &[1.0], &small()),
            Err(MlError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn r2_edge_cases() {
        assert_eq!(r2_score(&[1.0, 1.0], &[1.0, 1.0]), 1.0);
        assert_eq!(r2_score(&[1.0, 1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(r2_score(&[1.0, 3.0], &[1.0, 3.0]), 1.0);
    }
}
