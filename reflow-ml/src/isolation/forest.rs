//! Isolation forest over standardized feature rows
//!
//! Combines many isolation trees, each grown on its own subsample, and
//! averages their path lengths. The decision threshold is learned from the
//! training corpus itself: with an expected outlier fraction `contamination`,
//! the threshold sits at the `(1 − contamination)` quantile of training scores.

use log::debug;
use rand::seq::index::sample as sample_indices;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use reflow_core::constants::thresholds::ISOLATION_CONTAMINATION;

use crate::errors::{ensure_finite, matrix_width, MlError, MlResult};
use crate::isolation::scoring::{calculate_anomaly_score, AnomalyScore};
use crate::isolation::tree::{IsolationTree, TreeConfig};
use crate::rng::derived;
use crate::stats::percentile;

/// Trees per forest
pub const DEFAULT_NUM_TREES: usize = 100;

/// Rows drawn for each tree
pub const DEFAULT_SAMPLE_SIZE: usize = 256;

/// Forest size, subsampling and outlier fraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Trees to grow
    pub num_trees: usize,
    /// Rows drawn without replacement per tree
    pub sample_size: usize,
    /// Expected outlier fraction in the training corpus
    pub contamination: f64,
    /// Base seed; tree `i` uses the stream derived for `i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            sample_size: DEFAULT_SAMPLE_SIZE,
            contamination: ISOLATION_CONTAMINATION,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn validate(&self) -> MlResult<()> {
        if self.num_trees == 0 || self.sample_size == 0 {
            return Err(MlError::InvalidConfig(
                "isolation forest needs at least one tree and one sample per tree".to_string(),
            ));
        }
        if !(0.0..0.5).contains(&self.contamination) {
            return Err(MlError::InvalidConfig(format!(
                "contamination {} outside [0, 0.5)",
                self.contamination
            )));
        }
        Ok(())
    }
}

/// Trained forest with its learned threshold
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    config: ForestConfig,
    subsample_size: usize,
    width: usize,
    threshold: f64,
}

impl IsolationForest {
    /// Train the forest on a corpus of rows
    pub fn fit(rows: &[Vec<f64>], config: ForestConfig) -> MlResult<Self> {
        config.validate()?;
        let width = matrix_width(rows)?;
        for row in rows {
            ensure_finite(row, None)?;
        }

        let subsample_size = config.sample_size.min(rows.len());
        let tree_config = TreeConfig::for_sample_size(subsample_size);

        let trees = (0..config.num_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = derived(config.seed, i);
                let subset: Vec<&[f64]> = sample_indices(&mut rng, rows.len(), subsample_size)
                    .into_iter()
                    .map(|k| rows[k].as_slice())
                    .collect();

                let mut tree = IsolationTree::new(tree_config);
                tree.fit(&subset, &mut rng)?;
                Ok(tree)
            })
            .collect::<MlResult<Vec<_>>>()?;

        let mut forest = Self {
            trees,
            config,
            subsample_size,
            width,
            threshold: 0.0,
        };

        let training_scores = rows
            .par_iter()
            .map(|r| forest.anomaly_score(r).map(|s| s.score))
            .collect::<MlResult<Vec<_>>>()?;
        forest.threshold = percentile(&training_scores, 100.0 * (1.0 - forest.config.contamination));

        debug!(
            "isolation forest: {} trees on {} of {} samples, threshold {:.4}",
            forest.trees.len(),
            subsample_size,
            rows.len(),
            forest.threshold
        );

        Ok(forest)
    }

    /// Anomaly score for a row
    pub fn anomaly_score(&self, sample: &[f64]) -> MlResult<AnomalyScore> {
        if sample.len() != self.width {
            return Err(MlError::DimensionMismatch {
                expected: self.width,
                actual: sample.len(),
            });
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|t| t.path_length(sample))
            .sum::<MlResult<f64>>()?;
        let avg_path_length = total / self.trees.len() as f64;

        Ok(AnomalyScore::new(
            calculate_anomaly_score(avg_path_length, self.subsample_size),
            avg_path_length,
            self.trees.len(),
        ))
    }

    /// Check if a row scores above the learned threshold
    pub fn is_anomaly(&self, sample: &[f64]) -> MlResult<bool> {
        Ok(self.anomaly_score(sample)?.is_anomaly(self.threshold))
    }

    /// Learned decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Configuration the forest was trained with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Shape summary
    pub fn stats(&self) -> ForestStats {
        ForestStats {
            num_trees: self.trees.len(),
            total_nodes: self.trees.iter().map(IsolationTree::node_count).sum(),
            max_depth: self.trees.iter().map(IsolationTree::depth).max().unwrap_or(0),
            subsample_size: self.subsample_size,
            threshold: self.threshold,
        }
    }
}

/// Shape of a trained forest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestStats {
    /// Trees grown
    pub num_trees: usize,
    /// Arena entries across all trees
    pub total_nodes: usize,
    /// Deepest node in any tree
    pub max_depth: usize,
    /// Samples per tree
    pub subsample_size: usize,
    /// Decision threshold
    pub threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Vec<Vec<f64>> {
        let mut samples: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let temp = 20.0 + (i % 8) as f64 * 0.1;
                let humidity = 50.0 + (i / 8) as f64 * 0.2;
                vec![temp, humidity]
            })
            .collect();

        samples.push(vec![35.0, 90.0]);
        samples.push(vec![5.0, 20.0]);
        samples
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            num_trees: 50,
            sample_size: 32,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn forest_shape_follows_config() {
        let forest = IsolationForest::fit(&readings(), small_config()).unwrap();

        let stats = forest.stats();
        assert_eq!(stats.num_trees, 50);
        assert_eq!(stats.subsample_size, 32);
        assert!(stats.total_nodes > 50);
        assert!(stats.max_depth <= 5);
    }

    #[test]
    fn outlier_scores_above_threshold() {
        let forest = IsolationForest::fit(&readings(), small_config()).unwrap();

        let normal = forest.anomaly_score(&[20.3, 50.4]).unwrap();
        let outlier = forest.anomaly_score(&[35.0, 90.0]).unwrap();

        assert!(outlier.score > normal.score);
        assert!(forest.is_anomaly(&[35.0, 90.0]).unwrap());
        assert!(!forest.is_anomaly(&[20.3, 50.4]).unwrap());
    }

    #[test]
    fn same_seed_same_forest() {
        let data = readings();
        let a = IsolationForest::fit(&data, small_config()).unwrap();
        let b = IsolationForest::fit(&data, small_config()).unwrap();

        assert_eq!(a.threshold(), b.threshold());
        assert_eq!(
            a.anomaly_score(&[21.0, 51.0]).unwrap(),
            b.anomaly_score(&[21.0, 51.0]).unwrap()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(IsolationForest::fit(&[], ForestConfig::default()).is_err());
        assert!(IsolationForest::fit(&[vec![f64::NAN]], ForestConfig::default()).is_err());

        let bad = ForestConfig { contamination: 0.7, ..ForestConfig::default() };
        assert!(matches!(
            IsolationForest::fit(&readings(), bad),
            Err(MlError::InvalidConfig(_))
        ));

        let forest = IsolationForest::fit(&readings(), small_config()).unwrap();
        assert!(forest.anomaly_score(&[1.0]).is_err());
    }
}
