//! CART regression tree
//!
//! Greedy variance-reduction splits over every feature. A split is accepted
//! only when the node holds at least `min_samples_split` samples and both
//! children keep at least `min_samples_leaf`. Thresholds sit halfway between
//! consecutive distinct values.

use crate::errors::{MlError, MlResult};

/// Growth limits for one tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples in each child
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum RegressionNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<RegressionNode>,
    /// Unnormalized weighted impurity decrease per feature
    importances: Vec<f64>,
}

struct Builder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    params: TreeParams,
    nodes: Vec<RegressionNode>,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Position in the feature-sorted index list where the right child starts
    cut: usize,
    gain: f64,
}

impl RegressionTree {
    /// Fit on the rows named by `indices` (duplicates allowed for bootstraps)
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &[usize], params: TreeParams) -> MlResult<Self> {
        if indices.is_empty() {
            return Err(MlError::InsufficientData { required: 1, actual: 0 });
        }
        let width = rows[0].len();

        let mut builder = Builder {
            rows,
            targets,
            params,
            nodes: Vec::new(),
            importances: vec![0.0; width],
        };
        builder.build(indices.to_vec(), 0);

        Ok(Self {
            nodes: builder.nodes,
            importances: builder.importances,
        })
    }

    /// Predicted value for one row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                RegressionNode::Leaf { value } => return *value,
                RegressionNode::Split { feature, threshold, left, right } => {
                    current = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Weighted impurity decrease per feature
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Builder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let index = self.nodes.len();
        let mean = indices.iter().map(|&i| self.targets[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(RegressionNode::Leaf { value: mean });

        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split {
            return index;
        }

        let Some(best) = self.best_split(&indices) else {
            return index;
        };
        self.importances[best.feature] += best.gain;

        let mut sorted = indices;
        sorted.sort_by(|&a, &b| self.rows[a][best.feature].total_cmp(&self.rows[b][best.feature]));
        let right_indices = sorted.split_off(best.cut);

        let left = self.build(sorted, depth + 1);
        let right = self.build(right_indices, depth + 1);
        self.nodes[index] = RegressionNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };

        index
    }

    /// Split with the largest drop in summed squared error
    fn best_split(&self, indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total_sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.targets[i].powi(2)).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<BestSplit> = None;
        let mut order = indices.to_vec();

        for feature in 0..self.rows[0].len() {
            order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for cut in 1..n {
                let y = self.targets[order[cut - 1]];
                left_sum += y;
                left_sq += y * y;

                if cut < min_leaf || n - cut < min_leaf {
                    continue;
                }
                let lo = self.rows[order[cut - 1]][feature];
                let hi = self.rows[order[cut]][feature];
                if hi <= lo {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / cut as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - cut) as f64;
                let gain = parent_sse - left_sse - right_sse;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: lo + (hi - lo) / 2.0,
                        cut,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    #[test]
    fn learns_a_step() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 0.0]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 3.0 }).collect();
        let indices: Vec<usize> = (0..10).collect();

        let tree = RegressionTree::fit(&rows, &targets, &indices, params()).unwrap();

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&[2.0, 0.0]), 1.0);
        assert_eq!(tree.predict(&[7.5, 0.0]), 3.0);
        // the constant column never splits
        assert_eq!(tree.importances()[1], 0.0);
        assert!(tree.importances()[0] > 0.0);
    }

    #[test]
    fn min_leaf_blocks_small_children() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let targets = [0.0, 0.0, 0.0, 10.0];
        let indices: Vec<usize> = (0..4).collect();
        let strict = TreeParams { min_samples_leaf: 2, ..params() };

        let tree = RegressionTree::fit(&rows, &targets, &indices, strict).unwrap();

        // only the 2/2 cut is allowed
        assert_eq!(tree.predict(&[0.0]), 0.0);
        assert_eq!(tree.predict(&[3.0]), 5.0);
    }

    #[test]
    fn depth_zero_is_the_mean() {
        let rows = vec![vec![0.0], vec![1.0]];
        let tree = RegressionTree::fit(&rows, &[2.0, 4.0], &[0, 1], TreeParams { max_depth: 0, ..params() }).unwrap();
        assert_eq!(tree.predict(&[5.0]), 3.0);
    }
}
