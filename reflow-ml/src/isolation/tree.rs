//! Isolation tree
//!
//! Built by recursively partitioning a subsample on a random feature at a
//! random value between that feature's observed min and max, until a node
//! holds one sample, every sample is identical, or the depth limit is hit.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::errors::{MlError, MlResult};
use crate::isolation::node::Node;

/// Growth limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// Depth at which growth stops
    pub max_depth: usize,
}

impl TreeConfig {
    /// Depth limit `⌈log₂ ψ⌉` for a subsample of size ψ
    pub fn for_sample_size(sample_size: usize) -> Self {
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        Self { max_depth }
    }
}

/// Isolation tree stored as a node arena; the root is index 0
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
    config: TreeConfig,
}

impl IsolationTree {
    /// Untrained tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
        }
    }

    /// Grow the tree on a subsample
    pub fn fit(&mut self, samples: &[&[f64]], rng: &mut ChaCha8Rng) -> MlResult<()> {
        if samples.is_empty() {
            return Err(MlError::InsufficientData { required: 1, actual: 0 });
        }

        self.nodes.clear();
        self.build(samples, 0, rng);
        Ok(())
    }

    fn build(&mut self, samples: &[&[f64]], depth: usize, rng: &mut ChaCha8Rng) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { size: samples.len(), depth });

        if depth >= self.config.max_depth || samples.len() <= 1 {
            return index;
        }

        let Some((feature, split_value)) = select_split(samples, rng) else {
            // every sample identical
            return index;
        };

        let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
            samples.iter().copied().partition(|s| s[feature] < split_value);
        if left.is_empty() || right.is_empty() {
            return index;
        }

        let left_index = self.build(&left, depth + 1, rng);
        let right_index = self.build(&right, depth + 1, rng);
        self.nodes[index] = Node::Split {
            feature,
            threshold: split_value,
            below: left_index,
            above: right_index,
            depth,
        };

        index
    }

    /// Path length for a sample
    pub fn path_length(&self, sample: &[f64]) -> MlResult<f64> {
        let mut current = 0;

        loop {
            let node = self
                .nodes
                .get(current)
                .ok_or(MlError::NotTrained { model: "isolation_tree" })?;

            match node.next(sample)? {
                Some(child) => current = child,
                None => return Ok(node.path_length()),
            }
        }
    }

    /// Arena size
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }
}

/// Random feature among those that vary, and a split inside its range
fn select_split(samples: &[&[f64]], rng: &mut ChaCha8Rng) -> Option<(usize, f64)> {
    let width = samples[0].len();

    let ranges: Vec<(usize, f64, f64)> = (0..width)
        .filter_map(|j| {
            let (lo, hi) = samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s[j]), hi.max(s[j]))
            });
            (hi > lo).then_some((j, lo, hi))
        })
        .collect();

    if ranges.is_empty() {
        return None;
    }

    let (feature, lo, hi) = ranges[rng.gen_range(0..ranges.len())];
    Some((feature, rng.gen_range(lo..hi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn corpus() -> Vec<Vec<f64>> {
        vec![
            vec![20.0, 50.0, 1013.0],
            vec![22.0, 55.0, 1012.0],
            vec![21.0, 52.0, 1014.0],
            vec![19.0, 48.0, 1013.0],
            // anomaly
            vec![35.0, 90.0, 1000.0],
        ]
    }

    #[test]
    fn empty_tree_cannot_score() {
        let tree = IsolationTree::new(TreeConfig { max_depth: 4 });

        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.path_length(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn grows_within_depth_limit() {
        let samples = corpus();
        let refs: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
        let mut tree = IsolationTree::new(TreeConfig { max_depth: 5 });

        tree.fit(&refs, &mut seeded(123)).unwrap();

        assert!(tree.node_count() > 1);
        assert!(tree.depth() <= 5);
    }

    #[test]
    fn identical_samples_make_a_single_leaf() {
        let samples = vec![vec![1.0, 1.0]; 6];
        let refs: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
        let mut tree = IsolationTree::new(TreeConfig::for_sample_size(6));

        tree.fit(&refs, &mut seeded(1)).unwrap();

        assert_eq!(tree.node_count(), 1);
        assert!(tree.path_length(&[1.0, 1.0]).unwrap() > 0.0);
    }

    #[test]
    fn depth_limit_follows_sample_size() {
        assert_eq!(TreeConfig::for_sample_size(256).max_depth, 8);
        assert_eq!(TreeConfig::for_sample_size(100).max_depth, 7);
        assert_eq!(TreeConfig::for_sample_size(1).max_depth, 1);
    }
}
