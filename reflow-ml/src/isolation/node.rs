//! Arena entries of an isolation tree
//!
//! Children are referenced by index into the owning tree's node vector.

use crate::errors::{MlError, MlResult};
use crate::isolation::scoring::c_factor;

/// One entry of a tree arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Axis-aligned cut; values below `threshold` descend to `below`
    Split {
        /// Feature column
        feature: usize,
        /// Cut position
        threshold: f64,
        /// Index of the lower child
        below: usize,
        /// Index of the upper child
        above: usize,
        /// Distance from the root
        depth: usize,
    },
    /// Terminal cell
    Leaf {
        /// Training samples that ended here
        size: usize,
        /// Distance from the root
        depth: usize,
    },
}

impl Node {
    /// Distance from the root
    pub fn depth(&self) -> usize {
        match *self {
            Node::Split { depth, .. } | Node::Leaf { depth, .. } => depth,
        }
    }

    /// True for terminal cells
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Path length credited to a sample that stops here
    ///
    /// A leaf cut short by the depth limit still holds `size` samples; the
    /// subtree that was never grown adds its expected depth `c(size)`.
    pub fn path_length(&self) -> f64 {
        match *self {
            Node::Leaf { size, depth } => depth as f64 + c_factor(size),
            Node::Split { depth, .. } => depth as f64,
        }
    }

    /// Child to visit next, `None` at a leaf
    pub fn next(&self, sample: &[f64]) -> MlResult<Option<usize>> {
        let Node::Split { feature, threshold, below, above, .. } = *self else {
            return Ok(None);
        };
        let value = sample.get(feature).copied().ok_or(MlError::DimensionMismatch {
            expected: feature + 1,
            actual: sample.len(),
        })?;
        Ok(Some(if value < threshold { below } else { above }))
    }
}
