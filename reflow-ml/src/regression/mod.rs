//! Bootstrap regression forest backing the quality predictor

pub mod forest;
pub mod tree;

pub use forest::{r2_score, ForestPrediction, RegressionForest, RegressionForestConfig};
pub use tree::{RegressionTree, TreeParams};
