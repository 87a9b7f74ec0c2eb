//! Isolation Forest density-outlier scorer

pub mod forest;
pub mod node;
pub mod scoring;
pub mod tree;

pub use forest::{ForestConfig, ForestStats, IsolationForest};
pub use scoring::{c_factor, AnomalyScore};
