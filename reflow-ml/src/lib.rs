//! Trained models for the ReFlow decision layer
//!
//! ## Overview
//!
//! Two models turn sensor readings into decisions:
//!
//! - [`QualityPredictor`]: a bootstrap regression forest over the quality
//!   feature layout, returning a score with an ensemble-spread uncertainty
//! - [`AnomalyEnsemble`]: three independently trained detectors over the
//!   anomaly feature layout, fused by majority vote
//!
//! Both are trained once and then read-only. A trained model is `Send + Sync`
//! and can be shared behind an `Arc` across concurrent requests.
//!
//! ## Anomaly Detectors
//!
//! ```text
//! reading ─▶ AnomalyFeatures ─┬─▶ scaler ─▶ isolation forest ─┐
//!                             ├─▶ scaler ─▶ DBSCAN centroids ─┼─▶ ≥ 2 of 3
//!                             └─────────▶ z-score baseline ───┘
//! ```
//!
//! The scaler is fit on the training corpus and frozen. Refitting it on a
//! query would make every query look normal.
//!
//! ## Determinism
//!
//! All randomness comes from seeded `ChaCha8Rng` streams. Trees trained in
//! parallel each draw from their own derived stream, so the same seed and
//! corpus give the same model regardless of thread count.
//!
//! ## Cost
//!
//! | Operation                     | Time               |
//! |-------------------------------|--------------------|
//! | Isolation forest fit          | O(t · ψ log ψ)     |
//! | Regression forest fit         | O(t · d · n log n) |
//! | DBSCAN fit                    | O(n²)              |
//! | Score one reading (either)    | O(t · depth)       |
//!
//! ```
//! use reflow_ml::StatisticalBaseline;
//!
//! let corpus: Vec<Vec<f64>> = (0..50).map(|i| vec![20.0 + (i % 5) as f64]).collect();
//! let baseline = StatisticalBaseline::fit(&corpus).unwrap();
//!
//! let z = baseline.max_z_score(&[45.0]).unwrap();
//! assert!(baseline.is_anomaly(z));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod anomaly;
pub mod dbscan;
pub mod errors;
pub mod isolation;
pub mod quality;
pub mod regression;
pub mod rng;
pub mod scaler;
pub mod statistical;
pub mod stats;

// Public API
pub use anomaly::{
    AnomalyEnsemble, AnomalyEnsembleConfig, AnomalyScorer, AnomalyType, AnomalyVerdict,
    DetectorKind, DetectorResult, IsolationScorer,
};
pub use dbscan::{dbscan, ClusterConfig, ClusterScorer};
pub use errors::{MlError, MlResult};
pub use isolation::{ForestConfig, ForestStats, IsolationForest};
pub use quality::{QualityPrediction, QualityPredictor, QualityPredictorConfig, QualityRecommendation};
pub use regression::{RegressionForest, RegressionForestConfig};
pub use scaler::StandardScaler;
pub use statistical::StatisticalBaseline;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
