//! ReFlow decision engine
//!
//! Wires the decision core, the trained models and the optimizers behind one
//! facade. Callers build a [`DecisionEngine`] from an [`EngineConfig`] and
//! ask it for decisions:
//!
//! | Operation               | Needs a trained model | Returns            |
//! |-------------------------|-----------------------|--------------------|
//! | `predict_quality`       | quality predictor     | `QualityPrediction`|
//! | `detect_anomaly`        | anomaly ensemble      | `AnomalyVerdict`   |
//! | `optimize_filtration`   | no                    | `FiltrationPlan`   |
//! | `optimize_operation`    | no                    | `OperationPlan`    |
//! | `fuse_detections`       | no                    | `FusionVerdict`    |
//! | `aggregate_quality`     | no                    | `OverallQuality`   |
//!
//! Every result is a plain serde record; render it with `serde_json`.
//!
//! ```
//! use reflow_core::{ClassifierResult, DefectType, DetectionCandidate, TransformerResult};
//! use reflow_engine::DecisionEngine;
//!
//! let engine = DecisionEngine::default();
//! let verdict = engine.fuse_detections(
//!     &[
//!         DetectionCandidate::new(DefectType::Crack, 0.9, None),
//!         DetectionCandidate::new(DefectType::Crack, 0.6, None),
//!         DetectionCandidate::new(DefectType::Porosity, 0.55, None),
//!     ],
//!     &ClassifierResult::top1(DefectType::Crack, 0.8),
//!     &TransformerResult::default(),
//! )?;
//!
//! assert_eq!(verdict.primary_defect, DefectType::Crack);
//! assert!((verdict.confidence - 0.75).abs() < 1e-12);
//! # Ok::<(), reflow_core::DecisionError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod registry;

// Public API
pub use config::EngineConfig;
pub use engine::DecisionEngine;
pub use registry::{ModelRegistry, ANOMALY_MODEL, QUALITY_MODEL};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
