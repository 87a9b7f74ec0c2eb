//! Core decision model for ReFlow
//!
//! Turns sensor readings, per-model defect detections and spectral profiles
//! into structured decisions for a penetrant recycling line. Everything here
//! is a pure function of its inputs; trained models and optimizers live in
//! `reflow-ml` and `reflow-optim`.
//!
//! Key properties:
//! - Missing sensor fields take documented defaults, never errors
//! - Feature layouts are versioned and travel with the vector
//! - Every decision threshold is a named constant
//!
//! ```
//! use reflow_core::{
//!     ClassifierResult, DefectType, DetectionCandidate, DetectionFusionEngine,
//!     TransformerResult,
//! };
//!
//! let engine = DetectionFusionEngine::default();
//! let candidates = [
//!     DetectionCandidate::new(DefectType::Crack, 0.9, None),
//!     DetectionCandidate::new(DefectType::Crack, 0.6, None),
//! ];
//! let verdict = engine.fuse(
//!     &candidates,
//!     &ClassifierResult::top1(DefectType::Crack, 0.8),
//!     &TransformerResult::default(),
//! )?;
//!
//! assert_eq!(verdict.primary_defect, DefectType::Crack);
//! # Ok::<(), reflow_core::DecisionError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod detection;
pub mod errors;
pub mod features;
pub mod fusion;
pub mod quality;
pub mod reading;
pub mod spectral;
pub mod validation;

// Public API
pub use detection::{
    AttentionAnalyzer, AttentionSummary, BoundingBox, ClassifierResult, DefectClassifier,
    DefectType, DetectionCandidate, ExternalDetector, ObjectDetector, Severity,
    TransformerResult, VisualImportance,
};
pub use errors::{CollaboratorFault, DecisionError, DecisionResult};
pub use features::{AnomalyFeatures, FeatureExtractor, FeatureSchema, FeatureVector, QualityFeatures};
pub use fusion::{DetectionFusionEngine, FusionConfig, FusionVerdict, ModelAgreement, Recommendation};
pub use quality::{
    KeyFactors, OverallQuality, QualityAssessmentAggregator, QualityAssessmentConfig, QualityStatus,
};
pub use reading::{Quantity, Reading};
pub use spectral::{
    QualityIndicators, SpectralAction, SpectralAnalyzer, SpectralAssessment, SpectralComposition,
};
pub use validation::{PhysicalValidator, RangeConstraint, ValidationReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
