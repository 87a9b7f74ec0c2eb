//! Defect detection data model
//!
//! Value types produced by the external vision collaborators (object
//! detector, single-label classifier, transformer analyzer) and consumed by
//! [`crate::fusion::DetectionFusionEngine`]. The core never mutates a
//! candidate; it only aggregates sequences of them.
//!
//! Collaborators are reached through explicit traits rather than probing an
//! object for a `predict` method at runtime. Image loading and inference stay
//! on the collaborator side; the input type is a parameter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorFault;

/// Defect classes shared by every vision model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectType {
    /// Linear surface-breaking crack
    Crack,
    /// Clustered gas pores
    Porosity,
    /// Foreign material inclusion
    Inclusion,
    /// Surface corrosion
    Corrosion,
    /// Layer separation
    Delamination,
    /// Internal void
    Void,
    /// Residue or contamination on the part
    Contamination,
    /// Rough or pitted surface
    SurfaceRoughness,
}

impl DefectType {
    /// Catalog order, matching the classifier's class indices
    pub const ALL: [DefectType; 8] = [
        DefectType::Crack,
        DefectType::Porosity,
        DefectType::Inclusion,
        DefectType::Corrosion,
        DefectType::Delamination,
        DefectType::Void,
        DefectType::Contamination,
        DefectType::SurfaceRoughness,
    ];

    /// Structural defects that raise severity
    pub fn is_critical(self) -> bool {
        matches!(self, DefectType::Crack | DefectType::Corrosion | DefectType::Delamination)
    }

    /// Stable snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            DefectType::Crack => "crack",
            DefectType::Porosity => "porosity",
            DefectType::Inclusion => "inclusion",
            DefectType::Corrosion => "corrosion",
            DefectType::Delamination => "delamination",
            DefectType::Void => "void",
            DefectType::Contamination => "contamination",
            DefectType::SurfaceRoughness => "surface_roughness",
        }
    }

    /// Class for a classifier output index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for DefectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity grade of a single detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic
    Low,
    /// Needs review
    Medium,
    /// Likely reject
    High,
    /// Stop and inspect
    Critical,
}

/// Reference area used to normalize box size (px²)
pub const SEVERITY_REFERENCE_AREA: f64 = 10_000.0;

impl Severity {
    /// Grade a detection from its class, confidence and box area
    ///
    /// `score = 0.6·confidence + 0.4·min(area / 10000, 1)`, raised by 20% for
    /// structural defects.
    pub fn assess(defect: DefectType, confidence: f64, area: f64) -> Self {
        let area_factor = (area / SEVERITY_REFERENCE_AREA).min(1.0);
        let mut score = confidence * 0.6 + area_factor * 0.4;
        if defect.is_critical() {
            score *= 1.2;
        }

        if score > 0.8 {
            Severity::Critical
        } else if score > 0.6 {
            Severity::High
        } else if score > 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x1: f64,
    /// Top edge
    pub y1: f64,
    /// Right edge
    pub x2: f64,
    /// Bottom edge
    pub y2: f64,
}

impl BoundingBox {
    /// Box width
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Box height
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Box area
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// One object-detector candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    /// Detected class
    pub defect_type: DefectType,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Location, when the detector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Severity grade
    pub severity: Severity,
}

impl DetectionCandidate {
    /// Candidate with severity derived from class, confidence and box
    pub fn new(defect_type: DefectType, confidence: f64, bbox: Option<BoundingBox>) -> Self {
        let area = bbox.map(|b| b.area()).unwrap_or(0.0);
        Self {
            defect_type,
            confidence,
            bbox,
            severity: Severity::assess(defect_type, confidence, area),
        }
    }
}

/// Top-1 output of the single-label classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    /// Predicted class
    pub predicted_class: DefectType,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Full class distribution, when reported
    #[serde(default)]
    pub probabilities: BTreeMap<DefectType, f64>,
}

impl ClassifierResult {
    /// Result without the full distribution
    pub fn top1(predicted_class: DefectType, confidence: f64) -> Self {
        Self {
            predicted_class,
            confidence,
            probabilities: BTreeMap::new(),
        }
    }
}

/// Attention statistics from the transformer analyzer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionSummary {
    /// Attention spread over the whole image
    pub global_attention: f64,
    /// Attention concentrated on local patches
    pub local_attention: f64,
    /// How strongly attention lands on the suspected defect
    pub defect_focus_score: f64,
}

/// Relative importance of visual cues
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualImportance {
    /// Texture cues
    pub texture_importance: f64,
    /// Edge cues
    pub edge_importance: f64,
    /// Colour cues
    pub color_importance: f64,
}

/// Transformer analyzer output; metadata only, not a defect vote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformerResult {
    /// Attention statistics
    pub attention: AttentionSummary,
    /// Visual cue importance
    pub feature_importance: VisualImportance,
}

/// A defect vote from one external model, resolved by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum ExternalDetector {
    /// Object detector candidates
    ObjectDetector(Vec<DetectionCandidate>),
    /// Single-label classifier output
    Classifier(ClassifierResult),
}

/// Object-detection collaborator
pub trait ObjectDetector<I: ?Sized> {
    /// Detect defects in an input
    fn detect(&self, input: &I) -> Result<Vec<DetectionCandidate>, CollaboratorFault>;
}

/// Single-label classification collaborator
pub trait DefectClassifier<I: ?Sized> {
    /// Classify an input
    fn classify(&self, input: &I) -> Result<ClassifierResult, CollaboratorFault>;
}

/// Transformer attention collaborator
pub trait AttentionAnalyzer<I: ?Sized> {
    /// Analyze an input
    fn analyze(&self, input: &I) -> Result<TransformerResult, CollaboratorFault>;
}
