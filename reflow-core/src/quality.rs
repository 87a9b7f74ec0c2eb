//! Overall quality assessment from spectral results.

use serde::{Deserialize, Serialize};

use crate::constants::thresholds::{STATUS_ACCEPTABLE, STATUS_EXCELLENT, STATUS_GOOD};
use crate::errors::{DecisionError, DecisionResult};
use crate::spectral::{QualityIndicators, SpectralAssessment, SpectralComposition};

/// Status grade of the penetrant bath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityStatus {
    /// Score ≥ 90
    Excellent,
    /// Score ≥ 75
    Good,
    /// Score ≥ 60
    Acceptable,
    /// Everything below
    NeedsAttention,
}

/// Composition values that drove the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactors {
    /// Penetrant purity (0–100)
    pub purity: f64,
    /// Contamination level (0–100)
    pub contamination: f64,
    /// Degradation index (0–100)
    pub degradation: f64,
}

/// Aggregated quality verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallQuality {
    /// Weighted score in [0, 100]
    pub overall_score: f64,
    /// Status grade
    pub status: QualityStatus,
    /// Inputs behind the score
    pub key_factors: KeyFactors,
}

/// Status cut-offs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityAssessmentConfig {
    /// Minimum score for excellent
    pub excellent: f64,
    /// Minimum score for good
    pub good: f64,
    /// Minimum score for acceptable
    pub acceptable: f64,
}

impl Default for QualityAssessmentConfig {
    fn default() -> Self {
        Self {
            excellent: STATUS_EXCELLENT,
            good: STATUS_GOOD,
            acceptable: STATUS_ACCEPTABLE,
        }
    }
}

/// Weighted combination of composition and indicators
///
/// `0.4·purity + 0.3·(100 − contamination) + 0.2·(100 − degradation) + 0.1·quality`,
/// clamped into [0, 100]. Non-finite inputs are rejected. Stateless.
#[derive(Debug, Clone, Default)]
pub struct QualityAssessmentAggregator {
    config: QualityAssessmentConfig,
}

impl QualityAssessmentAggregator {
    /// Aggregator with custom cut-offs
    pub fn new(config: QualityAssessmentConfig) -> Self {
        Self { config }
    }

    /// Combine a composition estimate and its indicators
    pub fn aggregate(
        &self,
        composition: &SpectralComposition,
        indicators: &QualityIndicators,
    ) -> DecisionResult<OverallQuality> {
        for (name, value) in [
            ("purity", composition.purity),
            ("contamination_level", composition.contamination_level),
            ("degradation_index", composition.degradation_index),
            ("overall_quality_score", indicators.overall_quality_score),
        ] {
            if !value.is_finite() {
                return Err(DecisionError::validation(format!("{name} is not finite: {value}")));
            }
        }

        let score = composition.purity * 0.4
            + (100.0 - composition.contamination_level) * 0.3
            + (100.0 - composition.degradation_index) * 0.2
            + indicators.overall_quality_score * 0.1;
        let overall_score = score.clamp(0.0, 100.0);

        Ok(OverallQuality {
            overall_score,
            status: self.status(overall_score),
            key_factors: KeyFactors {
                purity: composition.purity,
                contamination: composition.contamination_level,
                degradation: composition.degradation_index,
            },
        })
    }

    /// Combine a full spectral assessment
    pub fn aggregate_assessment(&self, assessment: &SpectralAssessment) -> DecisionResult<OverallQuality> {
        self.aggregate(&assessment.composition, &assessment.indicators)
    }

    fn status(&self, score: f64) -> QualityStatus {
        if score >= self.config.excellent {
            QualityStatus::Excellent
        } else if score >= self.config.good {
            QualityStatus::Good
        } else if score >= self.config.acceptable {
            QualityStatus::Acceptable
        } else {
            QualityStatus::NeedsAttention
        }
    }
}
