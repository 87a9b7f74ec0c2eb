//! Quality score prediction
//!
//! ## Overview
//!
//! [`QualityPredictor`] regresses a process-quality score from the quality
//! feature layout. The backing model is a bootstrap
//! [`RegressionForest`]; its mean is the point estimate and the spread of the
//! per-tree predictions is the uncertainty.
//!
//! ## Confidence
//!
//! ```text
//! confidence = 1 − min(uncertainty / 10, 0.5)
//! ```
//!
//! This is a monotone damping heuristic, not a statistical guarantee: it only
//! says that a wider ensemble spread should be trusted less. It always lands
//! in [0.5, 1].
//!
//! ## Annotations
//!
//! Every prediction carries the physical validation report for its reading
//! and, when the predicted score is below 70, rule-based recommendations.
//! Neither blocks the prediction.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use reflow_core::constants::thresholds::{
    MAX_CONFIDENCE_PENALTY, RECOMMENDATION_SCORE_THRESHOLD, RECOMMENDED_CONDUCTIVITY_MAX_S_PER_M,
    RECOMMENDED_PH_MAX, RECOMMENDED_PH_MIN, RECOMMENDED_TEMPERATURE_MAX_C, UNCERTAINTY_SCALE,
};
use reflow_core::{
    FeatureExtractor, FeatureSchema, PhysicalValidator, QualityFeatures, Reading, ValidationReport,
};

use crate::errors::{ensure_finite, MlError, MlResult};
use crate::regression::{RegressionForest, RegressionForestConfig};
use crate::scaler::StandardScaler;

/// Minimum number of labelled readings
pub const MIN_TRAINING_SAMPLES: usize = 2;

/// Process adjustment suggested for a low predicted score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityRecommendation {
    /// pH below the recommended window
    RaisePh,
    /// pH above the recommended window
    LowerPh,
    /// Bath running hot
    ReduceTemperature,
    /// Conductivity suggests dissolved contamination
    AdditionalFiltration,
}

/// Annotated quality estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityPrediction {
    /// Mean ensemble prediction
    pub score: f64,
    /// Standard deviation across ensemble members
    pub uncertainty: f64,
    /// Damped confidence in [0.5, 1]
    pub confidence: f64,
    /// Physical plausibility per quantity
    pub validation: ValidationReport,
    /// Rule-based adjustments, empty unless the score is low
    pub recommendations: Vec<QualityRecommendation>,
}

/// Predictor settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPredictorConfig {
    /// Backing regression forest
    pub forest: RegressionForestConfig,
    /// Plausibility ranges used to annotate predictions
    pub validator: PhysicalValidator,
}

#[derive(Debug, Clone)]
struct TrainedModel {
    scaler: StandardScaler,
    forest: RegressionForest,
    fit_score: f64,
    importances: BTreeMap<String, f64>,
}

/// Regression-forest quality model
#[derive(Debug, Clone, Default)]
pub struct QualityPredictor {
    config: QualityPredictorConfig,
    model: Option<TrainedModel>,
}

impl QualityPredictor {
    /// Untrained predictor
    pub fn new(config: QualityPredictorConfig) -> Self {
        Self { config, model: None }
    }

    /// Train a fresh predictor in one step
    pub fn trained(config: QualityPredictorConfig, samples: &[Reading], scores: &[f64]) -> MlResult<Self> {
        let mut predictor = Self::new(config);
        predictor.train(samples, scores)?;
        Ok(predictor)
    }

    /// Fit on labelled readings and return the in-sample R²
    ///
    /// Replaces any previous fit. On error the previous fit is kept.
    pub fn train(&mut self, samples: &[Reading], scores: &[f64]) -> MlResult<f64> {
        if samples.len() != scores.len() {
            return Err(MlError::LengthMismatch {
                samples: samples.len(),
                targets: scores.len(),
            });
        }
        if samples.len() < MIN_TRAINING_SAMPLES {
            return Err(MlError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                actual: samples.len(),
            });
        }

        let rows = samples
            .iter()
            .map(extract_checked)
            .collect::<MlResult<Vec<_>>>()?;
        let scaler = StandardScaler::fit(&rows)?;
        let scaled = scaler.transform_all(&rows)?;
        let forest = RegressionForest::fit(&scaled, scores, &self.config.forest)?;
        let fit_score = forest.r2_score(&scaled, scores)?;

        let importances = FeatureSchema::Quality
            .names()
            .iter()
            .map(|name| name.to_string())
            .zip(forest.feature_importances())
            .collect();

        info!("quality predictor trained on {} samples, R² {:.4}", samples.len(), fit_score);

        self.model = Some(TrainedModel {
            scaler,
            forest,
            fit_score,
            importances,
        });
        Ok(fit_score)
    }

    /// Predict the quality score for one reading
    pub fn predict(&self, reading: &Reading) -> MlResult<QualityPrediction> {
        let model = self.model.as_ref().ok_or(MlError::NotTrained {
            model: "quality_predictor",
        })?;

        let row = extract_checked(reading)?;
        let prediction = model.forest.predict(&model.scaler.transform(&row)?)?;

        let score = prediction.mean;
        let uncertainty = prediction.std_dev;
        let confidence = 1.0 - (uncertainty / UNCERTAINTY_SCALE).min(MAX_CONFIDENCE_PENALTY);

        let recommendations = if score < RECOMMENDATION_SCORE_THRESHOLD {
            recommend(reading)
        } else {
            Vec::new()
        };

        debug!(
            "quality prediction {:.2} ± {:.2}, {} recommendation(s)",
            score,
            uncertainty,
            recommendations.len()
        );

        Ok(QualityPrediction {
            score,
            uncertainty,
            confidence,
            validation: self.config.validator.validate(reading),
            recommendations,
        })
    }

    /// True once a fit has succeeded
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// In-sample R² of the current fit
    pub fn fit_score(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.fit_score)
    }

    /// Normalized importances keyed by feature name
    pub fn feature_importances(&self) -> Option<&BTreeMap<String, f64>> {
        self.model.as_ref().map(|m| &m.importances)
    }

    /// Settings
    pub fn config(&self) -> &QualityPredictorConfig {
        &self.config
    }
}

fn extract_checked(reading: &Reading) -> MlResult<Vec<f64>> {
    let features = QualityFeatures.extract(reading).into_values();
    ensure_finite(&features, Some(FeatureSchema::Quality.names()))?;
    Ok(features)
}

fn recommend(reading: &Reading) -> Vec<QualityRecommendation> {
    let mut recommendations = Vec::new();

    let ph = reading.ph();
    if ph < RECOMMENDED_PH_MIN {
        recommendations.push(QualityRecommendation::RaisePh);
    } else if ph > RECOMMENDED_PH_MAX {
        recommendations.push(QualityRecommendation::LowerPh);
    }
    if reading.temperature() > RECOMMENDED_TEMPERATURE_MAX_C {
        recommendations.push(QualityRecommendation::ReduceTemperature);
    }
    if reading.conductivity() > RECOMMENDED_CONDUCTIVITY_MAX_S_PER_M {
        recommendations.push(QualityRecommendation::AdditionalFiltration);
    }

    recommendations
}
