//! Majority-vote anomaly ensemble
//!
//! ## Detectors
//!
//! | Detector           | Feature space | Flags when                         |
//! |--------------------|---------------|------------------------------------|
//! | `isolation_forest` | standardized  | score above the 90th training pct. |
//! | `clustering`       | standardized  | nearest centroid farther than 2.0  |
//! | `statistical`      | raw           | max \|z\| above 3.0                |
//!
//! The standardization is fit once on the normal-operation corpus and frozen;
//! both scaled detectors share it.
//!
//! ## Voting
//!
//! A reading is anomalous when at least two detectors flag it. Confidence is
//! the flagged fraction. The anomaly type comes from a fixed priority rule
//! over temperature, pH and conductivity and does not depend on which
//! detectors fired.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use reflow_core::constants::physics::{PH_MAX, PH_MIN};
use reflow_core::constants::thresholds::{
    ANOMALY_HIGH_CONDUCTIVITY_S_PER_M, ANOMALY_HIGH_TEMPERATURE_C, ANOMALY_LOW_TEMPERATURE_C,
    MAJORITY_VOTES, Z_SCORE_THRESHOLD,
};
use reflow_core::{AnomalyFeatures, FeatureExtractor, FeatureSchema, Reading};

use crate::dbscan::{ClusterConfig, ClusterScorer};
use crate::errors::{ensure_finite, matrix_width, MlError, MlResult};
use crate::isolation::{ForestConfig, ForestStats, IsolationForest};
use crate::scaler::StandardScaler;
use crate::statistical::StatisticalBaseline;

/// Minimum size of the normal-operation corpus
pub const MIN_TRAINING_SAMPLES: usize = 2;

/// Ensemble members
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Isolation forest density outlier
    IsolationForest,
    /// Distance to DBSCAN centroids
    Clustering,
    /// Three-sigma z-score
    Statistical,
}

/// One detector's output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult {
    /// Detector flag
    pub is_anomaly: bool,
    /// Raw detector score (isolation score, centroid distance or max |z|)
    pub score: f64,
}

/// Cause attributed to an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyType {
    /// Temperature above 70 °C
    HighTemperature,
    /// Temperature below 10 °C
    LowTemperature,
    /// pH outside [6.0, 8.5]
    PhAnomaly,
    /// Conductivity above 0.01 S/m
    HighContamination,
    /// None of the above
    Unknown,
}

impl AnomalyType {
    /// First matching rule in priority order
    pub fn classify(temperature: f64, ph: f64, conductivity: f64) -> Self {
        if temperature > ANOMALY_HIGH_TEMPERATURE_C {
            AnomalyType::HighTemperature
        } else if temperature < ANOMALY_LOW_TEMPERATURE_C {
            AnomalyType::LowTemperature
        } else if !(PH_MIN..=PH_MAX).contains(&ph) {
            AnomalyType::PhAnomaly
        } else if conductivity > ANOMALY_HIGH_CONDUCTIVITY_S_PER_M {
            AnomalyType::HighContamination
        } else {
            AnomalyType::Unknown
        }
    }
}

/// Ensemble outcome for one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    /// Majority decision
    pub is_anomaly: bool,
    /// Result of every detector
    pub per_detector: BTreeMap<DetectorKind, DetectorResult>,
    /// Fraction of detectors that flagged
    pub confidence: f64,
    /// Priority-rule type
    pub anomaly_type: AnomalyType,
}

/// A trained anomaly detector over raw anomaly features
pub trait AnomalyScorer: Send + Sync {
    /// Which ensemble member this is
    fn kind(&self) -> DetectorKind;

    /// Score one raw feature row
    fn evaluate(&self, raw: &[f64]) -> MlResult<DetectorResult>;
}

/// Isolation forest behind the frozen scaler
#[derive(Debug, Clone)]
pub struct IsolationScorer {
    scaler: StandardScaler,
    forest: IsolationForest,
}

impl IsolationScorer {
    /// Fit the forest on the scaled corpus
    pub fn fit(rows: &[Vec<f64>], scaler: StandardScaler, config: ForestConfig) -> MlResult<Self> {
        let forest = IsolationForest::fit(&scaler.transform_all(rows)?, config)?;
        Ok(Self { scaler, forest })
    }

    /// Underlying forest
    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }
}

impl AnomalyScorer for IsolationScorer {
    fn kind(&self) -> DetectorKind {
        DetectorKind::IsolationForest
    }

    fn evaluate(&self, raw: &[f64]) -> MlResult<DetectorResult> {
        let score = self.forest.anomaly_score(&self.scaler.transform(raw)?)?;
        Ok(DetectorResult {
            is_anomaly: score.is_anomaly(self.forest.threshold()),
            score: score.score,
        })
    }
}

impl AnomalyScorer for ClusterScorer {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Clustering
    }

    fn evaluate(&self, raw: &[f64]) -> MlResult<DetectorResult> {
        let distance = self.distance(raw)?;
        Ok(DetectorResult {
            is_anomaly: self.is_anomaly(distance),
            score: distance,
        })
    }
}

impl AnomalyScorer for StatisticalBaseline {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Statistical
    }

    fn evaluate(&self, raw: &[f64]) -> MlResult<DetectorResult> {
        let z = self.max_z_score(raw)?;
        Ok(DetectorResult {
            is_anomaly: self.is_anomaly(z),
            score: z,
        })
    }
}

/// Ensemble settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyEnsembleConfig {
    /// Isolation forest
    pub isolation: ForestConfig,
    /// DBSCAN and centroid distance
    pub clustering: ClusterConfig,
    /// Statistical z-score threshold
    pub z_threshold: f64,
    /// Flags required for an anomaly verdict
    pub majority: usize,
}

impl Default for AnomalyEnsembleConfig {
    fn default() -> Self {
        Self {
            isolation: ForestConfig::default(),
            clustering: ClusterConfig::default(),
            z_threshold: Z_SCORE_THRESHOLD,
            majority: MAJORITY_VOTES,
        }
    }
}

/// Three trained detectors and their vote
#[derive(Debug, Clone)]
pub struct AnomalyEnsemble {
    isolation: IsolationScorer,
    clustering: ClusterScorer,
    statistical: StatisticalBaseline,
    majority: usize,
}

impl AnomalyEnsemble {
    /// Train every detector on a normal-operation corpus
    pub fn train(readings: &[Reading], config: AnomalyEnsembleConfig) -> MlResult<Self> {
        if readings.len() < MIN_TRAINING_SAMPLES {
            return Err(MlError::InsufficientData {
                required: MIN_TRAINING_SAMPLES,
                actual: readings.len(),
            });
        }
        let rows = readings
            .iter()
            .map(extract_checked)
            .collect::<MlResult<Vec<_>>>()?;

        Self::train_features(&rows, config)
    }

    /// Train on pre-extracted anomaly feature rows
    pub fn train_features(rows: &[Vec<f64>], config: AnomalyEnsembleConfig) -> MlResult<Self> {
        let width = matrix_width(rows)?;
        if width != FeatureSchema::Anomaly.len() {
            return Err(MlError::DimensionMismatch {
                expected: FeatureSchema::Anomaly.len(),
                actual: width,
            });
        }
        if config.majority == 0 || config.majority > 3 {
            return Err(MlError::InvalidConfig(format!(
                "majority must be between 1 and 3, got {}",
                config.majority
            )));
        }

        let scaler = StandardScaler::fit(rows)?;
        let isolation = IsolationScorer::fit(rows, scaler.clone(), config.isolation)?;
        let clustering = ClusterScorer::fit(rows, scaler, config.clustering)?;
        let statistical = StatisticalBaseline::fit_with_threshold(rows, config.z_threshold)?;

        let forest = isolation.forest().stats();
        info!(
            "anomaly ensemble trained on {} samples: {} isolation trees ({} nodes, depth {}, threshold {:.4}), {} cluster centroid(s)",
            rows.len(),
            forest.num_trees,
            forest.total_nodes,
            forest.max_depth,
            forest.threshold,
            clustering.centroids().len()
        );

        Ok(Self {
            isolation,
            clustering,
            statistical,
            majority: config.majority,
        })
    }

    /// Vote on one reading
    pub fn detect(&self, reading: &Reading) -> MlResult<AnomalyVerdict> {
        self.detect_features(&extract_checked(reading)?)
    }

    /// Vote on a raw anomaly feature row
    pub fn detect_features(&self, raw: &[f64]) -> MlResult<AnomalyVerdict> {
        if raw.len() != FeatureSchema::Anomaly.len() {
            return Err(MlError::DimensionMismatch {
                expected: FeatureSchema::Anomaly.len(),
                actual: raw.len(),
            });
        }

        let per_detector = self
            .scorers()
            .iter()
            .map(|s| s.evaluate(raw).map(|result| (s.kind(), result)))
            .collect::<MlResult<BTreeMap<_, _>>>()?;

        let flagged = per_detector.values().filter(|r| r.is_anomaly).count();
        // Anomaly layout starts with temperature, ph, conductivity
        let anomaly_type = AnomalyType::classify(raw[0], raw[1], raw[2]);

        debug!("anomaly vote {}/{} ({:?})", flagged, per_detector.len(), anomaly_type);

        Ok(AnomalyVerdict {
            is_anomaly: flagged >= self.majority,
            confidence: flagged as f64 / per_detector.len() as f64,
            per_detector,
            anomaly_type,
        })
    }

    /// Ensemble members in reporting order
    pub fn scorers(&self) -> [&dyn AnomalyScorer; 3] {
        [&self.isolation, &self.clustering, &self.statistical]
    }

    /// Cluster centroids in standardized space
    pub fn centroids(&self) -> &[Vec<f64>] {
        self.clustering.centroids()
    }

    /// Frozen training scaler
    pub fn scaler(&self) -> &StandardScaler {
        self.clustering.scaler()
    }

    /// Statistical baseline
    pub fn baseline(&self) -> &StatisticalBaseline {
        &self.statistical
    }

    /// Isolation forest decision threshold
    pub fn isolation_threshold(&self) -> f64 {
        self.isolation.forest().threshold()
    }

    /// Shape of the trained isolation forest
    pub fn isolation_stats(&self) -> ForestStats {
        self.isolation.forest().stats()
    }
}

fn extract_checked(reading: &Reading) -> MlResult<Vec<f64>> {
    let features = AnomalyFeatures.extract(reading).into_values();
    ensure_finite(&features, Some(FeatureSchema::Anomaly.names()))?;
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_core::Quantity;

    fn corpus() -> Vec<Reading> {
        (0..120)
            .map(|i| {
                Reading::new()
                    .with(Quantity::Temperature, 23.0 + 0.5 * (i % 5) as f64)
                    .with(Quantity::Ph, 6.95 + 0.05 * ((i / 5) % 3) as f64)
            })
            .collect()
    }

    fn config() -> AnomalyEnsembleConfig {
        AnomalyEnsembleConfig {
            isolation: ForestConfig {
                num_trees: 50,
                ..ForestConfig::default()
            },
            ..AnomalyEnsembleConfig::default()
        }
    }

    #[test]
    fn type_priority() {
        assert_eq!(AnomalyType::classify(95.0, 3.0, 1.0), AnomalyType::HighTemperature);
        assert_eq!(AnomalyType::classify(5.0, 3.0, 1.0), AnomalyType::LowTemperature);
        assert_eq!(AnomalyType::classify(25.0, 9.0, 1.0), AnomalyType::PhAnomaly);
        assert_eq!(AnomalyType::classify(25.0, 7.0, 0.02), AnomalyType::HighContamination);
        assert_eq!(AnomalyType::classify(25.0, 7.0, 0.001), AnomalyType::Unknown);
        assert_eq!(AnomalyType::classify(70.0, 6.0, 0.01), AnomalyType::Unknown);
    }

    #[test]
    fn hot_reading_is_anomalous() {
        let ensemble = AnomalyEnsemble::train(&corpus(), config()).unwrap();
        let verdict = ensemble
            .detect(&Reading::new().with(Quantity::Temperature, 95.0).with(Quantity::Ph, 7.0))
            .unwrap();

        assert!(verdict.is_anomaly);
        assert_eq!(verdict.anomaly_type, AnomalyType::HighTemperature);
        assert!(verdict.per_detector[&DetectorKind::Clustering].is_anomaly);
        assert!(verdict.per_detector[&DetectorKind::Statistical].is_anomaly);
        assert!(verdict.confidence >= 2.0 / 3.0);
    }

    #[test]
    fn corpus_point_is_normal() {
        let ensemble = AnomalyEnsemble::train(&corpus(), config()).unwrap();
        assert_eq!(ensemble.centroids().len(), 15);

        let verdict = ensemble
            .detect(&Reading::new().with(Quantity::Temperature, 24.0).with(Quantity::Ph, 7.0))
            .unwrap();

        assert!(!verdict.is_anomaly);
        assert!(verdict.per_detector[&DetectorKind::Clustering].score < 1e-9);
        assert!(!verdict.per_detector[&DetectorKind::Statistical].is_anomaly);
        assert_eq!(verdict.per_detector.len(), 3);
    }

    #[test]
    fn needs_a_corpus() {
        assert!(matches!(
            AnomalyEnsemble::train(&[Reading::new()], config()),
            Err(MlError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn rejects_wrong_width() {
        let ensemble = AnomalyEnsemble::train(&corpus(), config()).unwrap();
        assert!(matches!(
            ensemble.detect_features(&[1.0, 2.0]),
            Err(MlError::DimensionMismatch { expected: 11, actual: 2 })
        ));
    }

    #[test]
    fn verdict_serializes_with_detector_names() {
        let ensemble = AnomalyEnsemble::train(&corpus(), config()).unwrap();
        let verdict = ensemble.detect(&Reading::new().with(Quantity::Temperature, 5.0)).unwrap();

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["anomaly_type"], "low-temperature");
        assert!(json["per_detector"]["isolation_forest"]["score"].is_number());
        assert!(json["per_detector"]["clustering"].is_object());
    }
}
