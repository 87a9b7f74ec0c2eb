//! End-to-end decisions through the engine facade

mod common;

use std::error::Error;
use std::io;
use std::thread;

use common::{normal_corpus, overheated, quality_grid, test_config};
use reflow_core::detection::{AttentionAnalyzer, DefectClassifier, ObjectDetector};
use reflow_core::{
    ClassifierResult, CollaboratorFault, DecisionError, DefectType, DetectionCandidate,
    FusionVerdict, OverallQuality, Reading, TransformerResult,
};
use reflow_engine::DecisionEngine;
use reflow_ml::{AnomalyType, QualityPrediction};
use reflow_optim::{ContaminationState, CurrentPerformance};

#[test]
fn quality_model_lifecycle() {
    let engine = DecisionEngine::new(test_config());
    let (readings, scores) = quality_grid();

    assert!(matches!(
        engine.predict_quality(&readings[0]),
        Err(DecisionError::NotTrained { .. })
    ));

    let r2 = engine.train_quality_model(&readings, &scores).unwrap();
    assert!(r2 > 0.8);
    let prediction = engine.predict_quality(&readings[45]).unwrap();
    assert!((0.5..=1.0).contains(&prediction.confidence));

    assert!(engine.registry().drop_quality_model().unwrap());
    assert!(engine.predict_quality(&readings[45]).is_err());
}

#[test]
fn overheated_bath_is_an_anomaly() {
    let engine = DecisionEngine::new(test_config());
    engine.train_anomaly_model(&normal_corpus()).unwrap();

    let verdict = engine.detect_anomaly(&overheated()).unwrap();
    assert!(verdict.is_anomaly);
    assert_eq!(verdict.anomaly_type, AnomalyType::HighTemperature);
}

#[test]
fn training_errors_keep_their_kind() {
    let engine = DecisionEngine::new(test_config());
    let (readings, scores) = quality_grid();

    let err = engine.train_quality_model(&readings, &scores[..10]).unwrap_err();
    assert!(matches!(err, DecisionError::Training { .. }));

    let err = engine.train_anomaly_model(&[]).unwrap_err();
    assert!(matches!(err, DecisionError::Training { .. }));
}

#[test]
fn inference_continues_during_retraining() {
    let engine = DecisionEngine::new(test_config());
    let (readings, scores) = quality_grid();
    engine.train_quality_model(&readings, &scores).unwrap();
    let shifted: Vec<f64> = scores.iter().map(|v| v - 40.0).collect();

    thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|k| {
                let engine = &engine;
                let reading = readings[k * 20].clone();
                s.spawn(move || {
                    (0..10).all(|_| engine.predict_quality(&reading).is_ok())
                })
            })
            .collect();

        s.spawn(|| engine.train_quality_model(&readings, &shifted).unwrap());

        for reader in readers {
            assert!(reader.join().unwrap());
        }
    });

    assert!(engine.predict_quality(&readings[0]).unwrap().score < 60.0);
}

#[test]
fn documented_fusion_cases() {
    let engine = DecisionEngine::default();

    let verdict = engine.fuse_detections(
        &[
            DetectionCandidate::new(DefectType::Crack, 0.9, None),
            DetectionCandidate::new(DefectType::Crack, 0.6, None),
            DetectionCandidate::new(DefectType::Porosity, 0.55, None),
        ],
        &ClassifierResult::top1(DefectType::Crack, 0.8),
        &TransformerResult::default(),
    )
    .unwrap();
    assert_eq!(verdict.primary_defect, DefectType::Crack);
    assert!((verdict.confidence - 0.75).abs() < 1e-12);
    assert_eq!(verdict.model_agreement.score(), 1.0);

    let fallback = engine.fuse_detections(
        &[],
        &ClassifierResult::top1(DefectType::Void, 0.4),
        &TransformerResult::default(),
    )
    .unwrap();
    assert_eq!(fallback.primary_defect, DefectType::Void);
    assert_eq!(fallback.confidence, 0.4);
    assert_eq!(fallback.model_agreement.score(), 0.5);
}

struct OfflineCamera;

impl ObjectDetector<[u8]> for OfflineCamera {
    fn detect(&self, _input: &[u8]) -> Result<Vec<DetectionCandidate>, CollaboratorFault> {
        Err(Box::new(io::Error::new(io::ErrorKind::NotConnected, "camera offline")))
    }
}

struct FixedClassifier;

impl DefectClassifier<[u8]> for FixedClassifier {
    fn classify(&self, _input: &[u8]) -> Result<ClassifierResult, CollaboratorFault> {
        Ok(ClassifierResult::top1(DefectType::Inclusion, 0.65))
    }
}

struct NoAttention;

impl AttentionAnalyzer<[u8]> for NoAttention {
    fn analyze(&self, _input: &[u8]) -> Result<TransformerResult, CollaboratorFault> {
        Ok(TransformerResult::default())
    }
}

struct OneCrack;

impl ObjectDetector<[u8]> for OneCrack {
    fn detect(&self, _input: &[u8]) -> Result<Vec<DetectionCandidate>, CollaboratorFault> {
        Ok(vec![DetectionCandidate::new(DefectType::Crack, 0.85, None)])
    }
}

#[test]
fn collaborator_failures_are_propagated_unchanged() {
    let engine = DecisionEngine::default();
    let image = [0u8; 16];

    let err = engine
        .fuse_from_collaborators(&image[..], &OfflineCamera, &FixedClassifier, &NoAttention)
        .unwrap_err();

    assert!(matches!(err, DecisionError::Collaborator { collaborator: "object_detector", .. }));
    let source = err.source().unwrap();
    let io_error = source.downcast_ref::<io::Error>().unwrap();
    assert_eq!(io_error.kind(), io::ErrorKind::NotConnected);
}

#[test]
fn collaborators_feed_fusion() {
    let engine = DecisionEngine::default();
    let image = [0u8; 16];

    let verdict = engine
        .fuse_from_collaborators(&image[..], &OneCrack, &FixedClassifier, &NoAttention)
        .unwrap();

    assert_eq!(verdict.primary_defect, DefectType::Crack);
    assert_eq!(verdict.detection_count, 1);
    assert_eq!(verdict.model_agreement.score(), 0.3);
}

struct Overconfident;

impl ObjectDetector<[u8]> for Overconfident {
    fn detect(&self, _input: &[u8]) -> Result<Vec<DetectionCandidate>, CollaboratorFault> {
        Ok(vec![DetectionCandidate::new(DefectType::Crack, 7.5, None)])
    }
}

#[test]
fn impossible_collaborator_confidence_is_rejected() {
    let engine = DecisionEngine::default();
    let image = [0u8; 16];

    let err = engine
        .fuse_from_collaborators(&image[..], &Overconfident, &FixedClassifier, &NoAttention)
        .unwrap_err();

    assert!(matches!(err, DecisionError::Validation { .. }));
    assert!(err.to_string().contains("7.5"));
}

#[test]
fn optimizers_run_without_a_budget() {
    let engine = DecisionEngine::default();

    let plan = engine
        .optimize_filtration(&ContaminationState::total(0.5), 0.99, None)
        .unwrap();
    assert_eq!(plan.stages, vec!["pre_filter", "main_filter"]);
    assert!((plan.final_purity - 0.99625).abs() < 1e-12);

    let operation = engine
        .optimize_operation(&CurrentPerformance::default(), None)
        .unwrap();
    assert!(operation.expected_performance.overall_score > 0.0);
}

#[test]
fn exhausted_budget_is_incomplete() {
    let mut config = test_config();
    config.optimizer_budget_ms = Some(0);
    let engine = DecisionEngine::new(config);

    let err = engine
        .optimize_operation(&CurrentPerformance::default(), None)
        .unwrap_err();
    assert!(matches!(err, DecisionError::OptimizationIncomplete { .. }));
}

#[test]
fn generous_budget_returns_the_plan() {
    let mut config = test_config();
    config.optimizer_budget_ms = Some(120_000);
    let engine = DecisionEngine::new(config);

    let plan = engine
        .optimize_filtration(&ContaminationState::total(0.8), 0.99, Some(1))
        .unwrap();
    assert_eq!(plan.stages, vec!["ultra_filter"]);
}

#[test]
fn decisions_round_trip_through_json() {
    let engine = DecisionEngine::new(test_config());
    let (readings, scores) = quality_grid();
    engine.train_quality_model(&readings, &scores).unwrap();

    let prediction = engine.predict_quality(&Reading::new()).unwrap();
    let back: QualityPrediction =
        serde_json::from_str(&serde_json::to_string(&prediction).unwrap()).unwrap();
    assert_eq!(back, prediction);

    let verdict = engine.fuse_detections(
        &[DetectionCandidate::new(DefectType::Delamination, 0.91, None)],
        &ClassifierResult::top1(DefectType::Delamination, 0.77),
        &TransformerResult::default(),
    )
    .unwrap();
    let back: FusionVerdict =
        serde_json::from_str(&serde_json::to_string(&verdict).unwrap()).unwrap();
    assert_eq!(back, verdict);

    let clean = engine.analyze_spectrum(&[0.4; 100]).unwrap();
    let quality = engine.aggregate_quality(&clean).unwrap();
    let back: OverallQuality =
        serde_json::from_str(&serde_json::to_string(&quality).unwrap()).unwrap();
    assert_eq!(back, quality);
}
