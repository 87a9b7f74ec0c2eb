//! Properties of stateless decisions

use proptest::prelude::*;

use reflow_core::{ClassifierResult, DecisionError, DefectType, DetectionCandidate, TransformerResult};
use reflow_engine::DecisionEngine;

fn defect() -> impl Strategy<Value = DefectType> {
    prop::sample::select(DefectType::ALL.to_vec())
}

proptest! {
    #[test]
    fn spectral_grade_stays_in_range(spectrum in prop::collection::vec(0.001f64..10.0, 100)) {
        let quality = DecisionEngine::default().assess_spectrum(&spectrum).unwrap();
        prop_assert!((0.0..=100.0).contains(&quality.overall_score));
    }

    #[test]
    fn fusion_confidence_comes_from_the_inputs(
        found in prop::collection::vec((defect(), 0.0f64..1.0), 0..6),
        label in defect(),
        label_confidence in 0.0f64..1.0,
    ) {
        let candidates: Vec<_> = found
            .iter()
            .map(|&(d, c)| DetectionCandidate::new(d, c, None))
            .collect();
        let verdict = DecisionEngine::default().fuse_detections(
            &candidates,
            &ClassifierResult::top1(label, label_confidence),
            &TransformerResult::default(),
        ).unwrap();

        prop_assert_eq!(verdict.detection_count, candidates.len());
        prop_assert!((0.0..=1.0).contains(&verdict.confidence));
        prop_assert!([0.3, 0.5, 1.0].contains(&verdict.model_agreement.score()));
    }

    #[test]
    fn confidences_above_one_are_rejected(
        label in defect(),
        excess in 1.0e-6f64..100.0,
    ) {
        let result = DecisionEngine::default().fuse_detections(
            &[DetectionCandidate::new(label, 1.0 + excess, None)],
            &ClassifierResult::top1(label, 0.5),
            &TransformerResult::default(),
        );

        prop_assert!(
            matches!(result, Err(DecisionError::Validation { .. })),
            "expected DecisionError::Validation, got {:?}",
            result
        );
    }
}
