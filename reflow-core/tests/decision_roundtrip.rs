//! Decision records survive a JSON round trip unchanged

mod common;

use reflow_core::{
    DefectType, DetectionFusionEngine, FusionVerdict, ModelAgreement, OverallQuality,
    QualityAssessmentAggregator, QualityStatus, SpectralAnalyzer, TransformerResult,
};
use reflow_core::detection::AttentionSummary;

#[test]
fn fusion_verdict_round_trip() {
    let transformer = TransformerResult {
        attention: AttentionSummary {
            global_attention: 0.42,
            local_attention: 0.77,
            defect_focus_score: 0.61,
        },
        ..TransformerResult::default()
    };

    let verdict = DetectionFusionEngine::default().fuse(
        &common::crack_candidates(),
        &common::classifier(DefectType::Porosity, 0.7),
        &transformer,
    )
    .unwrap();
    assert_eq!(verdict.model_agreement, ModelAgreement::Agree);
    assert_eq!(verdict.attention.defect_focus_score, 0.61);

    let json = serde_json::to_string(&verdict).unwrap();
    let back: FusionVerdict = serde_json::from_str(&json).unwrap();
    assert_eq!(back, verdict);
}

#[test]
fn verdict_json_uses_numeric_agreement() {
    let verdict = DetectionFusionEngine::default().fuse(
        &[],
        &common::classifier(DefectType::Void, 0.4),
        &TransformerResult::default(),
    )
    .unwrap();

    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(json["model_agreement"], 0.5);
    assert_eq!(json["primary_defect"], "void");
    assert_eq!(json["recommendations"][0], "manual-verification-needed");
}

#[test]
fn overall_quality_round_trip_from_spectrum() {
    let analyzer = SpectralAnalyzer::new();
    let spectrum = analyzer.reference("clean_penetrant").unwrap().to_vec();
    let assessment = analyzer.analyze(&spectrum).unwrap();

    let quality = QualityAssessmentAggregator::default().aggregate_assessment(&assessment).unwrap();
    // 0.4·100 + 0.3·79.80 + 0.2·100 + 0.1·100
    common::assert_close(quality.overall_score, 93.939, 1e-4);
    assert_eq!(quality.status, QualityStatus::Excellent);

    let json = serde_json::to_string(&quality).unwrap();
    let back: OverallQuality = serde_json::from_str(&json).unwrap();
    assert_eq!(back, quality);
}
