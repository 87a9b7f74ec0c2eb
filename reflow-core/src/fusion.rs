//! Detection Fusion
//!
//! ## Overview
//!
//! Three vision models look at the same part: an object detector that returns
//! any number of candidates, a classifier that returns one label, and a
//! transformer whose attention statistics are carried along as evidence but
//! never vote. The fusion engine reduces them to one verdict.
//!
//! ## Fusion Rule
//!
//! ```text
//! votes = detector candidates with confidence > 0.5
//!
//! votes non-empty:
//!     primary    = most frequent type in votes (tie → first seen in input)
//!     confidence = mean confidence of all candidates of that type
//! votes empty:
//!     primary, confidence = classifier top-1
//!
//! agreement = 1.0  classifier label among candidate types
//!             0.3  candidates exist but none matches
//!             0.5  no candidates at all
//! ```
//!
//! Every candidate and classifier confidence must be a finite probability in
//! [0, 1], and the echoed attention statistics must be finite; anything else
//! is rejected before fusion.
//!
//! Agreement is a three-valued enumeration. Downstream rules compare it to
//! 0.7 as if it were continuous; that comparison is kept as-is because
//! smoothing it would change which parts get sent for manual verification.
//!
//! ## Recommendations
//!
//! Rules are evaluated independently, in this order, and may all fire:
//!
//! | Condition                                   | Appended                         |
//! |---------------------------------------------|----------------------------------|
//! | confidence > 0.8, crack/corrosion            | immediate inspection, replace    |
//! | confidence > 0.8, porosity/inclusion         | detailed evaluation, rework      |
//! | confidence > 0.8, other                      | monitor                          |
//! | detection count > 3                          | multiple defects, full check     |
//! | agreement < 0.7                              | manual verification              |

use serde::{Deserialize, Serialize};

use crate::constants::thresholds::{
    ACTION_CONFIDENCE, AGREEMENT_CONFLICT, AGREEMENT_FULL, AGREEMENT_NO_EVIDENCE,
    HIGH_CONFIDENCE_DETECTION, MANUAL_VERIFICATION_AGREEMENT, MULTIPLE_DEFECT_COUNT,
};
use crate::detection::{
    AttentionAnalyzer, AttentionSummary, ClassifierResult, DefectClassifier, DefectType,
    DetectionCandidate, ExternalDetector, ObjectDetector, TransformerResult,
};
use crate::errors::{DecisionError, DecisionResult};

/// Ternary agreement between detector and classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum ModelAgreement {
    /// Classifier label appears among detector candidates
    Agree,
    /// Detector produced no candidates
    NoEvidence,
    /// Candidates exist but none matches the classifier
    Conflict,
}

impl ModelAgreement {
    /// Numeric score used by downstream thresholds
    pub fn score(self) -> f64 {
        match self {
            ModelAgreement::Agree => AGREEMENT_FULL,
            ModelAgreement::NoEvidence => AGREEMENT_NO_EVIDENCE,
            ModelAgreement::Conflict => AGREEMENT_CONFLICT,
        }
    }
}

impl From<ModelAgreement> for f64 {
    fn from(agreement: ModelAgreement) -> Self {
        agreement.score()
    }
}

impl TryFrom<f64> for ModelAgreement {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        [ModelAgreement::Agree, ModelAgreement::NoEvidence, ModelAgreement::Conflict]
            .into_iter()
            .find(|a| (a.score() - value).abs() < 1e-9)
            .ok_or_else(|| format!("{value} is not a model agreement value"))
    }
}

/// Action recommended after fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    /// Stop and inspect the part now
    ImmediateInspectionRequired,
    /// Replace the part
    PartReplacementRecommended,
    /// Send for detailed evaluation
    DetailedEvaluationNeeded,
    /// Rework may recover the part
    ConsiderRework,
    /// Keep the part under observation
    MonitorCondition,
    /// More than a handful of defects were found
    MultipleDefectsDetected,
    /// Run the full quality procedure
    ComprehensiveQualityCheck,
    /// Models disagree; a human must look
    ManualVerificationNeeded,
}

/// Fusion thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Detector confidence needed to vote
    pub high_confidence: f64,
    /// Fused confidence needed for defect-specific actions
    pub action_confidence: f64,
    /// Detection count above which the multiple-defect rule fires
    pub multiple_defect_count: usize,
    /// Agreement below which manual verification is requested
    pub manual_verification_agreement: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            high_confidence: HIGH_CONFIDENCE_DETECTION,
            action_confidence: ACTION_CONFIDENCE,
            multiple_defect_count: MULTIPLE_DEFECT_COUNT,
            manual_verification_agreement: MANUAL_VERIFICATION_AGREEMENT,
        }
    }
}

/// Fused defect decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionVerdict {
    /// Winning defect class
    pub primary_defect: DefectType,
    /// Confidence in the winning class
    pub confidence: f64,
    /// Number of detector candidates, voting or not
    pub detection_count: usize,
    /// Detector/classifier agreement
    pub model_agreement: ModelAgreement,
    /// Actions, in rule order
    pub recommendations: Vec<Recommendation>,
    /// Transformer attention, echoed for auditability
    pub attention: AttentionSummary,
}

/// Combines per-model outputs into one verdict
#[derive(Debug, Clone, Default)]
pub struct DetectionFusionEngine {
    config: FusionConfig,
}

impl DetectionFusionEngine {
    /// Engine with custom thresholds
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Active thresholds
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse detector candidates, classifier vote and transformer evidence
    pub fn fuse(
        &self,
        candidates: &[DetectionCandidate],
        classifier: &ClassifierResult,
        transformer: &TransformerResult,
    ) -> DecisionResult<FusionVerdict> {
        validate_inputs(candidates, classifier, transformer)?;

        let (primary_defect, confidence) = match self.majority_defect(candidates) {
            Some(defect) => (defect, mean_confidence(candidates, defect)),
            None => (classifier.predicted_class, classifier.confidence),
        };

        let model_agreement = agreement(candidates, classifier.predicted_class);

        let mut verdict = FusionVerdict {
            primary_defect,
            confidence,
            detection_count: candidates.len(),
            model_agreement,
            recommendations: Vec::new(),
            attention: transformer.attention,
        };
        verdict.recommendations = self.recommend(&verdict);

        log::debug!(
            "fused {} candidates: {} at {:.3}, agreement {:.1}",
            verdict.detection_count,
            verdict.primary_defect,
            verdict.confidence,
            verdict.model_agreement.score(),
        );

        Ok(verdict)
    }

    /// Fuse caller-resolved votes
    ///
    /// Candidates from every object-detector vote are concatenated in order.
    /// Exactly one classifier vote is required.
    pub fn fuse_votes(
        &self,
        votes: &[ExternalDetector],
        transformer: &TransformerResult,
    ) -> DecisionResult<FusionVerdict> {
        let mut candidates = Vec::new();
        let mut classifier = None;

        for vote in votes {
            match vote {
                ExternalDetector::ObjectDetector(found) => candidates.extend_from_slice(found),
                ExternalDetector::Classifier(result) => {
                    if classifier.replace(result).is_some() {
                        return Err(DecisionError::validation("more than one classifier vote"));
                    }
                }
            }
        }

        let classifier = classifier.ok_or_else(|| DecisionError::validation("missing classifier vote"))?;
        self.fuse(&candidates, classifier, transformer)
    }

    /// Run the collaborators on one input and fuse their outputs
    ///
    /// The first collaborator failure is returned unchanged inside
    /// [`DecisionError::Collaborator`].
    pub fn fuse_from<I, D, C, A>(
        &self,
        input: &I,
        detector: &D,
        classifier: &C,
        analyzer: &A,
    ) -> DecisionResult<FusionVerdict>
    where
        I: ?Sized,
        D: ObjectDetector<I> + ?Sized,
        C: DefectClassifier<I> + ?Sized,
        A: AttentionAnalyzer<I> + ?Sized,
    {
        let candidates = detector
            .detect(input)
            .map_err(|e| DecisionError::collaborator("object_detector", e))?;
        let label = classifier
            .classify(input)
            .map_err(|e| DecisionError::collaborator("defect_classifier", e))?;
        let attention = analyzer
            .analyze(input)
            .map_err(|e| DecisionError::collaborator("attention_analyzer", e))?;

        self.fuse(&candidates, &label, &attention)
    }

    /// Most frequent type among voting candidates; ties go to first seen
    fn majority_defect(&self, candidates: &[DetectionCandidate]) -> Option<DefectType> {
        let mut tally: Vec<(DefectType, usize)> = Vec::new();

        for candidate in candidates.iter().filter(|c| c.confidence > self.config.high_confidence) {
            match tally.iter_mut().find(|(defect, _)| *defect == candidate.defect_type) {
                Some((_, count)) => *count += 1,
                None => tally.push((candidate.defect_type, 1)),
            }
        }

        let mut best: Option<(DefectType, usize)> = None;
        for (defect, count) in tally {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((defect, count));
            }
        }
        best.map(|(defect, _)| defect)
    }

    fn recommend(&self, verdict: &FusionVerdict) -> Vec<Recommendation> {
        let mut out = Vec::new();

        if verdict.confidence > self.config.action_confidence {
            match verdict.primary_defect {
                DefectType::Crack | DefectType::Corrosion => {
                    out.push(Recommendation::ImmediateInspectionRequired);
                    out.push(Recommendation::PartReplacementRecommended);
                }
                DefectType::Porosity | DefectType::Inclusion => {
                    out.push(Recommendation::DetailedEvaluationNeeded);
                    out.push(Recommendation::ConsiderRework);
                }
                _ => out.push(Recommendation::MonitorCondition),
            }
        }

        if verdict.detection_count > self.config.multiple_defect_count {
            out.push(Recommendation::MultipleDefectsDetected);
            out.push(Recommendation::ComprehensiveQualityCheck);
        }

        if verdict.model_agreement.score() < self.config.manual_verification_agreement {
            out.push(Recommendation::ManualVerificationNeeded);
        }

        out
    }
}

fn validate_inputs(
    candidates: &[DetectionCandidate],
    classifier: &ClassifierResult,
    transformer: &TransformerResult,
) -> DecisionResult<()> {
    for (i, candidate) in candidates.iter().enumerate() {
        check_probability(&format!("candidate {i} confidence"), candidate.confidence)?;
    }
    check_probability("classifier confidence", classifier.confidence)?;

    let attention = &transformer.attention;
    for (name, value) in [
        ("global_attention", attention.global_attention),
        ("local_attention", attention.local_attention),
        ("defect_focus_score", attention.defect_focus_score),
    ] {
        if !value.is_finite() {
            return Err(DecisionError::validation(format!("{name} is not finite: {value}")));
        }
    }
    Ok(())
}

fn check_probability(what: &str, value: f64) -> DecisionResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DecisionError::validation(format!("{what} {value} outside [0, 1]")))
    }
}

fn mean_confidence(candidates: &[DetectionCandidate], defect: DefectType) -> f64 {
    let (sum, n) = candidates
        .iter()
        .filter(|c| c.defect_type == defect)
        .fold((0.0, 0usize), |(sum, n), c| (sum + c.confidence, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn agreement(candidates: &[DetectionCandidate], label: DefectType) -> ModelAgreement {
    if candidates.is_empty() {
        ModelAgreement::NoEvidence
    } else if candidates.iter().any(|c| c.defect_type == label) {
        ModelAgreement::Agree
    } else {
        ModelAgreement::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(defect: DefectType, confidence: f64) -> DetectionCandidate {
        DetectionCandidate::new(defect, confidence, None)
    }

    #[test]
    fn majority_of_confident_candidates_wins() {
        let engine = DetectionFusionEngine::default();
        let candidates = [
            candidate(DefectType::Crack, 0.9),
            candidate(DefectType::Crack, 0.6),
            candidate(DefectType::Porosity, 0.55),
        ];

        let verdict = engine.fuse(
            &candidates,
            &ClassifierResult::top1(DefectType::Crack, 0.7),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(verdict.primary_defect, DefectType::Crack);
        assert!((verdict.confidence - 0.75).abs() < 1e-12);
        assert_eq!(verdict.model_agreement, ModelAgreement::Agree);
        assert_eq!(verdict.detection_count, 3);
        // 0.75 is not above 0.8, three is not above three, agreement is full
        assert!(verdict.recommendations.is_empty());
    }

    #[test]
    fn no_candidates_falls_back_to_classifier() {
        let engine = DetectionFusionEngine::default();

        let verdict = engine.fuse(
            &[],
            &ClassifierResult::top1(DefectType::Void, 0.4),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(verdict.primary_defect, DefectType::Void);
        assert_eq!(verdict.confidence, 0.4);
        assert_eq!(verdict.model_agreement.score(), 0.5);
        assert_eq!(verdict.recommendations, vec![Recommendation::ManualVerificationNeeded]);
    }

    #[test]
    fn ties_go_to_first_seen() {
        let engine = DetectionFusionEngine::default();
        let candidates = [
            candidate(DefectType::Porosity, 0.7),
            candidate(DefectType::Crack, 0.95),
            candidate(DefectType::Crack, 0.9),
            candidate(DefectType::Porosity, 0.6),
        ];

        let verdict = engine.fuse(
            &candidates,
            &ClassifierResult::top1(DefectType::Void, 0.9),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(verdict.primary_defect, DefectType::Porosity);
        assert_eq!(verdict.model_agreement, ModelAgreement::Conflict);
        assert!(verdict.recommendations.contains(&Recommendation::MultipleDefectsDetected));
        assert_eq!(verdict.recommendations.last(), Some(&Recommendation::ManualVerificationNeeded));
    }

    #[test]
    fn low_confidence_candidates_count_in_mean_but_not_vote() {
        let engine = DetectionFusionEngine::default();
        let candidates = [
            candidate(DefectType::Corrosion, 0.95),
            candidate(DefectType::Corrosion, 0.45),
            candidate(DefectType::Inclusion, 0.3),
        ];

        let verdict = engine.fuse(
            &candidates,
            &ClassifierResult::top1(DefectType::Inclusion, 0.8),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(verdict.primary_defect, DefectType::Corrosion);
        assert!((verdict.confidence - 0.7).abs() < 1e-12);
        // Inclusion is present as a candidate, so the models agree
        assert_eq!(verdict.model_agreement, ModelAgreement::Agree);
    }

    #[test]
    fn every_rule_can_fire_together() {
        let engine = DetectionFusionEngine::default();
        let candidates: Vec<_> = (0..4).map(|_| candidate(DefectType::Crack, 0.9)).collect();

        let verdict = engine.fuse(
            &candidates,
            &ClassifierResult::top1(DefectType::Void, 0.6),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(
            verdict.recommendations,
            vec![
                Recommendation::ImmediateInspectionRequired,
                Recommendation::PartReplacementRecommended,
                Recommendation::MultipleDefectsDetected,
                Recommendation::ComprehensiveQualityCheck,
                Recommendation::ManualVerificationNeeded,
            ]
        );
    }

    #[test]
    fn votes_require_one_classifier() {
        let engine = DetectionFusionEngine::default();
        let votes = [ExternalDetector::ObjectDetector(vec![candidate(DefectType::Void, 0.9)])];

        let err = engine.fuse_votes(&votes, &TransformerResult::default()).unwrap_err();
        assert!(matches!(err, DecisionError::Validation { .. }));
    }

    #[test]
    fn agreement_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ModelAgreement::Conflict).unwrap(), "0.3");
        let parsed: ModelAgreement = serde_json::from_str("1.0").unwrap();
        assert_eq!(parsed, ModelAgreement::Agree);
        assert!(serde_json::from_str::<ModelAgreement>("0.7").is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let engine = DetectionFusionEngine::default();

        let err = engine
            .fuse(
                &[candidate(DefectType::Crack, 7.5)],
                &ClassifierResult::top1(DefectType::Crack, 0.8),
                &TransformerResult::default(),
            )
            .unwrap_err();
        assert!(matches!(err, DecisionError::Validation { .. }));
        assert!(err.to_string().contains("candidate 0 confidence 7.5"));

        let negative = engine.fuse(
            &[],
            &ClassifierResult::top1(DefectType::Void, -0.1),
            &TransformerResult::default(),
        );
        assert!(matches!(negative, Err(DecisionError::Validation { .. })));
    }

    #[test]
    fn nan_inputs_are_rejected() {
        let engine = DetectionFusionEngine::default();

        let classifier = engine.fuse(
            &[],
            &ClassifierResult::top1(DefectType::Void, f64::NAN),
            &TransformerResult::default(),
        );
        assert!(matches!(classifier, Err(DecisionError::Validation { .. })));

        let mut transformer = TransformerResult::default();
        transformer.attention.local_attention = f64::NAN;
        let attention = engine.fuse(
            &[candidate(DefectType::Crack, 0.9)],
            &ClassifierResult::top1(DefectType::Crack, 0.8),
            &transformer,
        );
        assert!(matches!(attention, Err(DecisionError::Validation { .. })));
    }

    #[test]
    fn boundary_confidences_are_accepted() {
        let engine = DetectionFusionEngine::default();

        let verdict = engine
            .fuse(
                &[candidate(DefectType::Crack, 1.0), candidate(DefectType::Crack, 0.0)],
                &ClassifierResult::top1(DefectType::Crack, 0.0),
                &TransformerResult::default(),
            )
            .unwrap();
        assert_eq!(verdict.confidence, 0.5);
    }
}
