//! Decision engine facade
//!
//! [`DecisionEngine`] owns one instance of every component, configured from
//! an [`EngineConfig`], and a shared [`ModelRegistry`]. Stateless components
//! are called directly; trained models are fetched from the registry per
//! call, so a retrain on one thread is picked up by the next request on any
//! other.

use std::sync::Arc;

use log::debug;

use reflow_core::detection::{AttentionAnalyzer, DefectClassifier, ObjectDetector};
use reflow_core::{
    ClassifierResult, DecisionResult, DetectionCandidate, DetectionFusionEngine, ExternalDetector,
    FusionVerdict, OverallQuality, QualityAssessmentAggregator, Reading, SpectralAnalyzer,
    SpectralAssessment, TransformerResult,
};
use reflow_ml::{AnomalyVerdict, QualityPrediction};
use reflow_optim::{
    run_with_deadline, ContaminationState, CurrentPerformance, FiltrationPlan,
    FiltrationSequenceOptimizer, OperationConstraints, OperationParameterOptimizer, OperationPlan,
};

use crate::config::EngineConfig;
use crate::registry::ModelRegistry;

/// Entry point for every decision request
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EngineConfig,
    registry: Arc<ModelRegistry>,
    fusion: DetectionFusionEngine,
    aggregator: QualityAssessmentAggregator,
    spectral: SpectralAnalyzer,
    filtration: FiltrationSequenceOptimizer,
    operation: OperationParameterOptimizer,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DecisionEngine {
    /// Engine with an empty registry of its own
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, Arc::new(ModelRegistry::new()))
    }

    /// Engine sharing an existing registry
    pub fn with_registry(config: EngineConfig, registry: Arc<ModelRegistry>) -> Self {
        Self {
            fusion: DetectionFusionEngine::new(config.fusion.clone()),
            aggregator: QualityAssessmentAggregator::new(config.quality_assessment.clone()),
            spectral: SpectralAnalyzer::new(),
            filtration: FiltrationSequenceOptimizer::new(
                config.stage_catalog.clone(),
                config.filtration.clone(),
            ),
            operation: OperationParameterOptimizer::new(config.operation.clone()),
            registry,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared model registry
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Quality estimate from the installed quality model
    pub fn predict_quality(&self, reading: &Reading) -> DecisionResult<QualityPrediction> {
        let model = self.registry.quality_model()?;
        Ok(model.predict(reading)?)
    }

    /// Anomaly verdict from the installed ensemble
    pub fn detect_anomaly(&self, reading: &Reading) -> DecisionResult<AnomalyVerdict> {
        let model = self.registry.anomaly_model()?;
        Ok(model.detect(reading)?)
    }

    /// Cheapest stage selection reaching `target_purity`
    pub fn optimize_filtration(
        &self,
        state: &ContaminationState,
        target_purity: f64,
        max_stages: Option<usize>,
    ) -> DecisionResult<FiltrationPlan> {
        match self.config.optimizer_budget() {
            Some(budget) => {
                let optimizer = self.filtration.clone();
                let state = state.clone();
                run_with_deadline(budget, move || {
                    optimizer.optimize(&state, target_purity, max_stages)
                })
            }
            None => self.filtration.optimize(state, target_purity, max_stages),
        }
    }

    /// Best operating point, optionally narrowed by `constraints`
    pub fn optimize_operation(
        &self,
        current: &CurrentPerformance,
        constraints: Option<&OperationConstraints>,
    ) -> DecisionResult<OperationPlan> {
        match self.config.optimizer_budget() {
            Some(budget) => {
                let optimizer = self.operation.clone();
                let current = *current;
                let constraints = constraints.cloned();
                run_with_deadline(budget, move || {
                    optimizer.optimize(&current, constraints.as_ref())
                })
            }
            None => self.operation.optimize(current, constraints),
        }
    }

    /// Fuse detector candidates with classifier and transformer evidence
    pub fn fuse_detections(
        &self,
        candidates: &[DetectionCandidate],
        classifier: &ClassifierResult,
        transformer: &TransformerResult,
    ) -> DecisionResult<FusionVerdict> {
        self.fusion.fuse(candidates, classifier, transformer)
    }

    /// Fuse caller-resolved detector and classifier votes
    pub fn fuse_votes(
        &self,
        votes: &[ExternalDetector],
        transformer: &TransformerResult,
    ) -> DecisionResult<FusionVerdict> {
        self.fusion.fuse_votes(votes, transformer)
    }

    /// Run the inspection collaborators on one input and fuse their outputs
    pub fn fuse_from_collaborators<I, D, C, A>(
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
        self.fusion.fuse_from(input, detector, classifier, analyzer)
    }

    /// Overall quality of an analyzed spectrum
    pub fn aggregate_quality(&self, assessment: &SpectralAssessment) -> DecisionResult<OverallQuality> {
        self.aggregator.aggregate_assessment(assessment)
    }

    /// Compare a sampled spectrum against the reference library
    pub fn analyze_spectrum(&self, spectrum: &[f64]) -> DecisionResult<SpectralAssessment> {
        self.spectral.analyze(spectrum)
    }

    /// Analyze a spectrum and grade the result in one step
    pub fn assess_spectrum(&self, spectrum: &[f64]) -> DecisionResult<OverallQuality> {
        let assessment = self.analyze_spectrum(spectrum)?;
        let quality = self.aggregate_quality(&assessment)?;
        debug!(
            "spectrum graded {:?} at {:.1}",
            quality.status, quality.overall_score
        );
        Ok(quality)
    }

    /// Train and install a quality model; returns the in-sample R²
    pub fn train_quality_model(&self, samples: &[Reading], scores: &[f64]) -> DecisionResult<f64> {
        self.registry
            .retrain_quality_model(self.config.quality_model.clone(), samples, scores)
    }

    /// Train and install an anomaly ensemble on normal-operation readings
    pub fn train_anomaly_model(&self, corpus: &[Reading]) -> DecisionResult<()> {
        self.registry
            .retrain_anomaly_model(self.config.anomaly_model.clone(), corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_core::{DecisionError, DefectType, QualityStatus};

    #[test]
    fn models_are_required_before_inference() {
        let engine = DecisionEngine::default();
        let reading = Reading::new();

        assert!(matches!(
            engine.predict_quality(&reading),
            Err(DecisionError::NotTrained { .. })
        ));
        assert!(matches!(
            engine.detect_anomaly(&reading),
            Err(DecisionError::NotTrained { .. })
        ));
    }

    #[test]
    fn fusion_uses_configured_engine() {
        let engine = DecisionEngine::default();
        let verdict = engine.fuse_detections(
            &[],
            &ClassifierResult::top1(DefectType::Void, 0.4),
            &TransformerResult::default(),
        )
        .unwrap();

        assert_eq!(verdict.primary_defect, DefectType::Void);
        assert_eq!(verdict.confidence, 0.4);
        assert_eq!(verdict.model_agreement.score(), 0.5);
    }

    #[test]
    fn clean_reference_spectrum_grades_well() {
        let engine = DecisionEngine::default();
        let clean = engine.spectral.reference("clean_penetrant").unwrap().to_vec();

        // 0.4·100 + 0.3·(100 − 20.2) + 0.2·100 + 0.1·100
        let quality = engine.assess_spectrum(&clean).unwrap();
        assert!((quality.overall_score - 93.94).abs() < 0.01);
        assert_eq!(quality.status, QualityStatus::Excellent);
    }

    #[test]
    fn engines_can_share_a_registry() {
        let first = DecisionEngine::default();
        let second = DecisionEngine::with_registry(EngineConfig::default(), Arc::clone(first.registry()));

        assert!(Arc::ptr_eq(first.registry(), second.registry()));
    }
}
