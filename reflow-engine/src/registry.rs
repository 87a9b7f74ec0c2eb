//! Trained Model Registry
//!
//! Holds the process-wide trained model handles and makes their lifecycle
//! explicit: install, read, retrain, drop.
//!
//! ## Concurrency
//!
//! Readers take a cheap `Arc` clone under a read lock and run inference
//! without holding any lock, so a long prediction never blocks a swap and a
//! swap never changes a model under a running prediction.
//!
//! Retraining is serialized by its own mutex. The new model is fitted outside
//! the slot lock and swapped in under a short write lock:
//!
//! ```text
//! retrain ─▶ lock(retrain) ─▶ fit ─▶ write(slot) ─▶ replace ─▶ release
//! predict ─▶ read(slot) ─▶ clone Arc ─▶ release ─▶ infer
//! ```
//!
//! A failed fit leaves the installed model untouched.

use std::sync::{Arc, Mutex, RwLock};

use log::info;

use reflow_core::{DecisionError, DecisionResult, Reading};
use reflow_ml::{AnomalyEnsemble, AnomalyEnsembleConfig, QualityPredictor, QualityPredictorConfig};

/// Name of the quality model handle
pub const QUALITY_MODEL: &str = "quality_predictor";

/// Name of the anomaly model handle
pub const ANOMALY_MODEL: &str = "anomaly_ensemble";

type Slot<T> = RwLock<Option<Arc<T>>>;

/// Thread-safe store of trained models
#[derive(Debug, Default)]
pub struct ModelRegistry {
    quality: Slot<QualityPredictor>,
    anomaly: Slot<AnomalyEnsemble>,
    retrain: Mutex<()>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an already trained quality model, returning the one it replaced
    pub fn install_quality_model(
        &self,
        model: QualityPredictor,
    ) -> DecisionResult<Option<Arc<QualityPredictor>>> {
        if !model.is_trained() {
            return Err(DecisionError::validation("cannot install an untrained quality model"));
        }
        let previous = replace(&self.quality, Some(Arc::new(model)), QUALITY_MODEL)?;
        info!("installed {QUALITY_MODEL}");
        Ok(previous)
    }

    /// Install an already trained anomaly ensemble, returning the one it replaced
    pub fn install_anomaly_model(
        &self,
        model: AnomalyEnsemble,
    ) -> DecisionResult<Option<Arc<AnomalyEnsemble>>> {
        let previous = replace(&self.anomaly, Some(Arc::new(model)), ANOMALY_MODEL)?;
        info!("installed {ANOMALY_MODEL}");
        Ok(previous)
    }

    /// Current quality model
    pub fn quality_model(&self) -> DecisionResult<Arc<QualityPredictor>> {
        current(&self.quality, QUALITY_MODEL)
    }

    /// Current anomaly ensemble
    pub fn anomaly_model(&self) -> DecisionResult<Arc<AnomalyEnsemble>> {
        current(&self.anomaly, ANOMALY_MODEL)
    }

    /// Fit a new quality model and swap it in; returns the in-sample R²
    pub fn retrain_quality_model(
        &self,
        config: QualityPredictorConfig,
        samples: &[Reading],
        scores: &[f64],
    ) -> DecisionResult<f64> {
        let _exclusive = self.retrain.lock().map_err(|_| poisoned("retrain"))?;

        let model = QualityPredictor::trained(config, samples, scores)?;
        let fit_score = model.fit_score().unwrap_or_default();
        replace(&self.quality, Some(Arc::new(model)), QUALITY_MODEL)?;

        info!(
            "retrained {QUALITY_MODEL} on {} samples, R² {:.4}",
            samples.len(),
            fit_score
        );
        Ok(fit_score)
    }

    /// Fit a new anomaly ensemble on a normal-operation corpus and swap it in
    pub fn retrain_anomaly_model(
        &self,
        config: AnomalyEnsembleConfig,
        corpus: &[Reading],
    ) -> DecisionResult<()> {
        let _exclusive = self.retrain.lock().map_err(|_| poisoned("retrain"))?;

        let model = AnomalyEnsemble::train(corpus, config)?;
        let clusters = model.centroids().len();
        replace(&self.anomaly, Some(Arc::new(model)), ANOMALY_MODEL)?;

        info!(
            "retrained {ANOMALY_MODEL} on {} readings, {} cluster centroids",
            corpus.len(),
            clusters
        );
        Ok(())
    }

    /// Remove the quality model; true if one was installed
    pub fn drop_quality_model(&self) -> DecisionResult<bool> {
        let previous = replace(&self.quality, None, QUALITY_MODEL)?;
        if previous.is_some() {
            info!("dropped {QUALITY_MODEL}");
        }
        Ok(previous.is_some())
    }

    /// Remove the anomaly ensemble; true if one was installed
    pub fn drop_anomaly_model(&self) -> DecisionResult<bool> {
        let previous = replace(&self.anomaly, None, ANOMALY_MODEL)?;
        if previous.is_some() {
            info!("dropped {ANOMALY_MODEL}");
        }
        Ok(previous.is_some())
    }
}

fn current<T>(slot: &Slot<T>, model: &'static str) -> DecisionResult<Arc<T>> {
    let guard = slot.read().map_err(|_| poisoned(model))?;
    guard.clone().ok_or(DecisionError::NotTrained { model })
}

fn replace<T>(
    slot: &Slot<T>,
    value: Option<Arc<T>>,
    model: &'static str,
) -> DecisionResult<Option<Arc<T>>> {
    let mut guard = slot.write().map_err(|_| poisoned(model))?;
    Ok(std::mem::replace(&mut *guard, value))
}

fn poisoned(lock: &str) -> DecisionError {
    DecisionError::training(format!("model registry lock '{lock}' poisoned"))
}
