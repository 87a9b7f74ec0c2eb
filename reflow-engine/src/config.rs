//! Engine configuration
//!
//! One JSON document configures every component. Each section falls back to
//! its component's defaults, so `{}` is a complete configuration:
//!
//! ```json
//! {
//!   "fusion": { "high_confidence": 0.5 },
//!   "filtration": { "default_max_stages": 3 },
//!   "stage_catalog": [
//!     { "id": "mesh", "pore_size_m": 1e-4, "efficiency": 0.5,
//!       "cost": 1.0, "energy": 0.5, "time": 1.0 }
//!   ],
//!   "optimizer_budget_ms": 30000
//! }
//! ```
//!
//! Unknown sections are rejected so a misspelt key cannot silently fall back
//! to a default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult, FusionConfig, QualityAssessmentConfig};
use reflow_ml::{AnomalyEnsembleConfig, QualityPredictorConfig};
use reflow_optim::{FiltrationOptimizerConfig, OperationOptimizerConfig, StageCatalog};

/// Settings for every component the engine owns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Detection fusion thresholds
    pub fusion: FusionConfig,
    /// Status cut-offs for spectral quality
    pub quality_assessment: QualityAssessmentConfig,
    /// Quality regression model
    pub quality_model: QualityPredictorConfig,
    /// Anomaly ensemble
    pub anomaly_model: AnomalyEnsembleConfig,
    /// Filtration stage search
    pub filtration: FiltrationOptimizerConfig,
    /// Available filtration stages
    pub stage_catalog: StageCatalog,
    /// Operating-point search
    pub operation: OperationOptimizerConfig,
    /// Wall-clock limit per optimizer call; unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer_budget_ms: Option<u64>,
}

impl EngineConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> DecisionResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DecisionError::validation(format!("malformed engine config: {e}")))
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> DecisionResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            DecisionError::validation(format!("cannot read engine config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> DecisionResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DecisionError::validation(format!("engine config not serializable: {e}")))
    }

    /// Optimizer budget as a duration
    pub fn optimizer_budget(&self) -> Option<Duration> {
        self.optimizer_budget_ms.map(Duration::from_millis)
    }
}
