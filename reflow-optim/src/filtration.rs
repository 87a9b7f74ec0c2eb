//! Filtration stage selection
//!
//! ## Model
//!
//! Stages come from an ordered catalog of increasing fineness. Selected
//! stages are always applied in catalog order; each removes its efficiency
//! fraction of the contamination still present:
//!
//! ```text
//! purity₀ = 1 − contamination
//! purityₖ = 1 − (1 − purityₖ₋₁) · (1 − efficiencyₖ)
//! ```
//!
//! ## Objective
//!
//! ```text
//! cost + 0.1 · energy + max(0, target − purity) · 1000
//!      + 10000 · (stages missing below 1 or above max_stages)
//! ```
//!
//! The purity penalty makes a shortfall dominate economics: meet the target
//! first, then economize. The selection penalty keeps the relaxed search
//! inside the stage-count limits.
//!
//! Differential evolution searches the relaxed `[0, 1]ⁿ` box; a coordinate
//! above 0.5 selects its stage. The discrete selection is then polished by
//! single-stage flips. The returned plan is recomputed from the discrete
//! selection, never from the relaxed objective value.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use reflow_core::constants::defaults::TOTAL_CONTAMINATION;
use reflow_core::constants::thresholds::{
    DEFAULT_MAX_STAGES, FILTRATION_ENERGY_WEIGHT, PURITY_PENALTY_WEIGHT, SELECTION_PENALTY_WEIGHT,
    STAGE_SELECTION_CUTOFF,
};
use reflow_core::{DecisionError, DecisionResult};

use crate::bounds::Bounds;
use crate::de::{DifferentialEvolution, DifferentialEvolutionConfig};

/// One filtration stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage identifier
    pub id: String,
    /// Nominal pore size (m)
    pub pore_size_m: f64,
    /// Fraction of remaining contamination removed
    pub efficiency: f64,
    /// Cost per pass
    pub cost: f64,
    /// Energy per pass
    pub energy: f64,
    /// Processing time per pass (min)
    pub time: f64,
}

impl StageSpec {
    /// Build a stage
    pub fn new(id: &str, pore_size_m: f64, efficiency: f64, cost: f64, energy: f64, time: f64) -> Self {
        Self {
            id: id.to_string(),
            pore_size_m,
            efficiency,
            cost,
            energy,
            time,
        }
    }
}

/// Ordered, validated stage catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StageSpec>", into = "Vec<StageSpec>")]
pub struct StageCatalog {
    stages: Vec<StageSpec>,
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self {
            stages: vec![
                StageSpec::new("pre_filter", 50e-6, 0.85, 10.0, 5.0, 5.0),
                StageSpec::new("main_filter", 5e-6, 0.95, 25.0, 15.0, 10.0),
                StageSpec::new("ultra_filter", 0.1e-6, 0.99, 50.0, 35.0, 20.0),
                StageSpec::new("nano_filter", 0.01e-6, 0.999, 100.0, 80.0, 45.0),
            ],
        }
    }
}

impl StageCatalog {
    /// Validate a custom catalog
    pub fn new(stages: Vec<StageSpec>) -> DecisionResult<Self> {
        if stages.is_empty() {
            return Err(DecisionError::validation("stage catalog is empty"));
        }
        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(DecisionError::validation(format!("duplicate stage '{}'", stage.id)));
            }
            if !(0.0..=1.0).contains(&stage.efficiency) {
                return Err(DecisionError::validation(format!(
                    "stage '{}' efficiency {} outside [0, 1]",
                    stage.id, stage.efficiency
                )));
            }
            let amounts = [stage.cost, stage.energy, stage.time];
            if amounts.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(DecisionError::validation(format!(
                    "stage '{}' has a negative or non-finite cost, energy or time",
                    stage.id
                )));
            }
        }
        Ok(Self { stages })
    }

    /// Stages in catalog order
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Never true for a validated catalog
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Purity after applying the selected stages in catalog order
    pub fn purity(&self, contamination: f64, selected: &[usize]) -> f64 {
        let remaining = selected
            .iter()
            .fold(contamination, |rest, &i| rest * (1.0 - self.stages[i].efficiency));
        1.0 - remaining
    }
}

impl TryFrom<Vec<StageSpec>> for StageCatalog {
    type Error = DecisionError;

    fn try_from(stages: Vec<StageSpec>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl From<StageCatalog> for Vec<StageSpec> {
    fn from(catalog: StageCatalog) -> Self {
        catalog.stages
    }
}

/// Contamination of the liquid entering filtration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContaminationState {
    /// Contaminant fraction in [0, 1]
    pub total_contamination: f64,
    /// Fraction per particle-size band; informational
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle_size_distribution: Option<BTreeMap<String, f64>>,
}

impl Default for ContaminationState {
    fn default() -> Self {
        Self {
            total_contamination: TOTAL_CONTAMINATION,
            particle_size_distribution: None,
        }
    }
}

impl ContaminationState {
    /// State with only a total fraction
    pub fn total(total_contamination: f64) -> Self {
        Self {
            total_contamination,
            particle_size_distribution: None,
        }
    }
}

/// Selected stages and their recomputed performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltrationPlan {
    /// Stage ids in catalog order
    pub stages: Vec<String>,
    /// Purity after filtration
    pub final_purity: f64,
    /// Summed stage cost
    pub total_cost: f64,
    /// Summed stage energy
    pub total_energy: f64,
    /// Summed stage time
    pub processing_time: f64,
    /// `final_purity / (total_cost + 1)`
    pub efficiency_ratio: f64,
}

/// Optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltrationOptimizerConfig {
    /// Search over the relaxed selection box
    pub search: DifferentialEvolutionConfig,
    /// Stage-count limit used when the caller gives none
    pub default_max_stages: usize,
    /// Refine the discrete selection by single-stage flips
    pub polish: bool,
}

impl Default for FiltrationOptimizerConfig {
    fn default() -> Self {
        Self {
            search: DifferentialEvolutionConfig {
                max_generations: 100,
                ..DifferentialEvolutionConfig::default()
            },
            default_max_stages: DEFAULT_MAX_STAGES,
            polish: true,
        }
    }
}

/// Chooses which catalog stages to run
#[derive(Debug, Clone, Default)]
pub struct FiltrationSequenceOptimizer {
    catalog: StageCatalog,
    config: FiltrationOptimizerConfig,
}

impl FiltrationSequenceOptimizer {
    /// Optimizer over a catalog
    pub fn new(catalog: StageCatalog, config: FiltrationOptimizerConfig) -> Self {
        Self { catalog, config }
    }

    /// Stage catalog
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Settings
    pub fn config(&self) -> &FiltrationOptimizerConfig {
        &self.config
    }

    /// Cheapest selection reaching `target_purity` within `max_stages`
    ///
    /// `max_stages` of `None` uses the configured default.
    pub fn optimize(
        &self,
        state: &ContaminationState,
        target_purity: f64,
        max_stages: Option<usize>,
    ) -> DecisionResult<FiltrationPlan> {
        let contamination = state.total_contamination;
        let max_stages = max_stages.unwrap_or(self.config.default_max_stages);

        if !(0.0..=1.0).contains(&target_purity) {
            return Err(DecisionError::validation(format!(
                "target purity {target_purity} outside [0, 1]"
            )));
        }
        if !(0.0..=1.0).contains(&contamination) {
            return Err(DecisionError::validation(format!(
                "contamination {contamination} outside [0, 1]"
            )));
        }
        if max_stages == 0 {
            return Err(DecisionError::validation("max_stages must be at least 1"));
        }

        let score = |selected: &[usize]| {
            let purity = self.catalog.purity(contamination, selected);
            let (cost, energy, _) = self.totals(selected);

            let shortfall = (target_purity - purity).max(0.0) * PURITY_PENALTY_WEIGHT;
            let count = selected.len();
            let violation = 1usize.saturating_sub(count) + count.saturating_sub(max_stages);

            cost + FILTRATION_ENERGY_WEIGHT * energy
                + shortfall
                + SELECTION_PENALTY_WEIGHT * violation as f64
        };

        let bounds = Bounds::unit(self.catalog.len())?;
        let solution = DifferentialEvolution::new(self.config.search.clone())
            .minimize(|x: &[f64]| score(&discretize(x)), &bounds)?;

        let mut selected = discretize(&solution.x);
        if self.config.polish {
            selected = polish(selected, self.catalog.len(), &score);
        }
        if selected.is_empty() || selected.len() > max_stages {
            return Err(DecisionError::incomplete(format!(
                "no selection of 1 to {max_stages} stages found after {} generations",
                solution.iterations
            )));
        }

        let plan = self.plan(contamination, &selected);
        debug!(
            "filtration plan {:?}: purity {:.5}, cost {}",
            plan.stages, plan.final_purity, plan.total_cost
        );
        Ok(plan)
    }

    /// Performance of a fixed selection, given as catalog indices
    pub fn plan(&self, contamination: f64, selected: &[usize]) -> FiltrationPlan {
        let final_purity = self.catalog.purity(contamination, selected);
        let (total_cost, total_energy, processing_time) = self.totals(selected);

        FiltrationPlan {
            stages: selected.iter().map(|&i| self.catalog.stages[i].id.clone()).collect(),
            final_purity,
            total_cost,
            total_energy,
            processing_time,
            efficiency_ratio: final_purity / (total_cost + 1.0),
        }
    }

    fn totals(&self, selected: &[usize]) -> (f64, f64, f64) {
        selected.iter().fold((0.0, 0.0, 0.0), |(c, e, t), &i| {
            let stage = &self.catalog.stages[i];
            (c + stage.cost, e + stage.energy, t + stage.time)
        })
    }
}

/// Flip single stages in or out while that lowers the objective
fn polish<F>(mut selected: Vec<usize>, stages: usize, score: &F) -> Vec<usize>
where
    F: Fn(&[usize]) -> f64,
{
    let mut best = score(&selected);
    loop {
        let mut improved = false;
        for stage in 0..stages {
            let mut candidate = selected.clone();
            match candidate.binary_search(&stage) {
                Ok(pos) => {
                    candidate.remove(pos);
                }
                Err(pos) => candidate.insert(pos, stage),
            }
            let value = score(&candidate);
            if value < best {
                best = value;
                selected = candidate;
                improved = true;
            }
        }
        if !improved {
            return selected;
        }
    }
}

fn discretize(x: &[f64]) -> Vec<usize> {
    x.iter()
        .enumerate()
        .filter(|(_, v)| **v > STAGE_SELECTION_CUTOFF)
        .map(|(i, _)| i)
        .collect()
}
