//! Shared fixtures for optimizer tests

#![allow(dead_code)]

use reflow_core::constants::thresholds::{FILTRATION_ENERGY_WEIGHT, PURITY_PENALTY_WEIGHT};
use reflow_optim::{ContaminationState, FiltrationPlan, FiltrationSequenceOptimizer};

/// Targets from lenient to strict
pub const TARGETS: [f64; 6] = [0.0, 0.5, 0.9, 0.95, 0.99, 0.999];

/// Every non-empty selection of at most `max_stages` stages
pub fn selections(stages: usize, max_stages: usize) -> Vec<Vec<usize>> {
    (1u32..(1 << stages))
        .map(|mask| (0..stages).filter(|i| mask & (1 << i) != 0).collect::<Vec<_>>())
        .filter(|s| s.len() <= max_stages)
        .collect()
}

/// Exhaustive minimum of the filtration objective
pub fn brute_force(
    optimizer: &FiltrationSequenceOptimizer,
    contamination: f64,
    target: f64,
    max_stages: usize,
) -> FiltrationPlan {
    let score = |p: &FiltrationPlan| {
        p.total_cost
            + FILTRATION_ENERGY_WEIGHT * p.total_energy
            + PURITY_PENALTY_WEIGHT * (target - p.final_purity).max(0.0)
    };

    selections(optimizer.catalog().len(), max_stages)
        .into_iter()
        .map(|s| optimizer.plan(contamination, &s))
        .min_by(|a, b| score(a).total_cmp(&score(b)))
        .expect("at least one selection")
}

/// Contamination state with only a total
pub fn contaminated(total: f64) -> ContaminationState {
    ContaminationState::total(total)
}
