//! Operating-point optimization
//!
//! ## Search
//!
//! Five continuous parameters are tuned to maximize the scalarized
//! performance of [`model::OperatingPoint`]. Two independent searches run
//! concurrently on the same box:
//!
//! | Method                   | Start           | Evaluation          |
//! |--------------------------|-----------------|---------------------|
//! | `differential_evolution` | Latin hypercube | population batches  |
//! | `basin_hopping`          | box midpoint    | sequential          |
//!
//! The lower objective wins; differential evolution wins ties. The winner is
//! reported in the plan.
//!
//! ## Reporting
//!
//! Filtration cycles are rounded to the nearest whole pass inside the box and
//! the expected performance is recomputed at the rounded point. Improvement
//! compares that performance with the caller's current baseline, in
//! percentage points. The baseline must be finite.

pub mod model;
pub mod space;

use log::debug;
use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult};

use crate::basin::{BasinHopping, BasinHoppingConfig};
use crate::bounds::Bounds;
use crate::de::{DifferentialEvolution, DifferentialEvolutionConfig};
use crate::solution::Solution;
use self::model::{objective, OperatingPoint};
use self::space::{OperationConstraints, ParameterSpace};

/// Performance the line achieves today
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentPerformance {
    /// Separation efficiency
    pub efficiency: f64,
    /// Output quality
    pub quality: f64,
    /// Normalized energy use
    pub energy_consumption: f64,
}

impl CurrentPerformance {
    /// Reject non-finite baseline values
    pub fn validate(&self) -> DecisionResult<()> {
        for (name, value) in [
            ("efficiency", self.efficiency),
            ("quality", self.quality),
            ("energy_consumption", self.energy_consumption),
        ] {
            if !value.is_finite() {
                return Err(DecisionError::validation(format!(
                    "current {name} is not finite: {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CurrentPerformance {
    fn default() -> Self {
        Self {
            efficiency: 0.5,
            quality: 0.5,
            energy_consumption: 0.3,
        }
    }
}

/// Model performance at the recommended point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedPerformance {
    /// Separation efficiency
    pub efficiency: f64,
    /// Output quality
    pub quality: f64,
    /// Normalized energy use
    pub energy_consumption: f64,
    /// `0.4·efficiency + 0.4·quality − 0.2·energy`
    pub overall_score: f64,
}

impl ExpectedPerformance {
    /// Evaluate the performance model at a point
    pub fn at(point: &OperatingPoint) -> Self {
        let efficiency = point.efficiency();
        let quality = point.quality();
        let energy_consumption = point.energy();
        Self {
            efficiency,
            quality,
            energy_consumption,
            overall_score: 0.4 * efficiency + 0.4 * quality - 0.2 * energy_consumption,
        }
    }
}

/// Expected change against the baseline, in percentage points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    /// Efficiency gain
    pub efficiency_improvement: f64,
    /// Quality gain
    pub quality_improvement: f64,
    /// Energy saved
    pub energy_reduction: f64,
}

impl Improvement {
    /// Compare expected performance with the baseline
    pub fn between(current: &CurrentPerformance, expected: &ExpectedPerformance) -> Self {
        Self {
            efficiency_improvement: (expected.efficiency - current.efficiency) * 100.0,
            quality_improvement: (expected.quality - current.quality) * 100.0,
            energy_reduction: (current.energy_consumption - expected.energy_consumption) * 100.0,
        }
    }
}

/// Search that produced the winning point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    /// Population-based global search
    DifferentialEvolution,
    /// Local-restart search from the box midpoint
    BasinHopping,
}

/// Recommended operating point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationPlan {
    /// Parameter values, cycles rounded
    pub parameters: OperatingPoint,
    /// Model performance at `parameters`
    pub expected_performance: ExpectedPerformance,
    /// Winning search
    pub method: OptimizationMethod,
    /// Change against the baseline
    pub improvement: Improvement,
}

/// Optimizer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationOptimizerConfig {
    /// Default parameter bounds
    pub space: ParameterSpace,
    /// Global population search
    pub global: DifferentialEvolutionConfig,
    /// Local-restart search
    pub local_restart: BasinHoppingConfig,
}

/// Tunes flow, pressure, temperature, pH and cycle count
#[derive(Debug, Clone, Default)]
pub struct OperationParameterOptimizer {
    config: OperationOptimizerConfig,
}

impl OperationParameterOptimizer {
    /// Optimizer with custom settings
    pub fn new(config: OperationOptimizerConfig) -> Self {
        Self { config }
    }

    /// Settings
    pub fn config(&self) -> &OperationOptimizerConfig {
        &self.config
    }

    /// Best operating point inside the (optionally narrowed) bounds
    pub fn optimize(
        &self,
        current: &CurrentPerformance,
        constraints: Option<&OperationConstraints>,
    ) -> DecisionResult<OperationPlan> {
        current.validate()?;
        let bounds = self.config.space.bounds(constraints)?;
        let start = bounds.midpoint();

        let global = DifferentialEvolution::new(self.config.global.clone());
        let local_restart = BasinHopping::new(self.config.local_restart.clone());

        let (de, bh) = rayon::join(
            || global.minimize(objective, &bounds),
            || local_restart.minimize(objective, &start, &bounds),
        );
        let (method, winner) = pick(de?, bh?);

        if !winner.fun.is_finite() {
            return Err(DecisionError::incomplete("no finite objective value found"));
        }
        debug!("operation optimum via {:?}: objective {:.5}", method, winner.fun);

        Ok(plan_at(current, method, &winner, &bounds))
    }
}

/// Plan reported for a search result: cycles rounded, performance recomputed
fn plan_at(
    current: &CurrentPerformance,
    method: OptimizationMethod,
    winner: &Solution,
    bounds: &Bounds,
) -> OperationPlan {
    let mut parameters = OperatingPoint::from_slice(&winner.x);
    parameters.filtration_cycles = round_cycles(parameters.filtration_cycles, bounds.range(4));

    let expected_performance = ExpectedPerformance::at(&parameters);
    OperationPlan {
        parameters,
        expected_performance,
        method,
        improvement: Improvement::between(current, &expected_performance),
    }
}

fn pick(de: Solution, bh: Solution) -> (OptimizationMethod, Solution) {
    if bh.fun < de.fun {
        (OptimizationMethod::BasinHopping, bh)
    } else {
        (OptimizationMethod::DifferentialEvolution, de)
    }
}

/// Nearest whole cycle count inside `[lo, hi]`, if one exists
fn round_cycles(value: f64, (lo, hi): (f64, f64)) -> f64 {
    let (first, last) = (lo.ceil(), hi.floor());
    if first > last {
        return value;
    }
    value.round().clamp(first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::space::ParameterConstraint;

    #[test]
    fn cycle_rounding() {
        assert_eq!(round_cycles(4.6, (1.0, 5.0)), 5.0);
        assert_eq!(round_cycles(1.2, (1.0, 5.0)), 1.0);
        assert_eq!(round_cycles(1.2, (1.1, 5.0)), 2.0);
        assert_eq!(round_cycles(1.5, (1.2, 1.8)), 1.5);
    }

    #[test]
    fn ties_go_to_differential_evolution() {
        let solution = |fun| Solution {
            x: vec![0.0],
            fun,
            iterations: 0,
            evaluations: 0,
            converged: true,
        };
        assert_eq!(pick(solution(1.0), solution(1.0)).0, OptimizationMethod::DifferentialEvolution);
        assert_eq!(pick(solution(1.0), solution(0.5)).0, OptimizationMethod::BasinHopping);
    }

    #[test]
    fn finds_the_preferred_operating_point() {
        let plan = OperationParameterOptimizer::default()
            .optimize(&CurrentPerformance::default(), None)
            .unwrap();
        let p = plan.parameters;

        assert!(objective(&p.to_vec()) < -0.42);
        assert!((p.ph_target - 7.0).abs() < 0.1);
        assert_eq!(p.filtration_cycles, 5.0);
        assert!(plan.improvement.efficiency_improvement > 0.0);
    }

    #[test]
    fn respects_narrowed_bounds() {
        let constraints = OperationConstraints::from([
            ("temperature".to_string(), ParameterConstraint::at_most(30.0)),
            ("filtration_cycles".to_string(), ParameterConstraint::at_most(3.0)),
        ]);
        let plan = OperationParameterOptimizer::default()
            .optimize(&CurrentPerformance::default(), Some(&constraints))
            .unwrap();

        assert!(plan.parameters.temperature <= 30.0);
        assert!(plan.parameters.filtration_cycles <= 3.0);
    }

    #[test]
    fn improvement_uses_baseline() {
        let expected = ExpectedPerformance {
            efficiency: 0.7,
            quality: 0.6,
            energy_consumption: 0.25,
            overall_score: 0.47,
        };
        let improvement = Improvement::between(&CurrentPerformance::default(), &expected);

        assert!((improvement.efficiency_improvement - 20.0).abs() < 1e-9);
        assert!((improvement.quality_improvement - 10.0).abs() < 1e-9);
        assert!((improvement.energy_reduction - 5.0).abs() < 1e-9);
    }

    #[test]
    fn reported_cycles_round_to_nearest() {
        let bounds = ParameterSpace::default().bounds(None).unwrap();
        let winner = Solution {
            x: vec![1.0, 3.0, 40.0, 7.0, 4.6],
            fun: objective(&[1.0, 3.0, 40.0, 7.0, 4.6]),
            iterations: 1,
            evaluations: 1,
            converged: true,
        };

        let plan = plan_at(
            &CurrentPerformance::default(),
            OptimizationMethod::BasinHopping,
            &winner,
            &bounds,
        );

        assert_eq!(plan.parameters.filtration_cycles, 5.0);
        assert_eq!(plan.parameters.temperature, 40.0);
        let at_five = ExpectedPerformance::at(&OperatingPoint::from_slice(&[1.0, 3.0, 40.0, 7.0, 5.0]));
        assert_eq!(plan.expected_performance, at_five);
        assert_eq!(plan.improvement, Improvement::between(&CurrentPerformance::default(), &at_five));
    }

    #[test]
    fn non_finite_baseline_is_rejected() {
        let optimizer = OperationParameterOptimizer::default();

        let nan = CurrentPerformance { quality: f64::NAN, ..CurrentPerformance::default() };
        assert!(matches!(optimizer.optimize(&nan, None), Err(DecisionError::Validation { .. })));

        let infinite = CurrentPerformance { energy_consumption: f64::INFINITY, ..CurrentPerformance::default() };
        let err = optimizer.optimize(&infinite, None).unwrap_err();
        assert!(err.to_string().contains("energy_consumption"));
    }
}
