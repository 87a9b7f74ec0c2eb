//! Optimizers for the ReFlow decision layer
//!
//! Two planning problems, both solved by derivative-free global search:
//!
//! - [`FiltrationSequenceOptimizer`]: which catalog stages to run to reach a
//!   target purity at the lowest cost
//! - [`OperationParameterOptimizer`]: flow, pressure, temperature, pH and
//!   cycle count maximizing scalarized performance
//!
//! Every search is seeded; the same seed and input give the same plan.
//! Population batches are evaluated in parallel with rayon. Runs end on a
//! generation or hop budget; [`run_with_deadline`] adds a wall-clock budget.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod basin;
pub mod bounds;
pub mod deadline;
pub mod de;
pub mod filtration;
pub mod nelder_mead;
pub mod operation;
pub mod solution;

// Public API
pub use basin::{BasinHopping, BasinHoppingConfig};
pub use bounds::Bounds;
pub use de::{DifferentialEvolution, DifferentialEvolutionConfig};
pub use deadline::run_with_deadline;
pub use filtration::{
    ContaminationState, FiltrationOptimizerConfig, FiltrationPlan, FiltrationSequenceOptimizer,
    StageCatalog, StageSpec,
};
pub use nelder_mead::{NelderMead, NelderMeadConfig};
pub use operation::model::OperatingPoint;
pub use operation::space::{OperationConstraints, ParameterConstraint, ParameterSpace};
pub use operation::{
    CurrentPerformance, ExpectedPerformance, Improvement, OperationOptimizerConfig,
    OperationParameterOptimizer, OperationPlan, OptimizationMethod,
};
pub use solution::Solution;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
