//! Error Types for Decision Requests
//!
//! ## Design Philosophy
//!
//! Every decision request either produces a structured value or fails with one
//! specific error kind. Conditions that are *expected* during normal operation
//! are not errors:
//!
//! - A missing sensor field takes its documented default
//!   (see [`crate::constants::defaults`]).
//! - A reading outside its plausible physical range is reported as a
//!   validation flag on the prediction, not rejected.
//!
//! ## Error Categories
//!
//! ### Input Problems
//! - `Validation`: malformed or out-of-domain input (mismatched training
//!   lengths, target purity above 1.0, unknown parameter names)
//! - `Training`: a model could not be fitted from the supplied corpus
//!
//! ### Lifecycle Problems
//! - `NotTrained`: inference asked of a model that was never trained. This is
//!   a programming error; no implicit default model is ever substituted.
//!
//! ### Search Problems
//! - `OptimizationIncomplete`: the iteration or time budget ran out without a
//!   selection that satisfies the constraints
//!
//! ### Collaborator Failures
//! - `Collaborator`: an external detector, classifier or analyzer failed. The
//!   original error is kept as the `source` so callers can inspect it.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use reflow_core::DecisionError;
//!
//! fn describe(err: &DecisionError) -> &'static str {
//!     match err {
//!         DecisionError::Validation { .. } => "fix the request",
//!         DecisionError::Training { .. } => "collect a larger corpus",
//!         DecisionError::NotTrained { .. } => "train before predicting",
//!         DecisionError::OptimizationIncomplete { .. } => "raise the budget",
//!         DecisionError::Collaborator { .. } => "check the model service",
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type for decision operations
pub type DecisionResult<T> = Result<T, DecisionError>;

/// Boxed error produced by an external collaborator
pub type CollaboratorFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the decision core
#[derive(Error, Debug)]
pub enum DecisionError {
    /// Malformed or out-of-domain input
    #[error("Validation failed: {reason}")]
    Validation {
        /// What was wrong with the input
        reason: String,
    },

    /// A model could not be fitted
    #[error("Training failed: {reason}")]
    Training {
        /// Why fitting was rejected
        reason: String,
    },

    /// Inference requested before the model was trained
    #[error("Model '{model}' has not been trained")]
    NotTrained {
        /// Name of the model handle
        model: &'static str,
    },

    /// Search budget exhausted without a feasible solution
    #[error("Optimization incomplete: {reason}")]
    OptimizationIncomplete {
        /// Which budget or constraint was not met
        reason: String,
    },

    /// Failure reported by an external collaborator, propagated unchanged
    #[error("Collaborator '{collaborator}' failed")]
    Collaborator {
        /// Name of the collaborator that failed
        collaborator: &'static str,
        /// The collaborator's own error
        #[source]
        source: CollaboratorFault,
    },
}

impl DecisionError {
    /// Shorthand for a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }

    /// Shorthand for a training error
    pub fn training(reason: impl Into<String>) -> Self {
        Self::Training { reason: reason.into() }
    }

    /// Shorthand for an exhausted search
    pub fn incomplete(reason: impl Into<String>) -> Self {
        Self::OptimizationIncomplete { reason: reason.into() }
    }

    /// Wrap a collaborator failure without altering it
    pub fn collaborator(collaborator: &'static str, source: impl Into<CollaboratorFault>) -> Self {
        Self::Collaborator {
            collaborator,
            source: source.into(),
        }
    }
}
