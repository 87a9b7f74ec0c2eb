//! Model-level errors
//!
//! Fitting and scoring fail with [`MlError`]. At the crate boundary every
//! variant maps onto one [`DecisionError`] kind:
//!
//! | MlError              | DecisionError |
//! |----------------------|---------------|
//! | `InsufficientData`   | `Training`    |
//! | `LengthMismatch`     | `Training`    |
//! | `NoDenseCluster`     | `Training`    |
//! | `DimensionMismatch`  | `Validation`  |
//! | `NonFiniteFeature`   | `Validation`  |
//! | `InvalidConfig`      | `Validation`  |
//! | `NotTrained`         | `NotTrained`  |

use reflow_core::DecisionError;
use thiserror::Error;

/// Result type for model operations
pub type MlResult<T> = Result<T, MlError>;

/// Errors raised while fitting or scoring a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MlError {
    /// Corpus too small to fit the model
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData {
        /// Minimum sample count
        required: usize,
        /// Supplied sample count
        actual: usize,
    },

    /// Samples and targets differ in length
    #[error("Length mismatch: {samples} samples but {targets} targets")]
    LengthMismatch {
        /// Number of samples
        samples: usize,
        /// Number of targets
        targets: usize,
    },

    /// Clustering labelled every training point as noise
    #[error("No dense cluster in {samples} samples (eps {eps}, min_samples {min_samples})")]
    NoDenseCluster {
        /// Training corpus size
        samples: usize,
        /// Neighbourhood radius used
        eps: f64,
        /// Core-point neighbourhood size used
        min_samples: usize,
    },

    /// Sample width differs from the fitted width
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Width seen at fit time
        expected: usize,
        /// Width supplied now
        actual: usize,
    },

    /// Model used before fitting
    #[error("Model '{model}' has not been trained")]
    NotTrained {
        /// Model name
        model: &'static str,
    },

    /// A feature is NaN or infinite
    #[error("Feature '{feature}' is not finite")]
    NonFiniteFeature {
        /// Feature name, or its index when unnamed
        feature: String,
    },

    /// Hyper-parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<MlError> for DecisionError {
    fn from(err: MlError) -> Self {
        match err {
            MlError::NotTrained { model } => DecisionError::NotTrained { model },
            MlError::InsufficientData { .. }
            | MlError::LengthMismatch { .. }
            | MlError::NoDenseCluster { .. } => DecisionError::training(err.to_string()),
            MlError::DimensionMismatch { .. }
            | MlError::NonFiniteFeature { .. }
            | MlError::InvalidConfig(_) => DecisionError::validation(err.to_string()),
        }
    }
}

/// Reject rows containing NaN or infinity
pub(crate) fn ensure_finite(row: &[f64], names: Option<&[&str]>) -> MlResult<()> {
    match row.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(MlError::NonFiniteFeature {
            feature: names
                .and_then(|n| n.get(i))
                .map(|n| n.to_string())
                .unwrap_or_else(|| i.to_string()),
        }),
        None => Ok(()),
    }
}

/// Reject an empty or ragged matrix, returning its width
pub(crate) fn matrix_width(rows: &[Vec<f64>]) -> MlResult<usize> {
    let width = rows
        .first()
        .map(Vec::len)
        .ok_or(MlError::InsufficientData { required: 1, actual: 0 })?;
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
        return Err(MlError::DimensionMismatch {
            expected: width,
            actual: bad.len(),
        });
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_decision_kinds() {
        let err: DecisionError = MlError::LengthMismatch { samples: 3, targets: 2 }.into();
        assert!(matches!(err, DecisionError::Training { .. }));

        let err: DecisionError = MlError::NotTrained { model: "quality_predictor" }.into();
        assert!(matches!(err, DecisionError::NotTrained { model: "quality_predictor" }));

        let err: DecisionError = MlError::NonFiniteFeature { feature: "reynolds_proxy".into() }.into();
        assert!(err.to_string().contains("reynolds_proxy"));
    }

    #[test]
    fn finite_check_names_feature() {
        let names = ["a", "b"];
        let err = ensure_finite(&[1.0, f64::INFINITY], Some(&names)).unwrap_err();
        assert_eq!(err, MlError::NonFiniteFeature { feature: "b".into() });

        let err = ensure_finite(&[f64::NAN], None).unwrap_err();
        assert_eq!(err, MlError::NonFiniteFeature { feature: "0".into() });
    }

    #[test]
    fn ragged_matrix_rejected() {
        assert_eq!(matrix_width(&[vec![1.0, 2.0], vec![3.0, 4.0]]), Ok(2));
        assert!(matches!(
            matrix_width(&[vec![1.0, 2.0], vec![3.0]]),
            Err(MlError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matrix_width(&[]).is_err());
    }
}
