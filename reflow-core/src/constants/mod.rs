//! Constants for the ReFlow Decision Core
//!
//! This module provides centralized, documented constants used throughout the
//! decision layer. The thresholds here are business rules: changing one
//! changes decisions, so they live in one place and are referenced by name.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Physics**: Reference fluid properties and plausible operating ranges
//! - **Defaults**: Values substituted for missing Reading fields
//! - **Thresholds**: Anomaly, fusion, recommendation and status cut-offs
//! - **Spectral**: Reference grid, peaks and composition scaling
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Component configs default to these values; override via config, not code
//! 3. Use descriptive names that include units

/// Reference fluid properties and plausible physical ranges.
pub mod physics;

/// Defaults for Reading fields that were not reported.
pub mod defaults;

/// Decision thresholds for anomaly, fusion and quality rules.
pub mod thresholds;

/// Spectral grid, reference peaks and scaling.
pub mod spectral;

pub use physics::{
    CHARACTERISTIC_LENGTH_M, CHARACTERISTIC_VELOCITY_M_PER_S, NEUTRAL_PH,
    THERMAL_DIFFUSIVITY_PROXY,
};

pub use thresholds::{
    CLUSTER_DISTANCE_THRESHOLD, HIGH_CONFIDENCE_DETECTION, MAJORITY_VOTES,
    PURITY_PENALTY_WEIGHT, Z_SCORE_THRESHOLD,
};
