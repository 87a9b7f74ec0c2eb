//! Decision Thresholds
//!
//! These values are load-bearing business rules. They were chosen by the
//! process engineers and are preserved exactly; tune them through component
//! configuration, never inline.

// ===== ANOMALY ENSEMBLE =====

/// Minimum centroid distance (scaled feature space) that flags an anomaly.
pub const CLUSTER_DISTANCE_THRESHOLD: f64 = 2.0;

/// Maximum absolute z-score tolerated before flagging an anomaly.
pub const Z_SCORE_THRESHOLD: f64 = 3.0;

/// Guard added to standard deviations before dividing.
pub const Z_SCORE_EPSILON: f64 = 1e-8;

/// Detectors that must agree before the ensemble reports an anomaly.
pub const MAJORITY_VOTES: usize = 2;

/// Expected fraction of outliers in the normal-operation corpus.
pub const ISOLATION_CONTAMINATION: f64 = 0.1;

/// DBSCAN neighbourhood radius (scaled feature space).
pub const DBSCAN_EPS: f64 = 0.3;

/// DBSCAN minimum neighbourhood size for a core point.
pub const DBSCAN_MIN_SAMPLES: usize = 5;

/// Temperature above which an anomaly is typed as high-temperature (°C).
pub const ANOMALY_HIGH_TEMPERATURE_C: f64 = 70.0;

/// Temperature below which an anomaly is typed as low-temperature (°C).
pub const ANOMALY_LOW_TEMPERATURE_C: f64 = 10.0;

/// Conductivity above which an anomaly is typed as contamination (S/m).
pub const ANOMALY_HIGH_CONDUCTIVITY_S_PER_M: f64 = 0.01;

// ===== QUALITY PREDICTION =====

/// Predicted score below which improvement recommendations are emitted.
pub const RECOMMENDATION_SCORE_THRESHOLD: f64 = 70.0;

/// Lower edge of the recommended pH window.
pub const RECOMMENDED_PH_MIN: f64 = 6.5;

/// Upper edge of the recommended pH window.
pub const RECOMMENDED_PH_MAX: f64 = 8.0;

/// Temperature above which cooling is recommended (°C).
pub const RECOMMENDED_TEMPERATURE_MAX_C: f64 = 60.0;

/// Conductivity above which extra filtration is recommended (S/m).
pub const RECOMMENDED_CONDUCTIVITY_MAX_S_PER_M: f64 = 0.005;

/// Uncertainty divisor in the confidence damping heuristic.
pub const UNCERTAINTY_SCALE: f64 = 10.0;

/// Largest confidence reduction the damping heuristic may apply.
pub const MAX_CONFIDENCE_PENALTY: f64 = 0.5;

// ===== DETECTION FUSION =====

/// Detector confidence required to take part in the defect vote.
pub const HIGH_CONFIDENCE_DETECTION: f64 = 0.5;

/// Agreement when the classifier label appears among detector candidates.
pub const AGREEMENT_FULL: f64 = 1.0;

/// Agreement when the detector produced nothing to compare against.
pub const AGREEMENT_NO_EVIDENCE: f64 = 0.5;

/// Agreement when detector candidates and classifier disagree.
pub const AGREEMENT_CONFLICT: f64 = 0.3;

/// Fused confidence above which defect-specific actions are recommended.
pub const ACTION_CONFIDENCE: f64 = 0.8;

/// Detection count above which a comprehensive check is recommended.
pub const MULTIPLE_DEFECT_COUNT: usize = 3;

/// Agreement below which manual verification is recommended.
pub const MANUAL_VERIFICATION_AGREEMENT: f64 = 0.7;

// ===== QUALITY ASSESSMENT =====

/// Overall score at or above which quality is excellent.
pub const STATUS_EXCELLENT: f64 = 90.0;

/// Overall score at or above which quality is good.
pub const STATUS_GOOD: f64 = 75.0;

/// Overall score at or above which quality is acceptable.
pub const STATUS_ACCEPTABLE: f64 = 60.0;

// ===== FILTRATION =====

/// Cost per unit of purity shortfall; large so shortfall dominates economics.
pub const PURITY_PENALTY_WEIGHT: f64 = 1000.0;

/// Weight of energy relative to cost in the filtration objective.
pub const FILTRATION_ENERGY_WEIGHT: f64 = 0.1;

/// Coordinate value above which a relaxed stage counts as selected.
pub const STAGE_SELECTION_CUTOFF: f64 = 0.5;

/// Cost per stage by which a relaxed selection breaks the stage-count limits.
pub const SELECTION_PENALTY_WEIGHT: f64 = 10_000.0;

/// Stage-count limit when the caller supplies none.
pub const DEFAULT_MAX_STAGES: usize = 4;
