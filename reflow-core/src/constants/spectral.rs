//! Spectral Reference Grid
//!
//! UV-Vis grid and scaling factors used by the spectral analyzer. The
//! reference spectra are sums of Gaussian peaks `I·exp(−((λ − λ₀)/w)²)`.

/// First wavelength of the analysis grid (nm).
pub const WAVELENGTH_START_NM: f64 = 200.0;

/// Last wavelength of the analysis grid (nm).
pub const WAVELENGTH_END_NM: f64 = 800.0;

/// Number of grid points, inclusive of both ends.
pub const SPECTRUM_POINTS: usize = 100;

/// Width parameter of every reference peak (nm).
pub const PEAK_WIDTH_NM: f64 = 30.0;

/// Clean penetrant peaks: (intensity, centre nm).
pub const CLEAN_PEAKS: [(f64, f64); 3] = [(0.8, 350.0), (0.6, 450.0), (0.4, 550.0)];

/// Contaminated penetrant peaks: (intensity, centre nm).
pub const CONTAMINATED_PEAKS: [(f64, f64); 3] = [(0.6, 320.0), (0.8, 420.0), (0.3, 580.0)];

/// Degraded penetrant peaks: (intensity, centre nm).
pub const DEGRADED_PEAKS: [(f64, f64); 3] = [(0.4, 340.0), (0.5, 480.0), (0.7, 520.0)];

// ===== COMPOSITION =====

/// Total intensity → purity percentage.
pub const PURITY_SCALE: f64 = 120.0;

/// Half-maximum point count treated as an undegraded peak.
pub const DEGRADATION_BASE_WIDTH: f64 = 30.0;

/// Half-maximum point count span mapped onto 0–100 degradation.
pub const DEGRADATION_WIDTH_SPAN: f64 = 70.0;

/// Peak intensity → overall quality score.
pub const QUALITY_SCORE_SCALE: f64 = 150.0;

/// Leading points used for baseline stability.
pub const BASELINE_WINDOW: usize = 10;

// ===== RECOMMENDED ACTION =====

/// Total intensity above which the liquid can be excellent.
pub const EXCELLENT_TOTAL_INTENSITY: f64 = 0.8;

/// Peak intensity above which the liquid can be excellent.
pub const EXCELLENT_PEAK_INTENSITY: f64 = 0.7;

/// Total intensity above which the liquid can be good.
pub const GOOD_TOTAL_INTENSITY: f64 = 0.6;

/// Peak intensity above which the liquid can be good.
pub const GOOD_PEAK_INTENSITY: f64 = 0.5;

/// Total intensity above which filtration can still recover the liquid.
pub const FILTRATION_TOTAL_INTENSITY: f64 = 0.4;
