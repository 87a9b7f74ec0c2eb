//! Physical Reference Constants
//!
//! Reference properties of the penetrant liquid and the plausible ranges used
//! for physical validation. Values follow the process documentation for
//! water-based fluorescent penetrants.

// ===== REFERENCE FLUID PROPERTIES =====

/// Density of water at 20°C (kg/m³).
pub const WATER_DENSITY_KG_PER_M3: f64 = 1000.0;

/// Dynamic viscosity of water at 20°C (Pa·s).
pub const WATER_VISCOSITY_PA_S: f64 = 0.001;

/// Surface tension of water against air at 20°C (N/m).
pub const WATER_SURFACE_TENSION_N_PER_M: f64 = 0.0728;

/// Conductivity of ultra-pure water (S/m).
pub const PURE_WATER_CONDUCTIVITY_S_PER_M: f64 = 5.5e-6;

/// Neutral pH.
///
/// pH deviation features and recommendation rules are measured from here.
pub const NEUTRAL_PH: f64 = 7.0;

// ===== DIMENSIONLESS RATIO PROXIES =====

/// Characteristic length used by the Reynolds-number proxy (m).
///
/// The proxy is `density × length / viscosity`; the characteristic velocity
/// is folded into this factor.
pub const CHARACTERISTIC_LENGTH_M: f64 = 0.1;

/// Characteristic velocity used by the Weber-number proxy (m/s).
pub const CHARACTERISTIC_VELOCITY_M_PER_S: f64 = 0.1;

/// Characteristic length used by the Weber-number proxy (m).
pub const WEBER_LENGTH_M: f64 = 0.01;

/// Thermal diffusivity scale used by the Prandtl-number proxy.
///
/// The proxy is `viscosity / (density × scale)`.
pub const THERMAL_DIFFUSIVITY_PROXY: f64 = 0.001;

// ===== PLAUSIBLE OPERATING RANGES =====

/// Lowest plausible bath temperature (°C).
pub const TEMPERATURE_MIN_C: f64 = 10.0;

/// Highest plausible bath temperature (°C).
pub const TEMPERATURE_MAX_C: f64 = 80.0;

/// Lowest plausible pH.
pub const PH_MIN: f64 = 6.0;

/// Highest plausible pH.
pub const PH_MAX: f64 = 8.5;

/// Lowest plausible dynamic viscosity (Pa·s).
pub const VISCOSITY_MIN_PA_S: f64 = 5e-4;

/// Highest plausible dynamic viscosity (Pa·s).
pub const VISCOSITY_MAX_PA_S: f64 = 1e-2;

/// Lowest plausible density (kg/m³).
pub const DENSITY_MIN_KG_PER_M3: f64 = 800.0;

/// Highest plausible density (kg/m³).
pub const DENSITY_MAX_KG_PER_M3: f64 = 1200.0;
