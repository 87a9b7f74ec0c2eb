//! Reading Defaults
//!
//! Partial sensor snapshots are normal: a conductivity probe may be offline
//! while the rest of the rig reports. Any quantity missing from a Reading is
//! replaced with the value below. Training-time and inference-time feature
//! extraction use the same table, so a model never sees two different
//! defaults for the same gap.

/// Bath temperature (°C).
pub const TEMPERATURE_C: f64 = 20.0;

/// pH.
pub const PH: f64 = 7.0;

/// Electrical conductivity (S/m).
pub const CONDUCTIVITY_S_PER_M: f64 = 0.001;

/// Dynamic viscosity (Pa·s).
pub const VISCOSITY_PA_S: f64 = 0.002;

/// Density (kg/m³).
pub const DENSITY_KG_PER_M3: f64 = 950.0;

/// Surface tension (N/m).
pub const SURFACE_TENSION_N_PER_M: f64 = 0.025;

/// Flow rate through the recycling loop (L/min).
pub const FLOW_RATE_L_PER_MIN: f64 = 1.0;

/// Loop pressure (bar).
pub const PRESSURE_BAR: f64 = 2.0;

/// Turbidity (NTU).
pub const TURBIDITY_NTU: f64 = 0.1;

/// Total contamination fraction assumed when a contamination state omits it.
pub const TOTAL_CONTAMINATION: f64 = 0.1;
