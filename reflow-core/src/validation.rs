//! Physical Plausibility Checks
//!
//! ## Overview
//!
//! Each quantity has a plausible range for a working penetrant bath. A reading
//! outside that range is suspicious (a fouled probe, a bath left on the
//! heater) but it is still data: validation annotates a prediction, it never
//! blocks one.
//!
//! ## Default Ranges
//!
//! | Quantity    | Min     | Max    | Unit  |
//! |-------------|---------|--------|-------|
//! | temperature | 10      | 80     | °C    |
//! | ph          | 6.0     | 8.5    |       |
//! | viscosity   | 5e-4    | 1e-2   | Pa·s  |
//! | density     | 800     | 1200   | kg/m³ |
//!
//! Bounds are inclusive. Missing quantities are checked at their default
//! value, which always passes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::physics::{
    DENSITY_MAX_KG_PER_M3, DENSITY_MIN_KG_PER_M3, PH_MAX, PH_MIN, TEMPERATURE_MAX_C,
    TEMPERATURE_MIN_C, VISCOSITY_MAX_PA_S, VISCOSITY_MIN_PA_S,
};
use crate::reading::{Quantity, Reading};

/// Per-constraint pass/fail, keyed `<quantity>_valid`
pub type ValidationReport = BTreeMap<String, bool>;

/// Inclusive plausible range for one quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConstraint {
    /// Quantity being checked
    pub quantity: Quantity,
    /// Lowest plausible value
    pub min: f64,
    /// Highest plausible value
    pub max: f64,
}

impl RangeConstraint {
    /// Create a constraint; swapped bounds are put back in order
    pub fn new(quantity: Quantity, min: f64, max: f64) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self { quantity, min, max }
    }

    /// True when the value is finite and inside the range
    pub fn check(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Report key for this constraint
    pub fn key(&self) -> String {
        format!("{}_valid", self.quantity.name())
    }
}

/// Checks a Reading against a set of plausible ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalValidator {
    constraints: Vec<RangeConstraint>,
}

impl Default for PhysicalValidator {
    fn default() -> Self {
        Self {
            constraints: vec![
                RangeConstraint::new(Quantity::Temperature, TEMPERATURE_MIN_C, TEMPERATURE_MAX_C),
                RangeConstraint::new(Quantity::Ph, PH_MIN, PH_MAX),
                RangeConstraint::new(Quantity::Viscosity, VISCOSITY_MIN_PA_S, VISCOSITY_MAX_PA_S),
                RangeConstraint::new(Quantity::Density, DENSITY_MIN_KG_PER_M3, DENSITY_MAX_KG_PER_M3),
            ],
        }
    }
}

impl PhysicalValidator {
    /// Validator with custom constraints
    pub fn with_constraints(constraints: Vec<RangeConstraint>) -> Self {
        Self { constraints }
    }

    /// Constraints in evaluation order
    pub fn constraints(&self) -> &[RangeConstraint] {
        &self.constraints
    }

    /// Evaluate every constraint independently
    pub fn validate(&self, reading: &Reading) -> ValidationReport {
        self.constraints
            .iter()
            .map(|c| (c.key(), c.check(reading.get(c.quantity))))
            .collect()
    }

    /// Constraints the reading violates
    pub fn violations<'a>(&'a self, reading: &'a Reading) -> impl Iterator<Item = &'a RangeConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| !c.check(reading.get(c.quantity)))
    }
}
