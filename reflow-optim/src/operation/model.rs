//! Closed-form process performance model
//!
//! Empirical fits around the preferred operating point: efficiency peaks at
//! 1.0 L/min and 40 °C and saturates above 3 bar; quality peaks at pH 7.0 and
//! 35 °C with diminishing returns in cycle count. Energy and cost grow
//! linearly with load.

use serde::{Deserialize, Serialize};

use reflow_core::constants::physics::NEUTRAL_PH;

/// Weight of efficiency in the search objective
pub const EFFICIENCY_WEIGHT: f64 = 0.3;
/// Weight of quality in the search objective
pub const QUALITY_WEIGHT: f64 = 0.4;
/// Weight of energy in the search objective
pub const ENERGY_WEIGHT: f64 = 0.1;
/// Weight of cost in the search objective
pub const COST_WEIGHT: f64 = 0.2;

/// A point in the operating space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    /// Flow rate (L/min)
    pub flow_rate: f64,
    /// Loop pressure (bar)
    pub pressure: f64,
    /// Bath temperature (°C)
    pub temperature: f64,
    /// Target pH
    pub ph_target: f64,
    /// Filtration passes
    pub filtration_cycles: f64,
}

impl OperatingPoint {
    /// Point from a coordinate vector in parameter-space order
    pub fn from_slice(x: &[f64]) -> Self {
        Self {
            flow_rate: x[0],
            pressure: x[1],
            temperature: x[2],
            ph_target: x[3],
            filtration_cycles: x[4],
        }
    }

    /// Coordinates in parameter-space order
    pub fn to_vec(self) -> Vec<f64> {
        vec![
            self.flow_rate,
            self.pressure,
            self.temperature,
            self.ph_target,
            self.filtration_cycles,
        ]
    }

    /// Separation efficiency (0–0.7)
    pub fn efficiency(&self) -> f64 {
        let flow = 1.0 - (self.flow_rate - 1.0).abs() * 0.1;
        let pressure = (self.pressure / 3.0).min(1.0);
        let temperature = 1.0 - (self.temperature - 40.0).abs() * 0.005;
        0.7 * flow * pressure * temperature
    }

    /// Output quality (0–0.8)
    pub fn quality(&self) -> f64 {
        let ph = 1.0 - (self.ph_target - NEUTRAL_PH).abs() * 0.1;
        let temperature = 1.0 - (self.temperature - 35.0).abs() * 0.003;
        let cycles = 1.0 - (-0.5 * self.filtration_cycles).exp();
        0.8 * ph * temperature * cycles
    }

    /// Normalized energy use
    pub fn energy(&self) -> f64 {
        10.0 * (0.5 * self.flow_rate + 0.3 * self.pressure + 0.2 * self.filtration_cycles) / 100.0
    }

    /// Energy, chemical and maintenance cost
    pub fn cost(&self) -> f64 {
        self.energy() * 0.15
            + (self.ph_target - NEUTRAL_PH).abs() * 0.05
            + self.pressure * 0.02
            + self.filtration_cycles * 0.03
    }

    /// Scalarized performance to maximize
    pub fn performance(&self) -> f64 {
        EFFICIENCY_WEIGHT * self.efficiency() + QUALITY_WEIGHT * self.quality()
            - ENERGY_WEIGHT * self.energy()
            - COST_WEIGHT * self.cost()
    }
}

/// Search objective: negated performance of a coordinate vector
pub fn objective(x: &[f64]) -> f64 {
    -OperatingPoint::from_slice(x).performance()
}
