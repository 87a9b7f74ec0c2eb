//! Raw physico-chemical sensor snapshots
//!
//! A [`Reading`] maps named physical quantities to values in the units listed
//! on [`Quantity`]. Readings are immutable once built; missing quantities are
//! not errors and resolve to the documented defaults on lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Physical quantities reported by the recycling rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Bath temperature (°C)
    Temperature,
    /// pH
    Ph,
    /// Electrical conductivity (S/m)
    Conductivity,
    /// Dynamic viscosity (Pa·s)
    Viscosity,
    /// Density (kg/m³)
    Density,
    /// Surface tension (N/m)
    SurfaceTension,
    /// Flow rate (L/min)
    FlowRate,
    /// Loop pressure (bar)
    Pressure,
    /// Turbidity (NTU)
    Turbidity,
}

impl Quantity {
    /// Every quantity, in declaration order
    pub const ALL: [Quantity; 9] = [
        Quantity::Temperature,
        Quantity::Ph,
        Quantity::Conductivity,
        Quantity::Viscosity,
        Quantity::Density,
        Quantity::SurfaceTension,
        Quantity::FlowRate,
        Quantity::Pressure,
        Quantity::Turbidity,
    ];

    /// Value substituted when the quantity is missing
    pub const fn default_value(self) -> f64 {
        match self {
            Quantity::Temperature => defaults::TEMPERATURE_C,
            Quantity::Ph => defaults::PH,
            Quantity::Conductivity => defaults::CONDUCTIVITY_S_PER_M,
            Quantity::Viscosity => defaults::VISCOSITY_PA_S,
            Quantity::Density => defaults::DENSITY_KG_PER_M3,
            Quantity::SurfaceTension => defaults::SURFACE_TENSION_N_PER_M,
            Quantity::FlowRate => defaults::FLOW_RATE_L_PER_MIN,
            Quantity::Pressure => defaults::PRESSURE_BAR,
            Quantity::Turbidity => defaults::TURBIDITY_NTU,
        }
    }

    /// Stable snake_case name
    pub const fn name(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Ph => "ph",
            Quantity::Conductivity => "conductivity",
            Quantity::Viscosity => "viscosity",
            Quantity::Density => "density",
            Quantity::SurfaceTension => "surface_tension",
            Quantity::FlowRate => "flow_rate",
            Quantity::Pressure => "pressure",
            Quantity::Turbidity => "turbidity",
        }
    }
}

/// Sensor snapshot: quantity → value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading {
    values: BTreeMap<Quantity, f64>,
}

impl Reading {
    /// Empty reading; every lookup yields its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, quantity: Quantity, value: f64) -> Self {
        self.values.insert(quantity, value);
        self
    }

    /// Value of a quantity, or its documented default when absent
    pub fn get(&self, quantity: Quantity) -> f64 {
        self.values
            .get(&quantity)
            .copied()
            .unwrap_or_else(|| quantity.default_value())
    }

    /// Value only if it was actually reported
    pub fn reported(&self, quantity: Quantity) -> Option<f64> {
        self.values.get(&quantity).copied()
    }

    /// Quantities that were reported
    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.values.keys().copied()
    }

    /// Number of reported quantities
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bath temperature (°C)
    pub fn temperature(&self) -> f64 {
        self.get(Quantity::Temperature)
    }

    /// pH
    pub fn ph(&self) -> f64 {
        self.get(Quantity::Ph)
    }

    /// Conductivity (S/m)
    pub fn conductivity(&self) -> f64 {
        self.get(Quantity::Conductivity)
    }
}

impl FromIterator<(Quantity, f64)> for Reading {
    fn from_iter<I: IntoIterator<Item = (Quantity, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
