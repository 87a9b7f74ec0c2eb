//! Feature Extraction
//!
//! ## Overview
//!
//! Models never see a [`Reading`] directly. They see a [`FeatureVector`]: a
//! fixed-length sequence of floats whose order is defined by a versioned
//! [`FeatureSchema`]. A model trained on one schema and queried with another
//! produces meaningless numbers without any error, so the schema travels with
//! the vector and models check it.
//!
//! ## Schemas
//!
//! ### Quality (v1, 12 features)
//! ```text
//! temperature, ph, conductivity, viscosity, density, surface_tension,
//! reynolds_proxy  = density × 0.1 / viscosity
//! prandtl_proxy   = viscosity / (density × 0.001)
//! weber_proxy     = density × 0.1² × 0.01 / surface_tension
//! ph_deviation    = |ph − 7|
//! temperature_norm  = temperature / 100
//! conductivity_norm = conductivity × 1000
//! ```
//!
//! ### Anomaly (v1, 11 features)
//! ```text
//! temperature, ph, conductivity, viscosity, density,
//! flow_rate, pressure, turbidity,
//! temperature × viscosity, ph − 7 (signed), conductivity / density
//! ```
//!
//! Missing Reading fields take their defaults before the composites are
//! derived. Extraction is a pure function; a zero viscosity or surface tension
//! yields a non-finite composite which the consuming model rejects.

use serde::{Deserialize, Serialize};

use crate::constants::physics::{
    CHARACTERISTIC_LENGTH_M, CHARACTERISTIC_VELOCITY_M_PER_S, NEUTRAL_PH,
    THERMAL_DIFFUSIVITY_PROXY, WEBER_LENGTH_M,
};
use crate::reading::{Quantity, Reading};

/// Current version of both feature layouts
pub const SCHEMA_VERSION: u32 = 1;

const QUALITY_FEATURE_NAMES: [&str; 12] = [
    "temperature",
    "ph",
    "conductivity",
    "viscosity",
    "density",
    "surface_tension",
    "reynolds_proxy",
    "prandtl_proxy",
    "weber_proxy",
    "ph_deviation",
    "temperature_norm",
    "conductivity_norm",
];

const ANOMALY_FEATURE_NAMES: [&str; 11] = [
    "temperature",
    "ph",
    "conductivity",
    "viscosity",
    "density",
    "flow_rate",
    "pressure",
    "turbidity",
    "temperature_viscosity",
    "ph_offset",
    "conductivity_density_ratio",
];

/// Versioned feature layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// Layout consumed by the quality regressor
    Quality,
    /// Layout consumed by the anomaly ensemble
    Anomaly,
}

impl FeatureSchema {
    /// Ordered feature names
    pub fn names(self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Quality => &QUALITY_FEATURE_NAMES,
            FeatureSchema::Anomaly => &ANOMALY_FEATURE_NAMES,
        }
    }

    /// Number of features
    pub fn len(self) -> usize {
        self.names().len()
    }

    /// Layout version
    pub fn version(self) -> u32 {
        SCHEMA_VERSION
    }
}

/// Ordered features tagged with the layout that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    fn new(schema: FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self { schema, values }
    }

    /// Layout of this vector
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Feature values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume into the raw values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for extractor output
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema
            .names()
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// Index of the first non-finite feature, if any
    pub fn first_non_finite(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_finite())
    }
}

/// Deterministic mapping from a Reading to a FeatureVector
pub trait FeatureExtractor {
    /// Layout produced by this extractor
    fn schema(&self) -> FeatureSchema;

    /// Extract features; never fails, missing fields take defaults
    fn extract(&self, reading: &Reading) -> FeatureVector;

    /// Extract a batch in input order
    fn extract_all(&self, readings: &[Reading]) -> Vec<FeatureVector> {
        readings.iter().map(|r| self.extract(r)).collect()
    }
}

/// Feature layout for quality prediction
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityFeatures;

impl FeatureExtractor for QualityFeatures {
    fn schema(&self) -> FeatureSchema {
        FeatureSchema::Quality
    }

    fn extract(&self, reading: &Reading) -> FeatureVector {
        let temperature = reading.get(Quantity::Temperature);
        let ph = reading.get(Quantity::Ph);
        let conductivity = reading.get(Quantity::Conductivity);
        let viscosity = reading.get(Quantity::Viscosity);
        let density = reading.get(Quantity::Density);
        let surface_tension = reading.get(Quantity::SurfaceTension);

        let reynolds_proxy = density * CHARACTERISTIC_LENGTH_M / viscosity;
        let prandtl_proxy = viscosity / (density * THERMAL_DIFFUSIVITY_PROXY);
        let weber_proxy = density
            * CHARACTERISTIC_VELOCITY_M_PER_S.powi(2)
            * WEBER_LENGTH_M
            / surface_tension;

        FeatureVector::new(
            FeatureSchema::Quality,
            vec![
                temperature,
                ph,
                conductivity,
                viscosity,
                density,
                surface_tension,
                reynolds_proxy,
                prandtl_proxy,
                weber_proxy,
                (ph - NEUTRAL_PH).abs(),
                temperature / 100.0,
                conductivity * 1000.0,
            ],
        )
    }
}

/// Feature layout for anomaly detection
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyFeatures;

impl FeatureExtractor for AnomalyFeatures {
    fn schema(&self) -> FeatureSchema {
        FeatureSchema::Anomaly
    }

    fn extract(&self, reading: &Reading) -> FeatureVector {
        let temperature = reading.get(Quantity::Temperature);
        let ph = reading.get(Quantity::Ph);
        let conductivity = reading.get(Quantity::Conductivity);
        let viscosity = reading.get(Quantity::Viscosity);
        let density = reading.get(Quantity::Density);

        FeatureVector::new(
            FeatureSchema::Anomaly,
            vec![
                temperature,
                ph,
                conductivity,
                viscosity,
                density,
                reading.get(Quantity::FlowRate),
                reading.get(Quantity::Pressure),
                reading.get(Quantity::Turbidity),
                temperature * viscosity,
                ph - NEUTRAL_PH,
                conductivity / density,
            ],
        )
    }
}
