//! Shared fixtures for reflow-core integration tests
//!
//! - Readings from a healthy bath and from typical fault conditions
//! - Detector candidate sets with known fusion outcomes

#![allow(dead_code)]

use reflow_core::{ClassifierResult, DefectType, DetectionCandidate, Quantity, Reading};

/// Bath in nominal condition, every quantity reported
pub fn nominal_reading() -> Reading {
    Reading::new()
        .with(Quantity::Temperature, 24.0)
        .with(Quantity::Ph, 7.1)
        .with(Quantity::Conductivity, 0.0012)
        .with(Quantity::Viscosity, 0.0021)
        .with(Quantity::Density, 948.0)
        .with(Quantity::SurfaceTension, 0.026)
        .with(Quantity::FlowRate, 1.1)
        .with(Quantity::Pressure, 2.2)
        .with(Quantity::Turbidity, 0.12)
}

/// Bath left on the heater
pub fn overheated_reading() -> Reading {
    nominal_reading().with(Quantity::Temperature, 95.0)
}

/// Only the quantities a basic probe reports
pub fn partial_reading() -> Reading {
    Reading::new()
        .with(Quantity::Temperature, 30.0)
        .with(Quantity::Ph, 6.9)
}

/// Candidates whose fused verdict is crack at 0.75
pub fn crack_candidates() -> Vec<DetectionCandidate> {
    vec![
        DetectionCandidate::new(DefectType::Crack, 0.9, None),
        DetectionCandidate::new(DefectType::Crack, 0.6, None),
        DetectionCandidate::new(DefectType::Porosity, 0.55, None),
    ]
}

/// Classifier vote with no distribution
pub fn classifier(defect: DefectType, confidence: f64) -> ClassifierResult {
    ClassifierResult::top1(defect, confidence)
}

/// Assert two floats agree to a relative tolerance
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol * scale,
        "{actual} differs from {expected} by more than {tol}"
    );
}
