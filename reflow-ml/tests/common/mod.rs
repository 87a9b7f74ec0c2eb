//! Shared corpora for reflow-ml integration tests

#![allow(dead_code)]

use reflow_core::{Quantity, Reading};

/// Synthetic quality target peaking at pH 7 and 30 °C
pub fn true_quality(temperature: f64, ph: f64) -> f64 {
    90.0 - 10.0 * (ph - 7.0).abs() - 0.5 * (temperature - 30.0).abs()
}

/// 10×10 grid over 20–40 °C and pH 6.5–7.5 with its true scores
pub fn quality_grid() -> (Vec<Reading>, Vec<f64>) {
    let mut readings = Vec::new();
    let mut scores = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            let temperature = 20.0 + 20.0 * i as f64 / 9.0;
            let ph = 6.5 + j as f64 / 9.0;
            readings.push(
                Reading::new()
                    .with(Quantity::Temperature, temperature)
                    .with(Quantity::Ph, ph),
            );
            scores.push(true_quality(temperature, ph));
        }
    }
    (readings, scores)
}

/// Normal operation: 15 distinct operating points, 8 readings each
pub fn normal_corpus() -> Vec<Reading> {
    (0..120)
        .map(|i| {
            Reading::new()
                .with(Quantity::Temperature, 23.0 + 0.5 * (i % 5) as f64)
                .with(Quantity::Ph, 6.95 + 0.05 * ((i / 5) % 3) as f64)
        })
        .collect()
}

/// Reading from a bath left on the heater
pub fn overheated() -> Reading {
    Reading::new()
        .with(Quantity::Temperature, 95.0)
        .with(Quantity::Ph, 7.0)
}

/// Readings scattered uniformly around the defaults, with no repeated operating point
pub fn scattered_corpus(count: usize) -> Vec<Reading> {
    use rand::Rng;

    let mut rng = reflow_ml::rng::seeded(7);
    (0..count)
        .map(|_| {
            Reading::new()
                .with(Quantity::Temperature, rng.gen_range(18.0..30.0))
                .with(Quantity::Ph, rng.gen_range(6.6..7.4))
                .with(Quantity::Conductivity, rng.gen_range(0.0008..0.0012))
                .with(Quantity::Viscosity, rng.gen_range(0.0018..0.0022))
                .with(Quantity::Density, rng.gen_range(930.0..970.0))
                .with(Quantity::FlowRate, rng.gen_range(0.8..1.2))
                .with(Quantity::Pressure, rng.gen_range(1.8..2.2))
                .with(Quantity::Turbidity, rng.gen_range(0.05..0.15))
        })
        .collect()
}
