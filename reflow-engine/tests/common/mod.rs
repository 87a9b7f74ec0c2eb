//! Shared fixtures for engine tests

#![allow(dead_code)]

use reflow_core::{Quantity, Reading};
use reflow_engine::EngineConfig;

/// Configuration with forests small enough for tests
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.quality_model.forest.num_trees = 30;
    config.anomaly_model.isolation.num_trees = 60;
    config
}

/// 10×10 grid over 20–40 °C and pH 6.5–7.5 with scores peaking at 30 °C, pH 7
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
            scores.push(90.0 - 10.0 * (ph - 7.0).abs() - 0.5 * (temperature - 30.0).abs());
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
