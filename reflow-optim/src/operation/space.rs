//! Named operating parameters and their bounds

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reflow_core::{DecisionError, DecisionResult};

use crate::bounds::Bounds;

/// Parameter names in coordinate order
pub const PARAMETER_NAMES: [&str; 5] = [
    "flow_rate",
    "pressure",
    "temperature",
    "ph_target",
    "filtration_cycles",
];

/// Caller-supplied limits for one parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterConstraint {
    /// Lower limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ParameterConstraint {
    /// Both limits
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Upper limit only
    pub fn at_most(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    /// Lower limit only
    pub fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }
}

/// Constraint per parameter name
pub type OperationConstraints = BTreeMap<String, ParameterConstraint>;

/// Default bounds of the operating space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSpace {
    /// Flow rate (L/min)
    pub flow_rate: (f64, f64),
    /// Loop pressure (bar)
    pub pressure: (f64, f64),
    /// Bath temperature (°C)
    pub temperature: (f64, f64),
    /// Target pH
    pub ph_target: (f64, f64),
    /// Filtration passes
    pub filtration_cycles: (f64, f64),
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self {
            flow_rate: (0.1, 2.0),
            pressure: (1.0, 5.0),
            temperature: (20.0, 60.0),
            ph_target: (6.5, 7.5),
            filtration_cycles: (1.0, 5.0),
        }
    }
}

impl ParameterSpace {
    /// Ranges in coordinate order
    pub fn ranges(&self) -> [(f64, f64); 5] {
        [
            self.flow_rate,
            self.pressure,
            self.temperature,
            self.ph_target,
            self.filtration_cycles,
        ]
    }

    /// Default bounds narrowed by the caller's constraints
    ///
    /// A limit can only tighten a range, never widen it. Unknown names and
    /// empty intersections are rejected.
    pub fn bounds(&self, constraints: Option<&OperationConstraints>) -> DecisionResult<Bounds> {
        let mut ranges = self.ranges();

        for (name, constraint) in constraints.into_iter().flatten() {
            let index = PARAMETER_NAMES
                .iter()
                .position(|n| *n == name.as_str())
                .ok_or_else(|| DecisionError::validation(format!("unknown parameter '{name}'")))?;

            let (lo, hi) = &mut ranges[index];
            if let Some(min) = constraint.min {
                *lo = lo.max(min);
            }
            if let Some(max) = constraint.max {
                *hi = hi.min(max);
            }
            if *lo > *hi {
                return Err(DecisionError::validation(format!(
                    "constraint on '{name}' leaves an empty range [{lo}, {hi}]"
                )));
            }
        }

        Bounds::new(ranges.to_vec())
    }
}
