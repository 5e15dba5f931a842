use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Pump capacities at or below this value [mm/h] count as no capacity.
pub const DEGENERATE_CAPACITY: f64 = 1e-12;

/// Share of pump capacity used during a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Utilization {
    /// Flow divided by pump capacity.
    Ratio(f64),
    /// Water was moved although the pumps had no capacity.
    Undefined,
}

impl Utilization {
    /// Utilization of a pump station moving `flow` at `capacity`.
    ///
    /// With no capacity and no flow the station is idle, which is a ratio of
    /// zero rather than an undefined value.
    #[must_use]
    pub fn from_flow(flow: f64, capacity: f64) -> Self {
        if capacity > DEGENERATE_CAPACITY {
            Self::Ratio(flow / capacity)
        } else if flow.abs() <= DEGENERATE_CAPACITY {
            Self::Ratio(0.0)
        } else {
            Self::Undefined
        }
    }

    #[must_use]
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Ratio(ratio) => Some(ratio),
            Self::Undefined => None,
        }
    }
}

/// Simulated state of the drainage system after one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub time: Timestamp,
    /// Stored volume after drainage and the floor clamp [mm].
    pub stored_volume: f64,
    /// Canal level of the stored volume [mm].
    pub canal_level: f64,
    /// Equilibrium inner basin level during the step [mm].
    pub inner_level: f64,
    /// Flow the pumps could sustain [mm/h].
    pub pump_capacity: f64,
    /// Flow attributed to the pumps; recharge once storage sits on the floor.
    pub flow: f64,
    pub pump_utilization: Utilization,
    /// Whether the stored volume ended the step on the floor.
    pub at_floor: bool,
}
