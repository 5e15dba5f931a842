use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CanalLaw, CurveError};

/// Converts `canal_area_share`, given in percent, to a fraction.
const PERCENT: f64 = 100.0;

/// Canal, pump station, and storage parameters for one simulation run.
///
/// Levels and gradients are in millimetres, volumes in water-balance
/// millimetres.
///
/// - `canal`: outflow law of the canal network
/// - `canal_area_share`: open-water share of the catchment [%]
/// - `storage_target_level`: canal level at zero stored volume
/// - `forecast_drawdown`: pre-event lowering of the canal level that bounds
///   how far storage may be drawn down
/// - `max_pump_gradient`: largest tide-to-inner gradient the pumps run against
/// - `inner_level_floor`: technical lower limit of the inner basin level
/// - `inner_level_search_step`: resolution of the equilibrium search
/// - `initial_volume`: stored volume at the start of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub canal: CanalLaw,
    pub canal_area_share: f64,
    pub storage_target_level: f64,
    pub forecast_drawdown: f64,
    pub max_pump_gradient: f64,
    pub inner_level_floor: f64,
    pub inner_level_search_step: f64,
    pub initial_volume: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            canal: CanalLaw::default(),
            canal_area_share: 4.0,
            storage_target_level: -1400.0,
            forecast_drawdown: 0.0,
            max_pump_gradient: 4000.0,
            inner_level_floor: -2000.0,
            inner_level_search_step: 1.0,
            initial_volume: 0.0,
        }
    }
}

/// Errors raised when parameters cannot describe a valid drainage system.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error(
        "pump flow rises from {flow} to {next_flow} as the gradient grows from {gradient} to {next_gradient}"
    )]
    NonMonotonicPumpCurve {
        gradient: f64,
        next_gradient: f64,
        flow: f64,
        next_flow: f64,
    },

    #[error("pump curve evaluation failed")]
    Curve(#[from] CurveError),
}

impl Parameters {
    /// Checks that every field is finite and within its physical range.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let fields = [
            ("canal.exponent", self.canal.exponent),
            ("canal.factor", self.canal.factor),
            ("canal_area_share", self.canal_area_share),
            ("storage_target_level", self.storage_target_level),
            ("forecast_drawdown", self.forecast_drawdown),
            ("max_pump_gradient", self.max_pump_gradient),
            ("inner_level_floor", self.inner_level_floor),
            ("inner_level_search_step", self.inner_level_search_step),
            ("initial_volume", self.initial_volume),
        ];
        if let Some(&(name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParameterError::NonFinite { name, value });
        }

        let positive = [
            ("canal.exponent", self.canal.exponent),
            ("canal.factor", self.canal.factor),
            ("canal_area_share", self.canal_area_share),
            ("inner_level_search_step", self.inner_level_search_step),
        ];
        if let Some(&(name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ParameterError::NotPositive { name, value });
        }

        if self.forecast_drawdown < 0.0 {
            return Err(ParameterError::Negative {
                name: "forecast_drawdown",
                value: self.forecast_drawdown,
            });
        }

        Ok(())
    }

    /// Canal level for a stored volume.
    #[must_use]
    pub fn volume_to_level(&self, volume: f64) -> f64 {
        self.storage_target_level + volume * PERCENT / self.canal_area_share
    }

    /// Stored volume for a canal level; inverse of [`Parameters::volume_to_level`].
    #[must_use]
    pub fn level_to_volume(&self, level: f64) -> f64 {
        (level - self.storage_target_level) * self.canal_area_share / PERCENT
    }

    /// Lowest stored volume the drawdown target allows.
    #[must_use]
    pub fn floor_volume(&self) -> f64 {
        -self.forecast_drawdown * self.canal_area_share / PERCENT
    }
}
