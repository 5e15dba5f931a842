//! Scenario settings loaded from TOML.
//!
//! Lengths are `uom` quantities and are written in metres, the SI base unit:
//!
//! ```toml
//! sea_level_rise = 0.5
//! kge = 74
//! canal_flow_scale = 1.0
//! forecast_drawdown = 0.1
//! pump_curve = "polynomial"
//!
//! [[canal_parameters]]
//! kge = 74
//! exponent = 1.016
//! factor = 2572.0
//! ```
//!
//! Every field is optional and falls back to the Krummhoern defaults.
//! Unknown keys are rejected, so a misspelled field cannot silently fall
//! back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::Length,
    length::{meter, millimeter},
};

use crate::drainage::{
    CanalLaw, CurveError, Parameters, Polynomial, PumpCurve, TabulatedCurve,
    ensemble::{CanalParameterSet, Scenario},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scenario")]
    Parse(#[from] toml::de::Error),
}

/// Which built-in pump curve to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpCurveKind {
    /// Quadratic fitted to the station chart.
    #[default]
    Polynomial,
    /// Linear interpolation of the station chart.
    Tabulated,
}

impl PumpCurveKind {
    /// Builds the selected curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart cannot be turned into a curve.
    pub fn build(self) -> Result<Box<dyn PumpCurve>, CurveError> {
        Ok(match self {
            Self::Polynomial => Box::new(Polynomial::krummhoern()),
            Self::Tabulated => Box::new(TabulatedCurve::krummhoern()?),
        })
    }
}

/// A scenario as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub sea_level_rise: Length,
    pub canal_flow_scale: f64,
    pub kge: u32,
    /// Open-water share of the catchment [%].
    pub canal_area_share: f64,
    pub storage_target_level: Length,
    pub forecast_drawdown: Length,
    pub max_pump_gradient: Length,
    pub inner_level_floor: Length,
    pub inner_level_search_step: Length,
    /// Water-balance depth stored at the start of the run.
    pub initial_volume: Length,
    pub pump_curve: PumpCurveKind,
    pub canal_parameters: Vec<CanalParameterSet>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let params = Parameters::default();
        let scenario = Scenario::default();
        let canal = CanalLaw::default();
        let mm = |value: f64| Length::new::<millimeter>(value);

        Self {
            sea_level_rise: mm(scenario.sea_level_rise),
            canal_flow_scale: scenario.canal_flow_scale,
            kge: scenario.kge,
            canal_area_share: params.canal_area_share,
            storage_target_level: mm(params.storage_target_level),
            forecast_drawdown: mm(params.forecast_drawdown),
            max_pump_gradient: mm(params.max_pump_gradient),
            inner_level_floor: mm(params.inner_level_floor),
            inner_level_search_step: mm(params.inner_level_search_step),
            initial_volume: mm(params.initial_volume),
            pump_curve: PumpCurveKind::default(),
            canal_parameters: vec![CanalParameterSet {
                kge: scenario.kge,
                exponent: canal.exponent,
                factor: canal.factor,
            }],
        }
    }
}

impl ScenarioConfig {
    /// Parses a scenario from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a field has the
    /// wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Simulation parameters in millimetres, with the default canal law.
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        Parameters {
            canal: CanalLaw::default(),
            canal_area_share: self.canal_area_share,
            storage_target_level: self.storage_target_level.get::<millimeter>(),
            forecast_drawdown: self.forecast_drawdown.get::<millimeter>(),
            max_pump_gradient: self.max_pump_gradient.get::<millimeter>(),
            inner_level_floor: self.inner_level_floor.get::<millimeter>(),
            inner_level_search_step: self.inner_level_search_step.get::<millimeter>(),
            initial_volume: self.initial_volume.get::<millimeter>(),
        }
    }

    #[must_use]
    pub fn scenario(&self) -> Scenario {
        Scenario {
            sea_level_rise: self.sea_level_rise.get::<millimeter>(),
            canal_flow_scale: self.canal_flow_scale,
            kge: self.kge,
            parameters: self.parameters(),
        }
    }

    /// Sea level rise in metres, as usually quoted for climate scenarios.
    #[must_use]
    pub fn sea_level_rise_m(&self) -> f64 {
        self.sea_level_rise.get::<meter>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ScenarioConfig::from_toml_str("").unwrap();
        let scenario = config.scenario();
        let defaults = Scenario::default();

        assert_eq!(scenario.kge, defaults.kge);
        assert_relative_eq!(scenario.sea_level_rise, 0.0);
        assert_relative_eq!(
            scenario.parameters.storage_target_level,
            defaults.parameters.storage_target_level,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            scenario.parameters.inner_level_search_step,
            defaults.parameters.inner_level_search_step,
            max_relative = 1e-12
        );
        assert_eq!(config.canal_parameters.len(), 1);
        assert_eq!(config.pump_curve, PumpCurveKind::Polynomial);
    }

    #[test]
    fn lengths_are_read_in_metres() {
        let config = ScenarioConfig::from_toml_str(
            r"
            sea_level_rise = 0.5
            forecast_drawdown = 0.1
            max_pump_gradient = 6.0
            ",
        )
        .unwrap();
        let scenario = config.scenario();

        assert_relative_eq!(config.sea_level_rise_m(), 0.5);
        assert_relative_eq!(scenario.sea_level_rise, 500.0, max_relative = 1e-12);
        assert_relative_eq!(scenario.parameters.forecast_drawdown, 100.0, max_relative = 1e-12);
        assert_relative_eq!(scenario.parameters.max_pump_gradient, 6000.0, max_relative = 1e-12);
        assert_relative_eq!(scenario.parameters.inner_level_floor, -2000.0, max_relative = 1e-12);
    }

    #[test]
    fn reads_canal_table_and_curve() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            kge = 70
            canal_flow_scale = 1.5
            pump_curve = "tabulated"

            [[canal_parameters]]
            kge = 70
            exponent = 1.1
            factor = 3000.0

            [[canal_parameters]]
            kge = 74
            exponent = 1.016
            factor = 2572.0
            "#,
        )
        .unwrap();

        assert_eq!(config.kge, 70);
        assert_eq!(config.pump_curve, PumpCurveKind::Tabulated);
        assert_eq!(config.canal_parameters.len(), 2);
        assert_relative_eq!(config.canal_parameters[0].exponent, 1.1);
        assert!(config.pump_curve.build().is_ok());
    }

    #[test]
    fn rejects_wrong_types() {
        let result = ScenarioConfig::from_toml_str("kge = \"high\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_misspelled_fields() {
        let result = ScenarioConfig::from_toml_str("forcast_drawdown = 0.1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = ScenarioConfig::from_toml_str(
            r"
            [[canal_parameters]]
            kge = 74
            exponent = 1.016
            factor = 2572.0
            scale = 2.0
            ",
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn built_curves_agree_near_the_chart() {
        let polynomial = PumpCurveKind::Polynomial.build().unwrap();
        let tabulated = PumpCurveKind::Tabulated.build().unwrap();

        let fitted = polynomial.flow(3000.0).unwrap();
        let charted = tabulated.flow(3000.0).unwrap();
        assert_relative_eq!(fitted, charted, max_relative = 0.05);
    }
}
