//! Scenario ensembles over calibrated canal parameters.
//!
//! The canal law is calibrated offline against observed canal levels, which
//! yields many parameter pairs per goodness-of-fit score. A scenario picks
//! every pair with the requested score and simulates each one; the spread of
//! the members shows how much the result depends on the calibration.
//!
//! Members are independent runs sharing only the read-only forcing and pump
//! curve. With the `parallel` feature they run on the rayon thread pool.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{CanalLaw, ForcingSeries, Parameters, PumpCurve, storage};

/// One row of a canal calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanalParameterSet {
    /// Kling-Gupta efficiency of the calibration, times 100.
    pub kge: u32,
    pub exponent: f64,
    pub factor: f64,
}

/// Climate and management assumptions applied to every ensemble member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Offset added to every tide level [mm].
    pub sea_level_rise: f64,
    /// Multiplier on canal capacity; the canal factor is divided by it.
    pub canal_flow_scale: f64,
    /// Calibration score selecting the canal parameter rows.
    pub kge: u32,
    /// Base parameters; the canal law is replaced per member.
    pub parameters: Parameters,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            sea_level_rise: 0.0,
            canal_flow_scale: 1.0,
            kge: 74,
            parameters: Parameters::default(),
        }
    }
}

impl Scenario {
    /// Checks the scenario-level settings.
    ///
    /// # Errors
    ///
    /// Returns a reason if the sea level rise is not finite or the canal flow
    /// scale is not finite and positive.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.sea_level_rise.is_finite() {
            return Err("sea_level_rise must be finite");
        }
        if !self.canal_flow_scale.is_finite() || self.canal_flow_scale <= 0.0 {
            return Err("canal_flow_scale must be finite and positive");
        }
        Ok(())
    }
}

/// The simulation of one canal parameter row.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Index of the row in the calibration table.
    pub row: usize,
    /// Canal law used, after scaling.
    pub canal: CanalLaw,
    pub output: storage::Output,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no canal parameter rows with kge {kge}")]
    NoParameters { kge: u32 },

    #[error("invalid scenario: {reason}")]
    InvalidScenario { reason: &'static str },

    #[error("simulation of canal parameter row {row} failed")]
    Run {
        row: usize,
        #[source]
        source: storage::Error,
    },
}

/// Simulations of one scenario, in calibration table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    members: Vec<Member>,
}

impl Ensemble {
    /// Simulates every table row whose score matches the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario is invalid, no row matches, or a
    /// member run fails.
    pub fn run<P>(
        scenario: &Scenario,
        table: &[CanalParameterSet],
        forcing: &ForcingSeries,
        pump: &P,
    ) -> Result<Self, Error>
    where
        P: PumpCurve + ?Sized,
    {
        scenario
            .validate()
            .map_err(|reason| Error::InvalidScenario { reason })?;

        let rows: Vec<(usize, CanalLaw)> = table
            .iter()
            .enumerate()
            .filter(|(_, set)| set.kge == scenario.kge)
            .map(|(row, set)| {
                let canal = CanalLaw::new(set.exponent, set.factor);
                (row, canal.scaled(scenario.canal_flow_scale))
            })
            .collect();
        if rows.is_empty() {
            return Err(Error::NoParameters { kge: scenario.kge });
        }

        let forcing = forcing.with_sea_level_rise(scenario.sea_level_rise);
        debug!(
            members = rows.len(),
            kge = scenario.kge,
            sea_level_rise = scenario.sea_level_rise,
            canal_flow_scale = scenario.canal_flow_scale,
            "running ensemble"
        );

        let simulate = |&(row, canal): &(usize, CanalLaw)| {
            let params = Parameters {
                canal,
                ..scenario.parameters
            };
            storage::run(&forcing, params, pump)
                .map(|output| Member { row, canal, output })
                .map_err(|source| Error::Run { row, source })
        };

        #[cfg(feature = "parallel")]
        let members = rows.par_iter().map(simulate).collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let members = rows.iter().map(simulate).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { members })
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Per-step minimum, mean, and maximum canal level across members.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let Some(first) = self.members.first() else {
            return Envelope::default();
        };

        let times = first.output.times();
        let mut min = vec![f64::INFINITY; times.len()];
        let mut max = vec![f64::NEG_INFINITY; times.len()];
        let mut mean = vec![0.0; times.len()];

        for member in &self.members {
            for (i, record) in member.output.records().iter().enumerate() {
                min[i] = min[i].min(record.canal_level);
                max[i] = max[i].max(record.canal_level);
                mean[i] += record.canal_level;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let count = self.members.len() as f64;
        for value in &mut mean {
            *value /= count;
        }

        Envelope {
            times,
            min,
            mean,
            max,
        }
    }
}

/// Spread of canal levels across an ensemble [mm].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub times: Vec<Timestamp>,
    pub min: Vec<f64>,
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::drainage::Polynomial;

    fn forcing() -> ForcingSeries {
        ForcingSeries::hourly(
            "2023-12-21T00:00:00Z".parse().unwrap(),
            &[0.0, 1500.0, 3000.0],
            &[100.0, 0.0, 0.0],
        )
        .unwrap()
    }

    fn table() -> Vec<CanalParameterSet> {
        vec![
            CanalParameterSet {
                kge: 74,
                exponent: 1.016,
                factor: 2572.0,
            },
            CanalParameterSet {
                kge: 60,
                exponent: 1.2,
                factor: 9000.0,
            },
            CanalParameterSet {
                kge: 74,
                exponent: 1.016,
                factor: 5144.0,
            },
        ]
    }

    #[test]
    fn runs_matching_rows_in_table_order() {
        let pump = Polynomial::krummhoern();
        let ensemble = Ensemble::run(&Scenario::default(), &table(), &forcing(), &pump).unwrap();

        let rows: Vec<usize> = ensemble.members().iter().map(|m| m.row).collect();
        assert_eq!(rows, vec![0, 2]);

        let direct = storage::run(&forcing(), Parameters::default(), &pump).unwrap();
        assert_eq!(ensemble.members()[0].output, direct);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_members_match_serial_runs() {
        let pump = Polynomial::krummhoern();
        let scenario = Scenario {
            sea_level_rise: 300.0,
            canal_flow_scale: 1.5,
            ..Scenario::default()
        };
        let ensemble = Ensemble::run(&scenario, &table(), &forcing(), &pump).unwrap();

        let raised = forcing().with_sea_level_rise(scenario.sea_level_rise);
        let serial: Vec<storage::Output> = table()
            .iter()
            .filter(|set| set.kge == scenario.kge)
            .map(|set| {
                let params = Parameters {
                    canal: CanalLaw::new(set.exponent, set.factor).scaled(1.5),
                    ..scenario.parameters
                };
                storage::run(&raised, params, &pump).unwrap()
            })
            .collect();

        assert_eq!(ensemble.members().len(), serial.len());
        for (member, output) in ensemble.members().iter().zip(&serial) {
            assert_eq!(&member.output, output);
        }
    }

    #[test]
    fn slower_canals_keep_more_water() {
        let pump = Polynomial::krummhoern();
        let ensemble = Ensemble::run(&Scenario::default(), &table(), &forcing(), &pump).unwrap();

        let fast = ensemble.members()[0].output.canal_levels();
        let slow = ensemble.members()[1].output.canal_levels();
        assert!(fast.iter().zip(&slow).all(|(f, s)| f < s));
    }

    #[test]
    fn canal_flow_scale_divides_factor() {
        let pump = Polynomial::krummhoern();
        let scenario = Scenario {
            canal_flow_scale: 2.0,
            ..Scenario::default()
        };
        let ensemble = Ensemble::run(&scenario, &table(), &forcing(), &pump).unwrap();

        assert_relative_eq!(ensemble.members()[0].canal.factor, 1286.0);
        assert_relative_eq!(ensemble.members()[1].canal.factor, 2572.0);
    }

    #[test]
    fn sea_level_rise_reduces_drainage() {
        let pump = Polynomial::krummhoern();
        let today = Ensemble::run(&Scenario::default(), &table(), &forcing(), &pump).unwrap();
        let raised = Ensemble::run(
            &Scenario {
                sea_level_rise: 1000.0,
                ..Scenario::default()
            },
            &table(),
            &forcing(),
            &pump,
        )
        .unwrap();

        let today_flow = today.members()[0].output.total_flow();
        let raised_flow = raised.members()[0].output.total_flow();
        assert!(raised_flow < today_flow);
    }

    #[test]
    fn envelope_brackets_members() {
        let pump = Polynomial::krummhoern();
        let ensemble = Ensemble::run(&Scenario::default(), &table(), &forcing(), &pump).unwrap();
        let envelope = ensemble.envelope();

        assert_eq!(envelope.times.len(), 3);
        for member in ensemble.members() {
            for (i, level) in member.output.canal_levels().iter().enumerate() {
                assert!(envelope.min[i] <= *level && *level <= envelope.max[i]);
            }
        }
        let a = ensemble.members()[0].output.canal_levels();
        let b = ensemble.members()[1].output.canal_levels();
        assert_relative_eq!(envelope.mean[2], 0.5 * (a[2] + b[2]), max_relative = 1e-12);
    }

    #[test]
    fn missing_score_is_an_error() {
        let pump = Polynomial::krummhoern();
        let scenario = Scenario {
            kge: 90,
            ..Scenario::default()
        };

        assert!(matches!(
            Ensemble::run(&scenario, &table(), &forcing(), &pump),
            Err(Error::NoParameters { kge: 90 })
        ));
    }

    #[test]
    fn rejects_invalid_scale() {
        let pump = Polynomial::krummhoern();
        let scenario = Scenario {
            canal_flow_scale: 0.0,
            ..Scenario::default()
        };

        assert!(matches!(
            Ensemble::run(&scenario, &table(), &forcing(), &pump),
            Err(Error::InvalidScenario { .. })
        ));
    }

    #[test]
    fn failed_member_reports_its_row() {
        let pump = Polynomial::krummhoern();
        let mut table = table();
        table[2].exponent = -1.0;

        assert!(matches!(
            Ensemble::run(&Scenario::default(), &table, &forcing(), &pump),
            Err(Error::Run { row: 2, .. })
        ));
    }
}
