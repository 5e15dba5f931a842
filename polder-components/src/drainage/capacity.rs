//! Instantaneous drainage capacity of the pump station and canal network.
//!
//! The inner basin level at the pump station is not observed. It settles
//! where the pumps keep pace with what the canals deliver: lower levels give
//! the canals more head but force the pumps to lift further. The solver
//! raises the inner level from its lowest admissible value in fixed steps
//! until pump flow is no longer the limit.
//!
//! When the tide is at or below the inner level the station can sluice by
//! gravity. Sluicing is approximated by the pump flow at a 1 mm gradient,
//! which stands in for "essentially free" drainage and is not a physical
//! sluice rating.

use thiserror::Error;
use tracing::trace;

use polder_core::model::Model;
use polder_solve::equation::{EquationProblem, Observer, march};

use super::{CanalLaw, CurveError, Parameters, PumpCurve};

/// Gradient [mm] at which the pump curve is evaluated while sluicing.
pub const SLUICE_GRADIENT: f64 = 1.0;

/// Outer and canal levels at one instant [mm].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub tide_level: f64,
    pub canal_level: f64,
    /// Wind set-up between canal and basin that does not drive flow.
    pub wind_gradient: f64,
}

/// Pump and canal flows at a candidate inner level [mm/h].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flows {
    pub pump: f64,
    pub canal: f64,
}

/// Drainage at equilibrium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacity {
    /// Flow delivered by the canals and pumped out [mm/h].
    pub actual_flow: f64,
    /// Equilibrium inner basin level [mm].
    ///
    /// Never above the canal level. A canal level below
    /// `inner_level_floor` is returned as is, so the result can then lie
    /// below the floor.
    pub inner_level: f64,
    /// Flow the pumps could sustain at that level [mm/h].
    pub pump_capacity: f64,
}

/// Errors raised by the capacity solver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{name} is not finite: {value}")]
    NonFiniteLevel { name: &'static str, value: f64 },

    #[error("search step must be finite and strictly positive, got {step}")]
    InvalidStep { step: f64 },

    /// The search failed; an exhausted bound means the parameters are inconsistent.
    #[error("equilibrium search failed")]
    Search(#[from] march::Error),
}

/// Pump station and canal at fixed outer and canal levels.
struct Station<'a, P: ?Sized> {
    levels: Levels,
    canal: CanalLaw,
    pump: &'a P,
}

impl<P: PumpCurve + ?Sized> Model for Station<'_, P> {
    type Input = f64;
    type Output = Flows;
    type Error = CurveError;

    fn call(&self, inner_level: &f64) -> Result<Flows, CurveError> {
        let Levels {
            tide_level,
            canal_level,
            wind_gradient,
        } = self.levels;

        let gradient = if tide_level <= *inner_level {
            SLUICE_GRADIENT
        } else {
            tide_level - inner_level
        };
        let pump = self.pump.flow(gradient)?;
        if !pump.is_finite() {
            return Err(CurveError::NonFiniteFlow {
                gradient,
                flow: pump,
            });
        }

        Ok(Flows {
            pump: pump.max(0.0),
            canal: self.canal.flow(canal_level - inner_level - wind_gradient),
        })
    }
}

/// Pump flow minus canal flow; non-negative once the pumps keep pace.
struct PumpKeepsPace;

impl EquationProblem<1> for PumpKeepsPace {
    type Input = f64;
    type Output = Flows;
    type InputError = std::convert::Infallible;
    type ResidualError = std::convert::Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<f64, Self::InputError> {
        Ok(x[0])
    }

    fn residuals(&self, _input: &f64, flows: &Flows) -> Result<[f64; 1], Self::ResidualError> {
        Ok([flows.pump - flows.canal])
    }
}

/// Solves for the equilibrium inner level and the resulting flows.
///
/// # Errors
///
/// Returns an error if a level is not finite, the search step is invalid,
/// the pump curve fails, or the search exhausts its bound.
pub fn solve<P>(levels: Levels, params: &Parameters, pump: &P) -> Result<Capacity, Error>
where
    P: PumpCurve + ?Sized,
{
    solve_observed(levels, params, pump, ())
}

/// Like [`solve`], reporting every search candidate to `observer`.
///
/// # Errors
///
/// Returns the same errors as [`solve`].
pub fn solve_observed<P, Obs>(
    levels: Levels,
    params: &Parameters,
    pump: &P,
    observer: Obs,
) -> Result<Capacity, Error>
where
    P: PumpCurve + ?Sized,
    Obs: for<'a> Observer<march::Event<'a, f64, Flows>, march::Action>,
{
    for (name, value) in [
        ("tide_level", levels.tide_level),
        ("canal_level", levels.canal_level),
        ("wind_gradient", levels.wind_gradient),
    ] {
        if !value.is_finite() {
            return Err(Error::NonFiniteLevel { name, value });
        }
    }

    let step = params.inner_level_search_step;
    if !step.is_finite() || step <= 0.0 {
        return Err(Error::InvalidStep { step });
    }

    let start = params
        .inner_level_floor
        .max(levels.tide_level - params.max_pump_gradient);

    let station = Station {
        levels,
        canal: params.canal,
        pump,
    };
    let config = march::Config {
        step,
        max_iters: iteration_bound(start, &levels, step),
    };

    let solution = march::solve(&station, &PumpKeepsPace, start, &config, observer)?;
    let flows = solution.snapshot.output;
    let inner_level = solution.x.min(levels.canal_level);

    trace!(
        tide_level = levels.tide_level,
        canal_level = levels.canal_level,
        inner_level,
        iters = solution.iters,
        "drainage equilibrium"
    );

    Ok(Capacity {
        actual_flow: flows.canal,
        inner_level,
        pump_capacity: flows.pump,
    })
}

/// Number of steps after which the canal head is exhausted.
///
/// At `start + k * step >= canal_level - wind_gradient` the canal delivers
/// nothing, so the residual is non-negative there for any pump curve. One
/// extra step absorbs rounding in the candidate grid.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn iteration_bound(start: f64, levels: &Levels, step: f64) -> usize {
    let head = levels.canal_level - levels.wind_gradient - start;
    if head <= 0.0 {
        0
    } else {
        ((head / step).ceil() as usize).saturating_add(1)
    }
}
