//! Storage simulation over a forcing series.
//!
//! The catchment is a single storage whose volume sets the canal level.
//! Each step adds recharge, drains what the pump station and canals can move
//! at that moment, and keeps the volume from falling below the drawdown
//! floor. Steps run strictly in time order.

mod output;
mod record;

use thiserror::Error;
use tracing::{debug, trace, warn};

use polder_core::model::Model;

pub use output::Output;
pub use record::{DEGENERATE_CAPACITY, StepRecord, Utilization};

use super::{
    ForcingSeries, ForcingStep, ParameterError, Parameters, PumpCurve,
    capacity::{self, Levels},
    pump_curve::check_monotonic,
};

/// Stored volume of the catchment [mm].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub stored_volume: f64,
}

/// Errors raised by a storage run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameters")]
    Parameters(#[from] ParameterError),

    #[error("step {index} failed")]
    Step {
        index: usize,
        #[source]
        source: capacity::Error,
    },
}

/// A validated drainage system ready to simulate.
///
/// The pump curve is borrowed so that concurrent runs can share one curve.
#[derive(Debug)]
pub struct StorageModel<'a, P: ?Sized> {
    params: Parameters,
    pump: &'a P,
}

impl<'a, P: PumpCurve + ?Sized> StorageModel<'a, P> {
    /// Validates the parameters and the pump curve.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is out of range or pump flow rises
    /// with the gradient anywhere up to `max_pump_gradient`.
    pub fn new(params: Parameters, pump: &'a P) -> Result<Self, ParameterError> {
        params.validate()?;
        check_monotonic(
            pump,
            params.max_pump_gradient,
            params.inner_level_search_step,
        )?;
        Ok(Self { params, pump })
    }

    #[must_use]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    #[must_use]
    pub fn initial_state(&self) -> State {
        State {
            stored_volume: self.params.initial_volume,
        }
    }

    /// Advances `state` by one forcing step.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity solver fails.
    pub fn step(
        &self,
        state: State,
        forcing: &ForcingStep,
    ) -> Result<(State, StepRecord), capacity::Error> {
        let params = &self.params;
        let mut volume = state.stored_volume + forcing.recharge;

        let capacity = capacity::solve(
            Levels {
                tide_level: forcing.tide_level,
                canal_level: params.volume_to_level(volume),
                wind_gradient: forcing.wind_gradient,
            },
            params,
            self.pump,
        )?;

        volume -= capacity.actual_flow;
        let floor = params.floor_volume();
        volume = volume.max(floor);
        let at_floor = volume <= floor;

        let flow = if at_floor {
            forcing.recharge
        } else {
            capacity.actual_flow
        };

        let record = StepRecord {
            time: forcing.time,
            stored_volume: volume,
            canal_level: params.volume_to_level(volume),
            inner_level: capacity.inner_level,
            pump_capacity: capacity.pump_capacity,
            flow,
            pump_utilization: Utilization::from_flow(flow, capacity.pump_capacity),
            at_floor,
        };

        trace!(
            time = %record.time,
            stored_volume = record.stored_volume,
            canal_level = record.canal_level,
            inner_level = record.inner_level,
            flow = record.flow,
            "storage step"
        );

        Ok((
            State {
                stored_volume: volume,
            },
            record,
        ))
    }

    /// Runs the simulation from [`StorageModel::initial_state`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Step`] for the first step that fails; no records are
    /// returned in that case.
    pub fn run(&self, forcing: &ForcingSeries) -> Result<Output, Error> {
        debug!(
            steps = forcing.len(),
            initial_volume = self.params.initial_volume,
            "starting storage run"
        );

        let mut state = self.initial_state();
        let mut records = Vec::with_capacity(forcing.len());
        let mut floor_reported = false;

        for (index, step) in forcing.iter().enumerate() {
            let (next, record) = self
                .step(state, step)
                .map_err(|source| Error::Step { index, source })?;

            if record.at_floor && !floor_reported {
                warn!(
                    time = %record.time,
                    floor = self.params.floor_volume(),
                    "stored volume reached the drawdown floor"
                );
                floor_reported = true;
            }

            state = next;
            records.push(record);
        }

        let output = Output::new(records);
        debug!(
            final_volume = state.stored_volume,
            total_flow = output.total_flow(),
            "storage run finished"
        );
        Ok(output)
    }
}

impl<P: PumpCurve + ?Sized> Model for StorageModel<'_, P> {
    type Input = (State, ForcingStep);
    type Output = (State, StepRecord);
    type Error = capacity::Error;

    fn call(&self, (state, forcing): &Self::Input) -> Result<Self::Output, Self::Error> {
        self.step(*state, forcing)
    }
}

/// Validates `params` and `pump` and runs the simulation over `forcing`.
///
/// # Errors
///
/// Returns an error if validation fails or any step fails.
pub fn run<P>(forcing: &ForcingSeries, params: Parameters, pump: &P) -> Result<Output, Error>
where
    P: PumpCurve + ?Sized,
{
    StorageModel::new(params, pump)?.run(forcing)
}
