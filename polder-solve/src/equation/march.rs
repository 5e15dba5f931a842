//! Upward march search on a fixed grid.
//!
//! Starting from `start`, the solver evaluates the problem at
//! `start + k * step` for `k = 0, 1, ..., max_iters` and stops at the first
//! candidate whose residual is non-negative. Candidates are computed from the
//! start value on every iteration rather than accumulated, so the grid does
//! not drift over long searches.
//!
//! The solver suits problems where the residual is non-decreasing in `x` and
//! the answer is wanted at a fixed resolution, such as the lowest inner water
//! level at which a pump keeps pace with its inflow. The iteration bound is
//! a hard limit: exhausting it is an error, not a best-effort result.

mod config;
mod error;
mod solution;

pub use config::Config;
pub use error::Error;
pub use solution::{Solution, Status};

use polder_core::model::Model;

use crate::equation::{EquationProblem, Evaluation, Observer, evaluate};

/// Control actions supported by the march solver.
pub enum Action {
    /// Stop at the current candidate.
    StopEarly,
}

/// Iteration event emitted by the march solver.
pub struct Event<'a, I, O> {
    /// Steps taken beyond the start value (0 for the start itself).
    pub iter: usize,
    /// Evaluation at the current candidate.
    pub eval: &'a Evaluation<I, O, 1>,
}

/// Finds the first grid point at or above `start` with a non-negative residual.
///
/// Observers see every evaluated candidate.
///
/// # Errors
///
/// Returns an error if the config or start value is invalid, an evaluation
/// fails or yields a non-finite residual, or no candidate within
/// `config.max_iters` steps satisfies the problem.
pub fn solve<I, O, Obs>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<1, Input = I, Output = O>,
    start: f64,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<I, O>, Error>
where
    Obs: for<'a> Observer<Event<'a, I, O>, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    if !start.is_finite() {
        return Err(Error::NonFiniteStart { value: start });
    }

    for iter in 0..=config.max_iters {
        #[allow(clippy::cast_precision_loss)]
        let x = start + iter as f64 * config.step;

        let eval = evaluate(model, problem, [x])?;
        let residual = eval.residuals[0];

        if !residual.is_finite() {
            return Err(Error::NonFiniteResidual { x, residual });
        }

        let event = Event { iter, eval: &eval };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::from_eval(eval, Status::StoppedByObserver, iter));
        }

        if residual >= 0.0 {
            return Ok(Solution::from_eval(eval, Status::Converged, iter));
        }
    }

    Err(Error::MaxIters {
        start,
        step: config.step,
        iters: config.max_iters,
    })
}

/// Runs [`solve`] without an observer.
///
/// # Errors
///
/// Returns the same errors as [`solve`].
pub fn solve_unobserved<I, O>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<1, Input = I, Output = O>,
    start: f64,
    config: &Config,
) -> Result<Solution<I, O>, Error> {
    solve(model, problem, start, config, ())
}
