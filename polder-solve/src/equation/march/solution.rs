use polder_core::model::Snapshot;

use crate::equation::Evaluation;

/// How the march search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Found a candidate with a non-negative residual.
    Converged,
    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a march search.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status,
    /// The candidate the search stopped at.
    pub x: f64,
    /// Residual at `x`.
    pub residual: f64,
    /// Model input and output at `x`.
    pub snapshot: Snapshot<I, O>,
    /// Number of steps taken beyond the start value.
    pub iters: usize,
}

impl<I, O> Solution<I, O> {
    pub(super) fn from_eval(eval: Evaluation<I, O, 1>, status: Status, iters: usize) -> Self {
        Self {
            status,
            x: eval.x[0],
            residual: eval.residuals[0],
            snapshot: eval.snapshot,
            iters,
        }
    }
}
