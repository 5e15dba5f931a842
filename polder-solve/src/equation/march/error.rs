use std::error::Error as StdError;

use thiserror::Error;

use crate::equation::EvalError;

/// Errors that can occur during a march search.
#[derive(Debug, Error)]
pub enum Error {
    #[error("start value is not finite: {value}")]
    NonFiniteStart { value: f64 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// No candidate had a non-negative residual within the iteration bound.
    ///
    /// For a correctly posed problem the bound is derived so that this cannot
    /// happen; reaching it means the problem is inconsistent.
    #[error("no non-negative residual within {iters} steps of {step} from {start}")]
    MaxIters { start: f64, step: f64, iters: usize },

    #[error("failed to compute input")]
    Input(#[source] Box<dyn StdError + Send + Sync>),

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("failed to compute residual")]
    Residual(#[source] Box<dyn StdError + Send + Sync>),

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },
}

impl<IE, ME, RE> From<EvalError<IE, ME, RE>> for Error
where
    IE: StdError + Send + Sync + 'static,
    ME: StdError + Send + Sync + 'static,
    RE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<IE, ME, RE>) -> Self {
        match err {
            EvalError::Input(e) => Self::Input(Box::new(e)),
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Residual(e) => Self::Residual(Box::new(e)),
        }
    }
}
