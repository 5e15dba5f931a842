use std::error::Error as StdError;

/// An equation posed over `N` solver variables.
///
/// The problem translates solver variables into a model input, and turns the
/// model's input and output into residuals the solver drives toward a target
/// condition. Keeping this mapping separate from the model lets the same
/// model be searched in different ways.
pub trait EquationProblem<const N: usize> {
    type Input;
    type Output;
    type InputError: StdError + Send + Sync + 'static;
    type ResidualError: StdError + Send + Sync + 'static;

    /// Builds the model input for the given solver variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` does not map to a valid model input.
    fn input(&self, x: &[f64; N]) -> Result<Self::Input, Self::InputError>;

    /// Computes residuals from a model call.
    ///
    /// # Errors
    ///
    /// Returns an error if the residuals cannot be computed.
    fn residuals(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; N], Self::ResidualError>;
}
