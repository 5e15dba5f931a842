/// Configuration for the march solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Distance between successive candidates.
    pub step: f64,
    /// Maximum number of steps taken beyond the start value.
    pub max_iters: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step: 1.0,
            max_iters: 1_000,
        }
    }
}

impl Config {
    /// Validates that the step is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is zero, negative, or non-finite.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err("step must be finite and strictly positive");
        }
        Ok(())
    }
}
