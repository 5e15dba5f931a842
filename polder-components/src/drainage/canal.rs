use serde::{Deserialize, Serialize};

/// Power-law outflow of the canal network into the inner basin.
///
/// Flow [mm/h] is `head^exponent / factor` for a positive driving head [mm]
/// and zero otherwise. Both parameters are calibrated offline against
/// observed basin levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanalLaw {
    pub exponent: f64,
    pub factor: f64,
}

impl Default for CanalLaw {
    fn default() -> Self {
        Self {
            exponent: 1.016,
            factor: 2572.0,
        }
    }
}

impl CanalLaw {
    /// Creates a canal law.
    #[must_use]
    pub fn new(exponent: f64, factor: f64) -> Self {
        Self { exponent, factor }
    }

    /// Canal flow for the given driving head.
    #[must_use]
    pub fn flow(&self, head: f64) -> f64 {
        if head <= 0.0 {
            0.0
        } else {
            head.powf(self.exponent) / self.factor
        }
    }

    /// Returns this law with capacity multiplied by `scale`.
    #[must_use]
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            exponent: self.exponent,
            factor: self.factor / scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn no_flow_without_head() {
        let canal = CanalLaw::default();
        assert_eq!(canal.flow(0.0), 0.0);
        assert_eq!(canal.flow(-250.0), 0.0);
    }

    #[test]
    fn linear_law() {
        let canal = CanalLaw::new(1.0, 1000.0);
        assert_relative_eq!(canal.flow(2500.0), 2.5);
    }

    #[test]
    fn flow_grows_with_head() {
        let canal = CanalLaw::default();
        assert!(canal.flow(1000.0) < canal.flow(1001.0));
    }

    #[test]
    fn scaling_divides_factor() {
        let canal = CanalLaw::new(1.0, 1000.0).scaled(2.0);
        assert_relative_eq!(canal.factor, 500.0);
        assert_relative_eq!(canal.flow(1000.0), 2.0);
    }
}
