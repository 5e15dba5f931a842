//! Time-ordered forcing for a storage simulation.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forcing at one time step.
///
/// - `tide_level`: outer water level at the sea dike [mm]
/// - `recharge`: water entering storage during the step [mm]
/// - `wind_gradient`: wind set-up that does not drive canal flow [mm]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcingStep {
    pub time: Timestamp,
    pub tide_level: f64,
    pub recharge: f64,
    #[serde(default)]
    pub wind_gradient: f64,
}

/// A validated, strictly time-ascending forcing series.
///
/// Spacing between steps is not required to be regular; each step's
/// recharge is the volume added during that step, whatever its length.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcingSeries {
    steps: Vec<ForcingStep>,
}

#[derive(Debug, Error)]
pub enum ForcingError {
    #[error("forcing series is empty")]
    Empty,

    #[error("{field} has {actual} values but the series has {expected} steps")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field} at step {index} is not finite: {value}")]
    NonFinite {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("time at step {index} ({current}) does not follow the previous step ({previous})")]
    NonIncreasingTime {
        index: usize,
        previous: Timestamp,
        current: Timestamp,
    },

    #[error("time arithmetic failed")]
    Time(#[from] jiff::Error),
}

impl ForcingSeries {
    /// Creates a series from steps, validating order and values.
    ///
    /// # Errors
    ///
    /// Returns an error if `steps` is empty, holds a non-finite value, or is
    /// not strictly increasing in time.
    pub fn new(steps: Vec<ForcingStep>) -> Result<Self, ForcingError> {
        if steps.is_empty() {
            return Err(ForcingError::Empty);
        }

        for (index, step) in steps.iter().enumerate() {
            for (field, value) in [
                ("tide_level", step.tide_level),
                ("recharge", step.recharge),
                ("wind_gradient", step.wind_gradient),
            ] {
                if !value.is_finite() {
                    return Err(ForcingError::NonFinite {
                        field,
                        index,
                        value,
                    });
                }
            }
        }

        if let Some(index) = (1..steps.len()).find(|&i| steps[i].time <= steps[i - 1].time) {
            return Err(ForcingError::NonIncreasingTime {
                index,
                previous: steps[index - 1].time,
                current: steps[index].time,
            });
        }

        Ok(Self { steps })
    }

    /// Creates a series from parallel arrays.
    ///
    /// A missing `wind_gradient` means no wind set-up.
    ///
    /// # Errors
    ///
    /// Returns [`ForcingError::LengthMismatch`] if an array differs in length
    /// from `times`, plus any error from [`ForcingSeries::new`].
    pub fn from_arrays(
        times: &[Timestamp],
        tide_level: &[f64],
        recharge: &[f64],
        wind_gradient: Option<&[f64]>,
    ) -> Result<Self, ForcingError> {
        let expected = times.len();
        let mut fields = vec![("tide_level", tide_level.len()), ("recharge", recharge.len())];
        if let Some(wind) = wind_gradient {
            fields.push(("wind_gradient", wind.len()));
        }
        if let Some(&(field, actual)) = fields.iter().find(|(_, len)| *len != expected) {
            return Err(ForcingError::LengthMismatch {
                field,
                expected,
                actual,
            });
        }

        let steps = (0..expected)
            .map(|i| ForcingStep {
                time: times[i],
                tide_level: tide_level[i],
                recharge: recharge[i],
                wind_gradient: wind_gradient.map_or(0.0, |wind| wind[i]),
            })
            .collect();
        Self::new(steps)
    }

    /// Creates an hourly series starting at `start`, without wind set-up.
    ///
    /// # Errors
    ///
    /// Returns an error if the arrays differ in length, a timestamp would
    /// overflow, or validation fails.
    pub fn hourly(
        start: Timestamp,
        tide_level: &[f64],
        recharge: &[f64],
    ) -> Result<Self, ForcingError> {
        let times = (0..tide_level.len())
            .map(|hour| {
                #[allow(clippy::cast_possible_wrap)]
                let hours = hour as i64;
                start.checked_add(SignedDuration::from_hours(hours))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_arrays(&times, tide_level, recharge, None)
    }

    /// Returns the steps in time order.
    #[must_use]
    pub fn steps(&self) -> &[ForcingStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForcingStep> {
        self.steps.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: a validated series has at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns a copy with every tide level raised by `offset` [mm].
    #[must_use]
    pub fn with_sea_level_rise(&self, offset: f64) -> Self {
        let steps = self
            .steps
            .iter()
            .map(|step| ForcingStep {
                tide_level: step.tide_level + offset,
                ..*step
            })
            .collect();
        Self { steps }
    }

    /// Returns a copy with recharge replaced by its trailing mean over `window`.
    ///
    /// The mean at each step covers the steps whose time lies in
    /// `(time - window, time]`, so early steps average over what is
    /// available. Storm precipitation reaches the canals spread out over
    /// several hours; smoothing hourly precipitation this way approximates
    /// that delay.
    #[must_use]
    pub fn with_smoothed_recharge(&self, window: SignedDuration) -> Self {
        let mut first = 0;

        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                while first < i && self.steps[first].time.duration_until(step.time) >= window {
                    first += 1;
                }
                // An all-zero window must give exactly zero.
                let window_steps = &self.steps[first..=i];
                let sum: f64 = window_steps.iter().map(|s| s.recharge).sum();
                #[allow(clippy::cast_precision_loss)]
                let count = window_steps.len() as f64;
                ForcingStep {
                    recharge: sum / count,
                    ..*step
                }
            })
            .collect();
        Self { steps }
    }
}

impl<'a> IntoIterator for &'a ForcingSeries {
    type Item = &'a ForcingStep;
    type IntoIter = std::slice::Iter<'a, ForcingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn t0() -> Timestamp {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn hourly_series_has_increasing_times() {
        let series = ForcingSeries::hourly(t0(), &[0.0, 100.0, -50.0], &[1.0, 2.0, 3.0]).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(
            series.steps()[2].time,
            "2024-01-01T02:00:00Z".parse::<Timestamp>().unwrap()
        );
        assert!(series.iter().all(|step| step.wind_gradient == 0.0));
    }

    #[test]
    fn from_arrays_keeps_wind() {
        let times = [t0(), "2024-01-01T00:15:00Z".parse().unwrap()];
        let series =
            ForcingSeries::from_arrays(&times, &[0.0, 0.0], &[0.0, 0.0], Some(&[10.0, 20.0]))
                .unwrap();

        assert_relative_eq!(series.steps()[1].wind_gradient, 20.0);
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(ForcingSeries::new(vec![]), Err(ForcingError::Empty)));
    }

    #[test]
    fn rejects_missing_values() {
        let result = ForcingSeries::hourly(t0(), &[0.0, 0.0], &[1.0]);

        assert!(matches!(
            result,
            Err(ForcingError::LengthMismatch {
                field: "recharge",
                expected: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn rejects_short_wind_array() {
        let times = [t0()];
        let result = ForcingSeries::from_arrays(&times, &[0.0], &[0.0], Some(&[]));

        assert!(matches!(
            result,
            Err(ForcingError::LengthMismatch {
                field: "wind_gradient",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let result = ForcingSeries::hourly(t0(), &[0.0, f64::NAN], &[1.0, 1.0]);

        assert!(matches!(
            result,
            Err(ForcingError::NonFinite {
                field: "tide_level",
                index: 1,
                ..
            })
        ));
    }

    #[test]
    fn rejects_unordered_and_repeated_times() {
        let later: Timestamp = "2024-01-01T01:00:00Z".parse().unwrap();

        for times in [[later, t0()], [t0(), t0()]] {
            let result = ForcingSeries::from_arrays(&times, &[0.0, 0.0], &[0.0, 0.0], None);
            assert!(matches!(
                result,
                Err(ForcingError::NonIncreasingTime { index: 1, .. })
            ));
        }
    }

    #[test]
    fn sea_level_rise_shifts_tide_only() {
        let series = ForcingSeries::hourly(t0(), &[0.0, 500.0], &[1.0, 2.0]).unwrap();
        let raised = series.with_sea_level_rise(300.0);

        assert_relative_eq!(raised.steps()[0].tide_level, 300.0);
        assert_relative_eq!(raised.steps()[1].tide_level, 800.0);
        assert_relative_eq!(raised.steps()[1].recharge, 2.0);
        assert_eq!(raised.steps()[1].time, series.steps()[1].time);
    }

    #[test]
    fn smoothing_uses_trailing_window() {
        let series =
            ForcingSeries::hourly(t0(), &[0.0; 5], &[12.0, 0.0, 0.0, 6.0, 0.0]).unwrap();
        let smoothed = series.with_smoothed_recharge(SignedDuration::from_hours(3));

        let recharge: Vec<f64> = smoothed.iter().map(|step| step.recharge).collect();
        let expected = [12.0, 6.0, 4.0, 2.0, 2.0];
        for (actual, expected) in recharge.iter().zip(expected) {
            assert_relative_eq!(*actual, expected);
        }
    }

    #[test]
    fn smoothing_preserves_total_for_isolated_burst() {
        let mut recharge = vec![0.0; 48];
        recharge[20] = 24.0;
        let series = ForcingSeries::hourly(t0(), &[0.0; 48], &recharge).unwrap();
        let smoothed = series.with_smoothed_recharge(SignedDuration::from_hours(12));

        let total: f64 = smoothed.iter().map(|step| step.recharge).sum();
        assert_relative_eq!(total, 24.0, max_relative = 1e-12);
    }

    #[test]
    fn smoothing_returns_to_zero_after_a_burst() {
        let mut recharge = vec![0.0; 200];
        recharge[..6].copy_from_slice(&[0.3, 1.0e9, 0.7, 1.0e-3, 123.456, 0.1]);
        let series = ForcingSeries::hourly(t0(), &[0.0; 200], &recharge).unwrap();
        let smoothed = series.with_smoothed_recharge(SignedDuration::from_hours(12));

        assert!(smoothed.iter().all(|step| step.recharge >= 0.0));
        assert!(smoothed.iter().skip(17).all(|step| step.recharge == 0.0));
    }
}
