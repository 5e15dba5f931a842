//! Pump curves: maximum pump flow as a function of the lifting gradient.
//!
//! A curve maps the gradient between the outer (tide) level and the inner
//! basin level, in millimetres, to the maximum flow the station can pump, in
//! water-balance millimetres per hour. Flow falls as the gradient grows.

mod polynomial;
mod tabulated;

use ninterp::error::{InterpolateError, ValidateError};
use thiserror::Error;

pub use polynomial::Polynomial;
pub use tabulated::TabulatedCurve;

use super::ParameterError;

/// Pump chart of the Krummhoern station: gradient [m] and flow per pump [m³/s].
///
/// The chart was digitised with overlapping reads between 2 m and 5 m; those
/// repeated points are kept because they weight the least-squares fit.
pub const KRUMMHOERN_CHART: [(f64, f64); 14] = [
    (7.0, 0.0),
    (6.0, 4.2),
    (5.0, 8.4),
    (4.0, 12.6),
    (3.5, 14.5),
    (3.0, 15.8),
    (2.0, 17.5),
    (1.0, 19.0),
    (0.0, 20.5),
    (5.0, 8.4),
    (4.0, 12.6),
    (3.5, 14.5),
    (3.0, 15.8),
    (2.0, 17.5),
];

/// Catchment area drained by the station [m²].
const CATCHMENT_AREA: f64 = 3.5e8;

/// Number of identical pumps at the station.
const PUMP_COUNT: f64 = 4.0;

/// Converts a chart gradient from metres to millimetres.
#[must_use]
pub fn chart_gradient_to_mm(gradient_m: f64) -> f64 {
    gradient_m * 1000.0
}

/// Converts the flow of one pump [m³/s] into station flow [mm/h] over the catchment.
#[must_use]
pub fn chart_flow_to_mm_per_hour(flow_m3s: f64) -> f64 {
    flow_m3s * 3600.0 / CATCHMENT_AREA * 1000.0 * PUMP_COUNT
}

/// A mapping from lifting gradient [mm] to maximum pump flow [mm/h].
///
/// Implementations must be deterministic. Curves are shared read-only across
/// concurrent simulation runs, hence the `Sync` bound.
///
/// Closures `Fn(f64) -> f64` are pump curves too, which is convenient for
/// idealised stations in tests and studies.
pub trait PumpCurve: Sync {
    /// Returns the maximum pump flow at `gradient`.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated at `gradient`.
    fn flow(&self, gradient: f64) -> Result<f64, CurveError>;
}

impl<F> PumpCurve for F
where
    F: Fn(f64) -> f64 + Sync,
{
    fn flow(&self, gradient: f64) -> Result<f64, CurveError> {
        Ok(self(gradient))
    }
}

/// Errors raised when building or evaluating a pump curve.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("gradient table has {gradients} entries but flow table has {flows}")]
    LengthMismatch { gradients: usize, flows: usize },

    #[error("a degree {degree} fit needs at least {required} points, got {actual}")]
    TooFewPoints {
        degree: usize,
        required: usize,
        actual: usize,
    },

    #[error("gradient table contains a non-finite value: {value}")]
    NonFiniteTable { value: f64 },

    #[error("gradient {gradient} appears more than once in the table")]
    DuplicateGradient { gradient: f64 },

    #[error("gradient table spans no range")]
    DegenerateDomain,

    #[error("least-squares system is singular")]
    Singular,

    #[error("pump flow at gradient {gradient} is not finite: {flow}")]
    NonFiniteFlow { gradient: f64, flow: f64 },

    #[error(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
}

/// Upper bound on the number of gradients probed by [`check_monotonic`].
const MAX_MONOTONIC_SAMPLES: f64 = 10_000.0;

/// Tolerance for flow increases treated as rounding noise.
const MONOTONIC_TOLERANCE: f64 = 1e-12;

/// Verifies that pump flow never rises with the gradient on `[1, max_gradient]`.
///
/// The equilibrium search raises the inner level step by step, which lowers
/// the gradient; it relies on pump flow being non-decreasing along the way.
/// Flows are compared after clamping at zero, as the capacity solver does.
/// The range is probed every `step` millimetres, coarsened so that at most
/// ten thousand gradients are evaluated.
///
/// # Errors
///
/// Returns [`ParameterError::NonMonotonicPumpCurve`] at the first gradient
/// where flow rises, or a wrapped [`CurveError`] if evaluation fails.
pub fn check_monotonic<P>(curve: &P, max_gradient: f64, step: f64) -> Result<(), ParameterError>
where
    P: PumpCurve + ?Sized,
{
    let low = 1.0;
    let span = (max_gradient - low).max(0.0);
    let step = step.max(span / MAX_MONOTONIC_SAMPLES);

    let mut gradient = low;
    let mut flow = evaluate_clamped(curve, gradient)?;
    let mut k = 1.0;

    while span > 0.0 {
        let next_gradient = (low + k * step).min(max_gradient);
        let next_flow = evaluate_clamped(curve, next_gradient)?;

        if next_flow > flow + MONOTONIC_TOLERANCE {
            return Err(ParameterError::NonMonotonicPumpCurve {
                gradient,
                next_gradient,
                flow,
                next_flow,
            });
        }

        if next_gradient >= max_gradient {
            break;
        }
        gradient = next_gradient;
        flow = next_flow;
        k += 1.0;
    }

    Ok(())
}

fn evaluate_clamped<P: PumpCurve + ?Sized>(curve: &P, gradient: f64) -> Result<f64, CurveError> {
    let flow = curve.flow(gradient)?;
    if flow.is_finite() {
        Ok(flow.max(0.0))
    } else {
        Err(CurveError::NonFiniteFlow { gradient, flow })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn chart_units_convert_to_station_flow() {
        assert_relative_eq!(chart_gradient_to_mm(3.5), 3500.0);
        // 20.5 m³/s per pump, four pumps, over 350 km².
        assert_relative_eq!(
            chart_flow_to_mm_per_hour(20.5),
            20.5 * 3600.0 * 4.0 / 3.5e5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn closures_are_pump_curves() {
        let curve = |gradient: f64| 2.0 - gradient / 1000.0;
        assert_relative_eq!(curve.flow(500.0).unwrap(), 1.5);
    }

    #[test]
    fn falling_curve_is_monotonic() {
        let curve = |gradient: f64| 1.0 - gradient / 5000.0;
        assert!(check_monotonic(&curve, 4000.0, 1.0).is_ok());
    }

    #[test]
    fn negative_tail_is_clamped_before_comparison() {
        // Crosses zero at 3000 mm and keeps falling; clamped flow stays at zero.
        let curve = |gradient: f64| 3.0 - gradient / 1000.0;
        assert!(check_monotonic(&curve, 6000.0, 10.0).is_ok());
    }

    #[test]
    fn rising_curve_is_rejected() {
        let curve = |gradient: f64| gradient / 100.0;
        let err = check_monotonic(&curve, 4000.0, 1.0).unwrap_err();

        match err {
            ParameterError::NonMonotonicPumpCurve {
                gradient,
                next_gradient,
                ..
            } => {
                assert_relative_eq!(gradient, 1.0);
                assert_relative_eq!(next_gradient, 2.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bump_inside_range_is_found() {
        let curve = |gradient: f64| {
            if (2000.0..2100.0).contains(&gradient) {
                5.0
            } else {
                1.0 - gradient / 10_000.0
            }
        };
        let err = check_monotonic(&curve, 4000.0, 50.0).unwrap_err();

        assert!(matches!(
            err,
            ParameterError::NonMonotonicPumpCurve { next_gradient, .. } if next_gradient == 2001.0
        ));
    }

    #[test]
    fn non_finite_flow_is_an_error() {
        let curve = |_gradient: f64| f64::NAN;
        let err = check_monotonic(&curve, 100.0, 1.0).unwrap_err();

        assert!(matches!(
            err,
            ParameterError::Curve(CurveError::NonFiniteFlow { .. })
        ));
    }

    #[test]
    fn tiny_range_checks_single_point() {
        let curve = |gradient: f64| gradient;
        assert!(check_monotonic(&curve, 0.5, 1.0).is_ok());
    }
}
