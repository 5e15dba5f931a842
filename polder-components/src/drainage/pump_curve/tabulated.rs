use ndarray::Array1;
use ninterp::{
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::enums::Strategy1DEnum,
};

use super::{
    CurveError, KRUMMHOERN_CHART, PumpCurve, chart_flow_to_mm_per_hour, chart_gradient_to_mm,
};

/// A pump curve interpolated linearly between tabulated chart points.
///
/// Gradients outside the table are clamped to its first or last point, so
/// the curve stays flat beyond the calibrated range.
pub struct TabulatedCurve(Interp1DOwned<f64, Strategy1DEnum>);

impl TabulatedCurve {
    /// Builds a curve from `(gradient, flow)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the pairs contain non-finite values or repeated
    /// gradients, or if fewer than two points are given.
    pub fn new(points: &[(f64, f64)]) -> Result<Self, CurveError> {
        if let Some(&value) = points
            .iter()
            .flat_map(|(g, q)| [g, q])
            .find(|v| !v.is_finite())
        {
            return Err(CurveError::NonFiniteTable { value });
        }
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints {
                degree: 1,
                required: 2,
                actual: points.len(),
            });
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(CurveError::DuplicateGradient {
                gradient: pair[0].0,
            });
        }
        let (gradients, flows): (Vec<f64>, Vec<f64>) = sorted.into_iter().unzip();

        let interp = Interp1DOwned::new(
            Array1::from(gradients),
            Array1::from(flows),
            ninterp::strategy::Linear.into(),
            Extrapolate::Clamp,
        )?;
        Ok(Self(interp))
    }

    /// The Krummhoern pump chart, without the repeated reads.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TabulatedCurve::new`].
    pub fn krummhoern() -> Result<Self, CurveError> {
        let points: Vec<(f64, f64)> = KRUMMHOERN_CHART[..9]
            .iter()
            .map(|&(g, q)| (chart_gradient_to_mm(g), chart_flow_to_mm_per_hour(q)))
            .collect();
        Self::new(&points)
    }
}

impl PumpCurve for TabulatedCurve {
    fn flow(&self, gradient: f64) -> Result<f64, CurveError> {
        self.0.interpolate(&[gradient]).map_err(Into::into)
    }
}
