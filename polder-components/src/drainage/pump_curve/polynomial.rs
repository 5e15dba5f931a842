use nalgebra::{DMatrix, DVector};

use super::{
    CurveError, KRUMMHOERN_CHART, PumpCurve, chart_flow_to_mm_per_hour, chart_gradient_to_mm,
};

/// A polynomial pump curve.
///
/// The polynomial is evaluated in a mapped variable `t = (gradient - offset) / scale`.
/// Fitted curves map the calibration range onto `[-1, 1]`, which keeps the
/// least-squares system well conditioned for gradients in the thousands of
/// millimetres. Curves built with [`Polynomial::new`] use the plain power
/// basis (`offset = 0`, `scale = 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    offset: f64,
    scale: f64,
}

/// Power-basis coefficients of the quadratic fitted to [`KRUMMHOERN_CHART`].
const KRUMMHOERN_COEFFICIENTS: [f64; 3] = [
    0.835_272_027_148_844_3,
    -2.415_935_106_585_702_6e-5,
    -1.396_247_220_987_105_7e-8,
];

/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

impl Polynomial {
    /// Creates a polynomial from power-basis coefficients, lowest order first.
    #[must_use]
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self {
            coefficients,
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// The quadratic pump curve of the Krummhoern station.
    ///
    /// Equal to `Polynomial::fit` over [`KRUMMHOERN_CHART`] converted to
    /// millimetres and water-balance millimetres per hour.
    #[must_use]
    pub fn krummhoern() -> Self {
        Self::new(KRUMMHOERN_COEFFICIENTS.to_vec())
    }

    /// Least-squares fit of a polynomial of the given degree.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables differ in length, hold fewer than
    /// `degree + 1` points or non-finite values, span no gradient range, or
    /// produce a singular system.
    pub fn fit(gradients: &[f64], flows: &[f64], degree: usize) -> Result<Self, CurveError> {
        if gradients.len() != flows.len() {
            return Err(CurveError::LengthMismatch {
                gradients: gradients.len(),
                flows: flows.len(),
            });
        }
        let required = degree + 1;
        if gradients.len() < required {
            return Err(CurveError::TooFewPoints {
                degree,
                required,
                actual: gradients.len(),
            });
        }
        if let Some(&value) = gradients.iter().chain(flows).find(|v| !v.is_finite()) {
            return Err(CurveError::NonFiniteTable { value });
        }

        let (min, max) = gradients
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &g| {
                (lo.min(g), hi.max(g))
            });
        if max <= min {
            return Err(CurveError::DegenerateDomain);
        }
        let offset = 0.5 * (max + min);
        let scale = 0.5 * (max - min);

        let vandermonde = DMatrix::from_fn(gradients.len(), required, |row, power| {
            let t = (gradients[row] - offset) / scale;
            (0..power).fold(1.0, |acc, _| acc * t)
        });
        let svd = vandermonde.svd(true, true);
        let tolerance = RANK_TOLERANCE * svd.singular_values.max();
        if svd.rank(tolerance) < required {
            return Err(CurveError::Singular);
        }
        let solution = svd
            .solve(&DVector::from_column_slice(flows), tolerance)
            .map_err(|_| CurveError::Singular)?;

        let coefficients = solution.iter().copied().collect();
        Ok(Self {
            coefficients,
            offset,
            scale,
        })
    }

    /// Fits a quadratic to [`KRUMMHOERN_CHART`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Polynomial::fit`].
    pub fn fit_krummhoern_chart() -> Result<Self, CurveError> {
        let (gradients, flows): (Vec<f64>, Vec<f64>) = KRUMMHOERN_CHART
            .iter()
            .map(|&(g, q)| (chart_gradient_to_mm(g), chart_flow_to_mm_per_hour(q)))
            .unzip();
        Self::fit(&gradients, &flows, 2)
    }

    /// Evaluates the polynomial at `gradient`.
    #[must_use]
    pub fn evaluate(&self, gradient: f64) -> f64 {
        let t = (gradient - self.offset) / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

impl PumpCurve for Polynomial {
    fn flow(&self, gradient: f64) -> Result<f64, CurveError> {
        Ok(self.evaluate(gradient))
    }
}
