//! Goodness-of-fit scores for simulated against observed series.
//!
//! Canal law parameters are calibrated by comparing simulated canal levels
//! with gauge records. Pairs where either value is not finite are skipped,
//! since gauge records have gaps.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricError {
    #[error("observed has {observed} values but simulated has {simulated}")]
    LengthMismatch { observed: usize, simulated: usize },

    #[error("no pair of finite values to compare")]
    Empty,
}

/// Nash-Sutcliffe efficiency. Range `(-inf, 1]`, 1 is a perfect fit.
///
/// Constant observations give negative infinity.
///
/// # Errors
///
/// Returns an error if the series differ in length or share no finite pair.
pub fn nse(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    let (obs, sim) = finite_pairs(observed, simulated)?;
    let mean_obs = mean(&obs);

    let numerator: f64 = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).sum();
    let denominator: f64 = obs.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if denominator == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(1.0 - numerator / denominator)
}

/// Kling-Gupta efficiency. Range `(-inf, 1]`, 1 is a perfect fit.
///
/// Combines correlation, the ratio of standard deviations, and the ratio of
/// means. Components that would divide by zero count as zero.
///
/// # Errors
///
/// Returns an error if the series differ in length or share no finite pair.
pub fn kge(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    let (obs, sim) = finite_pairs(observed, simulated)?;
    #[allow(clippy::cast_precision_loss)]
    let n = obs.len() as f64;

    let mean_o = mean(&obs);
    let mean_s = mean(&sim);
    let std_o = (obs.iter().map(|o| (o - mean_o).powi(2)).sum::<f64>() / n).sqrt();
    let std_s = (sim.iter().map(|s| (s - mean_s).powi(2)).sum::<f64>() / n).sqrt();

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        obs.iter()
            .zip(&sim)
            .map(|(o, s)| (o - mean_o) * (s - mean_s))
            .sum::<f64>()
            / (n * std_o * std_s)
    };
    let alpha = if std_o == 0.0 { 0.0 } else { std_s / std_o };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };

    Ok(1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt())
}

/// Root mean square error, in the units of the series.
///
/// # Errors
///
/// Returns an error if the series differ in length or share no finite pair.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> Result<f64, MetricError> {
    let (obs, sim) = finite_pairs(observed, simulated)?;
    let squared: Vec<f64> = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).collect();
    Ok(mean(&squared).sqrt())
}

fn finite_pairs(observed: &[f64], simulated: &[f64]) -> Result<(Vec<f64>, Vec<f64>), MetricError> {
    if observed.len() != simulated.len() {
        return Err(MetricError::LengthMismatch {
            observed: observed.len(),
            simulated: simulated.len(),
        });
    }

    let (obs, sim): (Vec<f64>, Vec<f64>) = observed
        .iter()
        .zip(simulated)
        .filter(|(o, s)| o.is_finite() && s.is_finite())
        .map(|(&o, &s)| (o, s))
        .unzip();
    if obs.is_empty() {
        return Err(MetricError::Empty);
    }
    Ok((obs, sim))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
