//! # Storm Surge Ensemble
//!
//! This example drives the Krummhoern drainage system through a synthetic
//! winter storm: two days of semidiurnal tides with a surge on top, and a
//! day of heavy rain smoothed over twelve hours before it reaches the canals.
//!
//! The scenario (sea level rise, drawdown, canal calibration rows) is read
//! from a TOML file, and one simulation runs per calibration row. The example
//! prints the canal level envelope and the peak of each member.
//!
//! ## Running the Example
//!
//! ```sh
//! cargo run --example storm_surge
//! cargo run --example storm_surge -- path/to/scenario.toml
//! ```
//!
//! Runs log their boundaries at `debug` and the first floor contact at `warn`.

use std::{error::Error, f64::consts::TAU, fs};

use jiff::{SignedDuration, Timestamp};
use polder_components::{
    config::ScenarioConfig,
    drainage::{ForcingSeries, ensemble::Ensemble},
};
use tracing::{Level, info};

/// Scenario used when no path is given.
const DEFAULT_SCENARIO: &str = include_str!("../scenarios/krummhoern.toml");

/// Hours to simulate.
const HOURS: usize = 72;

/// Period of the principal lunar tide, in hours.
const TIDAL_PERIOD_H: f64 = 12.42;

/// Tidal amplitude, in mm.
const TIDAL_AMPLITUDE_MM: f64 = 1500.0;

/// Peak surge above the astronomical tide, in mm.
const SURGE_MM: f64 = 2000.0;

/// Hour of the surge peak.
const SURGE_PEAK_H: f64 = 30.0;

/// Hourly precipitation during the rain event, in mm.
const RAIN_MM: f64 = 2.5;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let text = match std::env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_SCENARIO.to_owned(),
    };
    let config = ScenarioConfig::from_toml_str(&text)?;
    let pump = config.pump_curve.build()?;

    let forcing = storm()?.with_smoothed_recharge(SignedDuration::from_hours(12));
    info!(
        steps = forcing.len(),
        sea_level_rise_m = config.sea_level_rise_m(),
        "storm forcing ready"
    );

    let ensemble = Ensemble::run(
        &config.scenario(),
        &config.canal_parameters,
        &forcing,
        pump.as_ref(),
    )?;

    println!("member  row  exponent  factor   peak [mm]  at");
    for (i, member) in ensemble.members().iter().enumerate() {
        if let Some((time, level)) = member.output.peak_canal_level() {
            println!(
                "{i:>6}  {:>3}  {:>8.3}  {:>7.1}  {level:>9.0}  {time}",
                member.row, member.canal.exponent, member.canal.factor
            );
        }
    }

    let envelope = ensemble.envelope();
    println!();
    println!("time                   min [mm]  mean [mm]  max [mm]");
    for i in (0..envelope.times.len()).step_by(6) {
        println!(
            "{}  {:>8.0}  {:>9.0}  {:>8.0}",
            envelope.times[i], envelope.min[i], envelope.mean[i], envelope.max[i]
        );
    }

    Ok(())
}

/// Builds hourly tide and precipitation for the storm.
fn storm() -> Result<ForcingSeries, Box<dyn Error>> {
    let start: Timestamp = "2023-12-21T00:00:00Z".parse()?;

    let (tide, rain): (Vec<f64>, Vec<f64>) = (0..HOURS)
        .map(|hour| {
            #[allow(clippy::cast_precision_loss)]
            let t = hour as f64;
            let astronomical = TIDAL_AMPLITUDE_MM * (TAU * t / TIDAL_PERIOD_H).cos();
            let surge = SURGE_MM * (-((t - SURGE_PEAK_H) / 10.0).powi(2)).exp();
            let rain = if (12..36).contains(&hour) { RAIN_MM } else { 0.1 };
            (astronomical + surge, rain)
        })
        .unzip();

    Ok(ForcingSeries::hourly(start, &tide, &rain)?)
}
