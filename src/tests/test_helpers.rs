use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data_models::{ColumnLayout, Sample, Series};

/// Deterministic pseudo-noise in [-amp, amp].
pub fn noise(i: usize, amp: f64) -> f64 {
    let x = ((i as u64).wrapping_mul(2_654_435_761) % 1000) as f64 / 1000.0;
    (x * 2.0 - 1.0) * amp
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 6, 14)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

/// Marker at `level` on `high`, zero elsewhere.
pub fn step_markers(len: usize, high: std::ops::RangeInclusive<usize>, level: f64) -> Vec<f64> {
    (0..len)
        .map(|i| if high.contains(&i) { level } else { 0.0 })
        .collect()
}

/// Noisy CO2 around 450 ppm with a clean linear ramp on `ramp`.
pub fn co2_with_ramp(len: usize, ramp: std::ops::RangeInclusive<usize>, slope: f64) -> Vec<f64> {
    let ramp_start = *ramp.start();
    (0..len)
        .map(|i| {
            if ramp.contains(&i) {
                520.0 + slope * (i - ramp_start) as f64
            } else {
                450.0 + noise(i, 12.0)
            }
        })
        .collect()
}

pub fn synthetic_series(markers: &[f64], co2: &[f64]) -> Series {
    let samples = markers
        .iter()
        .zip(co2)
        .enumerate()
        .map(|(i, (&marker, &co2))| {
            let ts = base_time() + Duration::seconds(5 * i as i64);
            Sample {
                raw_timestamp: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                timestamp: Some(ts),
                voltage: Some(12.0),
                par: 800.0,
                co2,
                temperature: 21.5,
                marker,
                h2o: 12.25,
            }
        })
        .collect();
    Series::new(samples, ColumnLayout::WithVoltage)
}

fn comma(value: f64) -> String {
    format!("{:.3}", value).replace('.', ",")
}

/// Renders a 7-column, tab-delimited logger export with comma decimals.
pub fn logger_file_text(markers: &[f64], co2: &[f64]) -> String {
    let mut text = String::from("Time\tVolt\tPAR\tCO2\tTemp\tLogger\tH2O\n");
    text.push_str("\tV\tumol/m2s\tppm\tdegC\t-\tmmol/mol\n");
    text.push_str("\t\t\t\t\t\t\n");
    for (i, (&marker, &co2)) in markers.iter().zip(co2).enumerate() {
        let ts = base_time() + Duration::seconds(5 * i as i64);
        text.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            ts.format("%Y-%m-%d %H:%M:%S"),
            comma(12.1),
            comma(800.0 + i as f64),
            comma(co2),
            comma(21.5),
            marker as i64,
            comma(12.25),
        ));
    }
    text
}

pub fn write_logger_file(dir: &Path, name: &str, markers: &[f64], co2: &[f64]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, logger_file_text(markers, co2)).unwrap();
    path
}

/// The measurement used across scenario tests: 200 samples, marker high on
/// 50..=119, clean descending ramp on 60..=119.
pub fn reference_channels() -> (Vec<f64>, Vec<f64>) {
    (
        step_markers(200, 50..=119, 5.0),
        co2_with_ramp(200, 60..=119, -1.5),
    )
}
