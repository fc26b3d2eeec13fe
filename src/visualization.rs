//! SVG overview of one processed recording: CO2 trace, logger marker state and
//! the selected AoI windows.

use plotters::prelude::*;
use std::path::Path;

use crate::config::OutputConfig;
use crate::data_models::{AoiAnnotations, Series};
use crate::errors::PipelineError;

const CO2_OFFSET: f64 = 400.0;
const AOI_BAR_HEIGHT: f64 = 500.0;
const LOGGER_BAR_SCALE: f64 = 250.0;

/// `(sign(marker) + 1) * 250`, so an idle logger still shows a low band.
fn logger_bar(marker: f64) -> f64 {
    if marker.is_nan() {
        return 0.0;
    }
    let sign = if marker > 0.0 {
        1.0
    } else if marker < 0.0 {
        -1.0
    } else {
        0.0
    };
    (sign + 1.0) * LOGGER_BAR_SCALE
}

fn plot_error(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

pub fn render_plot(
    path: &Path,
    series: &Series,
    annotations: &AoiAnnotations,
    config: &OutputConfig,
) -> Result<(), PipelineError> {
    let n = series.len().max(1);
    let co2_shifted: Vec<f64> = series.samples.iter().map(|s| s.co2 - CO2_OFFSET).collect();

    let y_min = co2_shifted
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::min);
    let y_max = co2_shifted
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(AOI_BAR_HEIGHT, f64::max);

    let root = SVGBackend::new(path, (config.plot_width, config.plot_height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..n as f64, y_min..y_max * 1.05)
        .map_err(|e| plot_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc("Measurement index")
        .y_desc("CO2 [ppm - 400]")
        .draw()
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(series.samples.iter().enumerate().map(|(i, s)| {
            let x = i as f64;
            Rectangle::new(
                [(x, 0.0), (x + 1.0, logger_bar(s.marker))],
                YELLOW.mix(0.4).filled(),
            )
        }))
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(
            annotations
                .aoi
                .iter()
                .enumerate()
                .filter(|(_, &flag)| flag)
                .map(|(i, _)| {
                    let x = i as f64;
                    Rectangle::new([(x, 0.0), (x + 1.0, AOI_BAR_HEIGHT)], GREEN.mix(0.5).filled())
                }),
        )
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(LineSeries::new(
            co2_shifted
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| (i as f64, v)),
            &BLACK,
        ))
        .map_err(|e| plot_error(path, e))?;

    root.present().map_err(|e| plot_error(path, e))?;
    Ok(())
}
