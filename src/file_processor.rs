use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::data_models::ColumnLayout;
use crate::detection::{find_aoi, DetectionReport};
use crate::errors::PipelineError;
use crate::parsers::parse_logger_file;
use crate::visualization::render_plot;
use crate::writer::write_annotated_table;

/// One input file and where its annotated table goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plot: Option<PathBuf>,
    pub samples: usize,
    pub layout: ColumnLayout,
    pub detection: DetectionReport,
}

/// `<dir>/<stem>_aoi.svg` next to the output table.
pub fn plot_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{}_aoi.svg", stem))
}

/// Parses, annotates and writes a single logger file.
pub fn process_file(job: &FileJob, config: &Config, plot: bool) -> Result<FileReport, PipelineError> {
    let started = Instant::now();
    info!("Processing file: {}", job.input.display());

    let series = parse_logger_file(&job.input, &config.input)
        .map_err(|e| PipelineError::Parse(e, job.input.clone()))?;
    info!("Loaded {} samples ({:?})", series.len(), series.layout);

    let detection = find_aoi(&series, &config.detection);

    write_annotated_table(&job.output, &series, &detection.annotations, &config.output)?;
    info!("Wrote annotated table to {}", job.output.display());

    let plot_path = if plot {
        let path = plot_path_for(&job.output);
        render_plot(&path, &series, &detection.annotations, &config.output)?;
        info!("Wrote plot to {}", path.display());
        Some(path)
    } else {
        None
    };

    info!(
        "Finished {} in {:.2?}",
        job.input.display(),
        started.elapsed()
    );

    Ok(FileReport {
        input: job.input.clone(),
        output: job.output.clone(),
        plot: plot_path,
        samples: series.len(),
        layout: series.layout,
        detection: detection.report,
    })
}
