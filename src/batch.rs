use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::errors::PipelineError;
use crate::file_processor::{process_file, FileJob, FileReport};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_PARTIAL: i32 = 3;

#[derive(Debug)]
pub enum FileOutcome {
    Succeeded(FileReport),
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileReport> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Succeeded(report) => Some(report),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { path, reason } => Some((path.as_path(), reason.as_str())),
            FileOutcome::Succeeded(_) => None,
        })
    }

    /// 0 when every file succeeded, 3 for a partial success, 1 when nothing
    /// succeeded.
    pub fn exit_code(&self) -> i32 {
        let ok = self.succeeded().count();
        let failed = self.failed().count();
        match (ok, failed) {
            (_, 0) if ok > 0 => EXIT_OK,
            (0, _) => EXIT_FAILURE,
            _ => EXIT_PARTIAL,
        }
    }
}

/// Replaces the input extension with the configured output extension. If the
/// two are the same, `_aoi` is appended to the stem so the input survives.
pub fn derive_output_path(input: &Path, output_extension: &str) -> Result<PathBuf, PipelineError> {
    let stem = input.file_stem().ok_or_else(|| PipelineError::OutputPath {
        path: input.to_path_buf(),
    })?;
    let candidate = input.with_extension(output_extension);
    if candidate == input {
        let mut name = stem.to_os_string();
        name.push("_aoi.");
        name.push(output_extension);
        return Ok(input.with_file_name(name));
    }
    Ok(candidate)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Turns the command-line input (a file or a directory) into jobs.
pub fn resolve_jobs(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
) -> Result<Vec<FileJob>, PipelineError> {
    if !input.exists() {
        return Err(PipelineError::MissingInput {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => derive_output_path(input, &config.output.extension)?,
        };
        return Ok(vec![FileJob {
            input: input.to_path_buf(),
            output,
        }]);
    }

    if output.is_some() {
        return Err(PipelineError::OutputWithDirectory {
            path: input.to_path_buf(),
        });
    }

    let mut inputs: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &config.input.extension))
        .collect();
    inputs.sort();

    if inputs.is_empty() {
        return Err(PipelineError::NoInputFiles {
            path: input.to_path_buf(),
            extension: config.input.extension.clone(),
        });
    }

    inputs
        .into_iter()
        .map(|input| {
            let output = derive_output_path(&input, &config.output.extension)?;
            Ok(FileJob { input, output })
        })
        .collect()
}

/// Processes every job in order. A failing file is recorded and the batch
/// moves on.
pub fn run_batch(jobs: &[FileJob], config: &Config, plot: bool) -> BatchSummary {
    let progress = if jobs.len() > 1 {
        let bar = ProgressBar::new(jobs.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut summary = BatchSummary::default();
    for job in jobs {
        if let Some(bar) = &progress {
            bar.set_message(job.input.display().to_string());
        }

        let outcome = match process_file(job, config, plot) {
            Ok(report) => FileOutcome::Succeeded(report),
            Err(e) => {
                error!("Failed to process {}: {}", job.input.display(), e);
                FileOutcome::Failed {
                    path: job.input.clone(),
                    reason: e.to_string(),
                }
            }
        };
        summary.outcomes.push(outcome);

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let ok = summary.succeeded().count();
    let failed = summary.failed().count();
    info!("--- Batch Summary ---");
    info!("Files processed successfully: {}", ok);
    info!("Files failed: {}", failed);
    for report in summary.succeeded() {
        info!(
            "  {} -> {} ({} samples, {} intervals, {} windows, {} without window)",
            report.input.display(),
            report.output.display(),
            report.samples,
            report.detection.intervals,
            report.detection.windows_found,
            report.detection.without_window
        );
    }
    for (path, reason) in summary.failed() {
        warn!("  FAILED {}: {}", path.display(), reason);
    }

    summary
}
