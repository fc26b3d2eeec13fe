use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

use aoi_detector::batch::{resolve_jobs, run_batch, EXIT_FAILURE};
use aoi_detector::config::{load_config, Config};

#[derive(Parser, Debug)]
#[command(name = "aoi_detector")]
#[command(
    about = "Finds and annotates chamber measurement windows in gas-exchange logger files",
    long_about = None,
    version
)]
struct Cli {
    /// Logger file, or a directory of logger files (batch mode)
    input: PathBuf,

    /// Output table (single-file mode only; derived from the input by default)
    output: Option<PathBuf>,

    /// Also render an SVG overview next to each output table
    #[arg(short, long)]
    plot: bool,

    /// JSON configuration file
    #[arg(short, long, env = "AOI_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::default(),
    };
    let config = config
        .with_env_overrides()
        .context("Invalid AOI_* environment override")?;
    config
        .detection
        .validate()
        .context("Invalid detection configuration")?;

    let jobs = resolve_jobs(&cli.input, cli.output.as_deref(), &config)
        .with_context(|| format!("Cannot process input {:?}", cli.input))?;
    info!("{} file(s) to process", jobs.len());

    let summary = run_batch(&jobs, &config, cli.plot);
    Ok(summary.exit_code())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    };

    info!("--- Finished in {:.2?} (exit code {}) ---", start_time.elapsed(), code);
    std::process::exit(code);
}
