use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Environment override {var}='{value}' could not be parsed")]
    InvalidOverride { var: String, value: String },
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration parsing failed: {0}")]
    ConfigParse(#[from] ConfigError),
    #[error("Parsing failed for {1}: {0}")]
    Parse(ParseError, PathBuf),
    #[error("Failed to write annotated table to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to render plot {path}: {message}")]
    Plot { path: PathBuf, message: String },
    #[error("Input path {path} does not exist")]
    MissingInput { path: PathBuf },
    #[error("No '.{extension}' files found in {path}")]
    NoInputFiles { path: PathBuf, extension: String },
    #[error("An explicit output path cannot be combined with directory input {path}")]
    OutputWithDirectory { path: PathBuf },
    #[error("Could not derive an output path for {path}")]
    OutputPath { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading data file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error in {path} at row {row}: {source}")]
    RecordReadError {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("Unsupported column count {found} in {path} at row {row} (expected 6 or 7)")]
    ColumnCount {
        path: PathBuf,
        row: usize,
        found: usize,
    },
    #[error("Row {row} in {path} has {found} columns but the file started with {expected}")]
    InconsistentLayout {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("No data rows found in {path}")]
    Empty { path: PathBuf },
}
