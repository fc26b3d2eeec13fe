use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;

/// Top-level configuration. Every section falls back to its defaults, so a
/// JSON file only needs the keys it wants to change.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Thresholds and window lengths are given in seconds and converted to
/// samples through `sample_interval_secs`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub sample_interval_secs: f64,
    pub tolerance_samples: usize,
    pub transparent_max_secs: f64,
    pub medium_max_secs: f64,
    pub transparent_window_secs: f64,
    pub medium_window_secs: f64,
    pub long_window_secs: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub delimiter: char,
    /// Unit/description rows following the header line.
    pub unit_rows: usize,
    pub extension: String,
    pub timestamp_formats: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub extension: String,
    pub include_window_seconds: bool,
    pub plot_width: u32,
    pub plot_height: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 5.0,
            tolerance_samples: 5,
            transparent_max_secs: 110.0,
            medium_max_secs: 200.0,
            transparent_window_secs: 90.0,
            medium_window_secs: 180.0,
            long_window_secs: 300.0,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            unit_rows: 2,
            extension: String::from("txt"),
            timestamp_formats: vec![
                String::from("%Y-%m-%d %H:%M:%S"),
                String::from("%Y-%m-%d %H:%M:%S%.f"),
                String::from("%Y-%m-%dT%H:%M:%S"),
                String::from("%d.%m.%Y %H:%M:%S"),
                String::from("%d/%m/%Y %H:%M:%S"),
                String::from("%Y/%m/%d %H:%M:%S"),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: String::from("csv"),
            include_window_seconds: true,
            plot_width: 1600,
            plot_height: 600,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_interval_secs.is_finite() && self.sample_interval_secs > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "detection.sample_interval_secs".to_string(),
                message: format!("must be positive, got {}", self.sample_interval_secs),
            });
        }
        if self.transparent_max_secs > self.medium_max_secs {
            return Err(ConfigError::InvalidValue {
                field: "detection.transparent_max_secs".to_string(),
                message: "must not exceed detection.medium_max_secs".to_string(),
            });
        }
        Ok(())
    }

    /// Converts a duration in seconds to a whole number of samples (rounded down).
    pub fn secs_to_samples(&self, secs: f64) -> usize {
        (secs / self.sample_interval_secs).floor().max(0.0) as usize
    }
}

impl Config {
    /// Applies `AOI_*` environment variables on top of the current values.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var("AOI_SAMPLE_INTERVAL") {
            self.detection.sample_interval_secs = parse_override("AOI_SAMPLE_INTERVAL", &value)?;
        }
        if let Ok(value) = std::env::var("AOI_TOLERANCE") {
            self.detection.tolerance_samples = parse_override("AOI_TOLERANCE", &value)?;
        }
        if let Ok(value) = std::env::var("AOI_INPUT_EXTENSION") {
            self.input.extension = value.trim_start_matches('.').to_string();
        }
        Ok(self)
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidOverride {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Loads a JSON configuration file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let config: Config =
        serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    config.detection.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "detection": {{ "tolerance_samples": 8 }} }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.detection.tolerance_samples, 8);
        assert_eq!(config.detection.sample_interval_secs, 5.0);
        assert_eq!(config.input, InputConfig::default());
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "detection": {{ "sample_interval_secs": 0 }} }}"#).unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_secs_to_samples_rounds_down() {
        let config = DetectionConfig::default();
        assert_eq!(config.secs_to_samples(90.0), 18);
        assert_eq!(config.secs_to_samples(180.0), 36);
        assert_eq!(config.secs_to_samples(300.0), 60);

        let odd = DetectionConfig {
            sample_interval_secs: 7.0,
            ..DetectionConfig::default()
        };
        assert_eq!(odd.secs_to_samples(90.0), 12);
    }
}
