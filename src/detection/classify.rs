use crate::config::DetectionConfig;
use crate::data_models::Cover;
use crate::detection::edges::MeasurementInterval;

/// A measurement interval tagged with its cover type and AoI window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedInterval {
    pub interval: MeasurementInterval,
    pub cover: Cover,
    pub window_len: usize,
}

/// Maps gated-interval length to cover type and target window.
///
/// Thresholds are strict: a length of exactly `transparent_max_secs / dt`
/// samples is already dark, exactly `medium_max_secs / dt` already long.
pub fn classify_interval(
    interval: MeasurementInterval,
    config: &DetectionConfig,
) -> ClassifiedInterval {
    let length = interval.len() as f64;
    let dt = config.sample_interval_secs;

    let (cover, window_secs) = if length < config.transparent_max_secs / dt {
        (Cover::Transparent, config.transparent_window_secs)
    } else if length < config.medium_max_secs / dt {
        (Cover::Dark, config.medium_window_secs)
    } else {
        (Cover::Dark, config.long_window_secs)
    };

    ClassifiedInterval {
        interval,
        cover,
        window_len: config.secs_to_samples(window_secs),
    }
}

pub fn classify_intervals(
    intervals: &[MeasurementInterval],
    config: &DetectionConfig,
) -> Vec<ClassifiedInterval> {
    intervals
        .iter()
        .map(|&interval| classify_interval(interval, config))
        .collect()
}
