//! Area-of-interest detection: edges -> classification -> best window -> annotations.

pub mod assemble;
pub mod classify;
pub mod edges;
pub mod scoring;

use log::{debug, info};

use crate::config::DetectionConfig;
use crate::data_models::{AoiAnnotations, Series};

pub use assemble::{assemble, quality_for, Assembly, OverlapConflict};
pub use classify::{classify_interval, classify_intervals, ClassifiedInterval};
pub use edges::{detect_edges, pair_intervals, MarkerEdges, MeasurementInterval};
pub use scoring::{find_best_window, fit_line, search_range, BestWindow, LinearFit};

/// Counts collected while running the detection stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionReport {
    pub starts: usize,
    pub ends: usize,
    pub intervals: usize,
    pub windows_found: usize,
    /// Intervals whose search range was empty or had no usable fit.
    pub without_window: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub edges: MarkerEdges,
    pub intervals: Vec<ClassifiedInterval>,
    pub windows: Vec<BestWindow>,
    pub annotations: AoiAnnotations,
    pub conflicts: Vec<OverlapConflict>,
    pub report: DetectionReport,
}

/// Runs all detection stages over one loaded series.
pub fn find_aoi(series: &Series, config: &DetectionConfig) -> Detection {
    let markers = series.markers();
    let co2 = series.co2();
    find_aoi_in(&markers, &co2, config)
}

/// Same as `find_aoi` on raw channel slices of equal length.
pub fn find_aoi_in(markers: &[f64], co2: &[f64], config: &DetectionConfig) -> Detection {
    let edges = detect_edges(markers);
    let intervals = classify_intervals(&pair_intervals(&edges), config);

    let mut windows = Vec::with_capacity(intervals.len());
    let mut without_window = 0;
    for classified in &intervals {
        match find_best_window(co2, classified, config.tolerance_samples) {
            Some(best) => {
                debug!(
                    "Interval {}..{} ({}): best window at {} (len {}, slope {:.4}, score {:.3e})",
                    classified.interval.start,
                    classified.interval.end,
                    classified.cover.code(),
                    best.start,
                    best.window_len,
                    best.slope,
                    best.score
                );
                windows.push(best);
            }
            None => {
                debug!(
                    "Interval {}..{} yielded no usable window",
                    classified.interval.start, classified.interval.end
                );
                without_window += 1;
            }
        }
    }

    let Assembly {
        annotations,
        conflicts,
        ..
    } = assemble(co2.len(), &windows, config.sample_interval_secs);

    let report = DetectionReport {
        starts: edges.starts.len(),
        ends: edges.ends.len(),
        intervals: intervals.len(),
        windows_found: windows.len(),
        without_window,
        conflicts: conflicts.len(),
    };
    info!(
        "Detection: {} intervals, {} windows, {} without window, {} conflicts",
        report.intervals, report.windows_found, report.without_window, report.conflicts
    );

    Detection {
        edges,
        intervals,
        windows,
        annotations,
        conflicts,
        report,
    }
}
