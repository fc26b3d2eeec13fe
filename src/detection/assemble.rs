use log::{debug, warn};

use crate::data_models::{AoiAnnotations, Cover, Quality};
use crate::detection::scoring::BestWindow;

/// A best window that was not applied because part of its span was already
/// annotated by an earlier window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapConflict {
    pub window_start: usize,
    pub window_len: usize,
    pub first_overlap: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub annotations: AoiAnnotations,
    pub applied: usize,
    pub conflicts: Vec<OverlapConflict>,
}

pub fn quality_for(cover: Cover, slope: f64) -> Quality {
    if cover == Cover::Dark && slope < 0.0 {
        Quality::Suspect
    } else {
        Quality::Nominal
    }
}

/// Writes each best window into per-sample output columns.
///
/// A window starting at `s` with length `L` marks `s..=s+L` (L + 1 samples).
/// The elapsed-seconds column counts `dt, 2*dt, ...` from the first marked
/// sample. Windows that would touch an already marked sample are reported as
/// conflicts and left out.
pub fn assemble(len: usize, windows: &[BestWindow], sample_interval_secs: f64) -> Assembly {
    let mut annotations = AoiAnnotations::empty(len);
    let mut conflicts = Vec::new();
    let mut applied = 0;

    for window in windows {
        if window.start >= len {
            warn!("Best window start {} lies outside the series ({} samples)", window.start, len);
            continue;
        }
        let last = (window.start + window.window_len).min(len - 1);
        let span = window.start..=last;

        if let Some(first_overlap) = span.clone().find(|&i| annotations.aoi[i]) {
            warn!(
                "Best window {}..={} overlaps an earlier window at sample {}, not applied",
                window.start, last, first_overlap
            );
            conflicts.push(OverlapConflict {
                window_start: window.start,
                window_len: window.window_len,
                first_overlap,
            });
            continue;
        }

        let quality = quality_for(window.cover, window.slope);
        for (pos, i) in span.enumerate() {
            annotations.aoi[i] = true;
            annotations.cover[i] = Some(window.cover);
            annotations.quality[i] = quality;
            annotations.window_seconds[i] = Some(sample_interval_secs * (pos + 1) as f64);
        }
        debug!(
            "Annotated {}..={} cover={} quality={}",
            window.start,
            last,
            window.cover.code(),
            quality.code()
        );
        applied += 1;
    }

    Assembly {
        annotations,
        applied,
        conflicts,
    }
}
