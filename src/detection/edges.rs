//! Rising/falling edge detection on the logger marker channel.

use log::{debug, warn};

/// Edge indices into the series. `starts` point at the first sample after a
/// rise, `ends` at the last sample before a fall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerEdges {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
}

/// A (start, end) pair produced by positional pairing of the edge lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementInterval {
    pub start: usize,
    pub end: usize,
}

impl MeasurementInterval {
    /// Gated length in samples.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Sign-of-first-difference edge detection.
///
/// `d[i] = sign(marker[i+1] - marker[i])`; a `+1` puts `i+1` in `starts`, a
/// `-1` puts `i` in `ends`. Sample 0 is read as baseline (0) without touching
/// the input, so the recording boundary can never produce an end at index 0.
/// NaN markers compare as neither rising nor falling.
pub fn detect_edges(markers: &[f64]) -> MarkerEdges {
    let mut edges = MarkerEdges::default();
    if markers.len() < 2 {
        warn!("Marker channel has {} samples, no transitions possible", markers.len());
        return edges;
    }

    for i in 0..markers.len() - 1 {
        let current = if i == 0 { 0.0 } else { markers[i] };
        let diff = markers[i + 1] - current;
        if diff > 0.0 {
            edges.starts.push(i + 1);
        } else if diff < 0.0 {
            edges.ends.push(i);
        }
    }

    let raw_starts = edges.starts.len();
    let raw_ends = edges.ends.len();
    collapse_adjacent(&mut edges.starts);
    collapse_adjacent(&mut edges.ends);
    if edges.starts.len() != raw_starts || edges.ends.len() != raw_ends {
        debug!(
            "Collapsed chatter: starts {} -> {}, ends {} -> {}",
            raw_starts,
            edges.starts.len(),
            raw_ends,
            edges.ends.len()
        );
    }

    // Recording began mid-measurement
    if let (Some(&first_end), Some(&first_start)) = (edges.ends.first(), edges.starts.first()) {
        if first_end < first_start {
            debug!("Dropping leading end edge at {} (before first start {})", first_end, first_start);
            edges.ends.remove(0);
        }
    }

    if edges.starts.is_empty() && edges.ends.is_empty() {
        warn!("No transitions found in logger marker channel");
    }

    edges
}

/// Runs of edges exactly one sample apart collapse to the last edge of the run.
fn collapse_adjacent(indices: &mut Vec<usize>) {
    let collapsed: Vec<usize> = indices
        .iter()
        .enumerate()
        .filter(|&(pos, &idx)| indices.get(pos + 1).map_or(true, |&next| next != idx + 1))
        .map(|(_, &idx)| idx)
        .collect();
    *indices = collapsed;
}

/// Zips `starts` and `ends` positionally. Pairs that do not satisfy
/// `start < end` are skipped.
pub fn pair_intervals(edges: &MarkerEdges) -> Vec<MeasurementInterval> {
    edges
        .starts
        .iter()
        .zip(edges.ends.iter())
        .filter_map(|(&start, &end)| {
            if start < end {
                Some(MeasurementInterval { start, end })
            } else {
                warn!("Skipping crossing edge pair start={} end={}", start, end);
                None
            }
        })
        .collect()
}
