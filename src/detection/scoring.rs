//! Best-fit window search.
//!
//! Every candidate window of the target length inside the tolerance-expanded
//! search range gets a degree-1 least-squares fit of CO2 against the sample
//! offset `0..L`. The score is the squared off-diagonal entry of the fit's
//! parameter covariance matrix, scaled by the residual variance
//! `SSR / (L - 2)`. Lower is better; ties go to the earliest window.

use log::debug;
use rayon::prelude::*;
use std::ops::Range;

use crate::data_models::Cover;
use crate::detection::classify::ClassifiedInterval;

/// Result of `fit_line`. `covariance` is ordered `[slope, intercept]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub covariance: [[f64; 2]; 2],
}

impl LinearFit {
    pub fn instability_score(&self) -> f64 {
        self.covariance[0][1].powi(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestWindow {
    pub start: usize,
    pub window_len: usize,
    pub cover: Cover,
    pub slope: f64,
    pub score: f64,
}

/// Ordinary least squares fit of `values` against `0..values.len()`.
///
/// Returns `None` for fewer than three points, where the residual variance
/// is undefined.
pub fn fit_line(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;

    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ssr: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let r = y - (slope * i as f64 + intercept);
            r * r
        })
        .sum();
    let sigma2 = ssr / (nf - 2.0);

    // inv(A^T A) for A = [x, 1], expressed through the centered sums
    let var_slope = sigma2 / sxx;
    let cov_slope_intercept = -sigma2 * x_mean / sxx;
    let var_intercept = sigma2 * (1.0 / nf + x_mean * x_mean / sxx);

    Some(LinearFit {
        slope,
        intercept,
        covariance: [
            [var_slope, cov_slope_intercept],
            [cov_slope_intercept, var_intercept],
        ],
    })
}

/// Candidate start indices `[start - tol, end + tol - L)`, clipped to
/// `[0, n - L)`. May be empty.
pub fn search_range(classified: &ClassifiedInterval, n: usize, tolerance: usize) -> Range<usize> {
    let window = classified.window_len;
    let lo = classified.interval.start.saturating_sub(tolerance);
    let upper = classified.interval.end.saturating_add(tolerance).min(n);

    match upper.checked_sub(window) {
        Some(hi) if window > 0 && hi > lo => lo..hi,
        _ => 0..0,
    }
}

/// Scans every candidate window in parallel and keeps the lowest score.
///
/// Returns `None` when the search range is empty or no candidate produced a
/// finite score.
pub fn find_best_window(
    co2: &[f64],
    classified: &ClassifiedInterval,
    tolerance: usize,
) -> Option<BestWindow> {
    let range = search_range(classified, co2.len(), tolerance);
    if range.is_empty() {
        debug!(
            "Empty search range for interval {:?} (window {}, series {})",
            classified.interval,
            classified.window_len,
            co2.len()
        );
        return None;
    }

    let len = classified.window_len;
    range
        .into_par_iter()
        .filter_map(|start| {
            let fit = fit_line(&co2[start..start + len])?;
            let score = fit.instability_score();
            score.is_finite().then_some(BestWindow {
                start,
                window_len: len,
                cover: classified.cover,
                slope: fit.slope,
                score,
            })
        })
        .min_by(|a, b| a.score.total_cmp(&b.score).then(a.start.cmp(&b.start)))
}
