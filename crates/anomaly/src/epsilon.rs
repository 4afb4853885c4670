//! Histogram-gap threshold estimation.
//!
//! Derives the clustering radius for a sensor series from its empirical
//! distribution: the series is histogrammed with automatic bin sizing, and
//! the spacing between occupied bins, less the mean bin width, measures how
//! far apart the populated regions of the value range sit. The first positive
//! spacing becomes the radius; a configurable floor keeps the radius from
//! collapsing on tightly packed data.

use serde::{Deserialize, Serialize};

use crate::error::{DetectError, Result};

/// Detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Lower bound applied to the estimated radius.
    pub epsilon_floor: f64,
}

impl DetectorConfig {
    pub fn new(epsilon_floor: f64) -> Self {
        Self { epsilon_floor }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            epsilon_floor: 100.0,
        }
    }
}

/// Value range spanned by two consecutive occupied bins, with summary
/// statistics of the observations falling inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSpan {
    /// Left edge of the earlier occupied bin.
    pub lower: f64,
    /// Left edge of the later occupied bin.
    pub upper: f64,
    /// Mean of the observations in `[lower, upper]`.
    pub mean: f64,
    /// Population standard deviation of the observations in `[lower, upper]`.
    pub std_dev: f64,
}

/// Outcome of threshold estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdEstimate {
    /// Clustering radius, never below the configured floor.
    pub epsilon: f64,
    /// Mean bin width of the underlying histogram.
    pub interval: f64,
    /// Spacing between consecutive occupied bins, less the mean bin width.
    pub gaps: Vec<f64>,
    /// Summary of the regions between consecutive occupied bins.
    pub buckets: Vec<BucketSpan>,
}

/// Equal-width histogram with automatic bin sizing.
#[derive(Debug, Clone)]
struct Histogram {
    /// Bin edges, one more than the number of bins.
    edges: Vec<f64>,
    counts: Vec<usize>,
}

impl Histogram {
    /// Builds a histogram over `values` with the bin width chosen as the
    /// smaller of the Freedman-Diaconis and Sturges estimates, falling back
    /// to Sturges when the interquartile range is zero.
    fn build(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut lo = sorted[0];
        let mut hi = sorted[sorted.len() - 1];
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = auto_bin_width(&sorted);
        let bins = if width > 0.0 {
            (((hi - lo) / width).ceil() as usize).max(1)
        } else {
            1
        };

        let step = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + step * i as f64).collect();
        edges[bins] = hi;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let mut idx = ((v - lo) / (hi - lo) * bins as f64).floor() as usize;
            if idx >= bins {
                idx = bins - 1;
            }
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    /// Indices of bins holding at least one observation.
    fn occupied(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Mean width across all bins.
    fn mean_width(&self) -> f64 {
        let diffs: Vec<f64> = self.edges.windows(2).map(|w| w[1] - w[0]).collect();
        diffs.iter().sum::<f64>() / diffs.len() as f64
    }
}

/// Linearly interpolated percentile of an ascending slice, `q` in `[0, 100]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q / 100.0 * (n - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

fn auto_bin_width(sorted: &[f64]) -> f64 {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    let iqr = percentile(sorted, 75.0) - percentile(sorted, 25.0);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let sturges = range / (n.log2() + 1.0);
    if fd > 0.0 {
        fd.min(sturges)
    } else {
        sturges
    }
}

/// Estimates the clustering radius for a series.
///
/// Returns [`DetectError::EmptySeries`] when `values` is empty. For a series
/// whose occupied bins are all adjacent (no positive gap), the radius falls
/// back to half the mean bin width before the floor is applied.
pub fn estimate_threshold(values: &[f64], epsilon_floor: f64) -> Result<ThresholdEstimate> {
    if values.is_empty() {
        return Err(DetectError::EmptySeries);
    }

    let hist = Histogram::build(values);
    let occupied = hist.occupied();
    let interval = hist.mean_width();

    let mut buckets = Vec::with_capacity(occupied.len().saturating_sub(1));
    for pair in occupied.windows(2) {
        let lower = hist.edges[pair[0]];
        let upper = hist.edges[pair[1]];
        // Both endpoints inclusive: an observation on a shared edge
        // contributes to the spans on either side of it.
        let members: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| *v >= lower && *v <= upper)
            .collect();
        let mean = members.iter().sum::<f64>() / members.len() as f64;
        let var = members.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / members.len() as f64;
        buckets.push(BucketSpan {
            lower,
            upper,
            mean,
            std_dev: var.sqrt(),
        });
    }

    let mut gaps: Vec<f64> = occupied
        .windows(2)
        .map(|pair| hist.edges[pair[1]] - hist.edges[pair[0]] - interval)
        .collect();
    if !gaps.is_empty() {
        let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
        if mean_gap == 0.0 {
            for gap in gaps.iter_mut() {
                *gap = 0.0;
            }
        }
    }

    let raw = gaps
        .iter()
        .copied()
        .find(|g| *g > 0.0)
        .unwrap_or(interval / 2.0);
    let epsilon = raw.max(epsilon_floor);

    tracing::debug!(
        "estimated epsilon {:.4} from {} occupied bins (interval {:.4}, raw {:.4})",
        epsilon,
        occupied.len(),
        interval,
        raw
    );

    Ok(ThresholdEstimate {
        epsilon,
        interval,
        gaps,
        buckets,
    })
}
