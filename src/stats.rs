// src/stats.rs

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// One point of a percentile curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentilePoint {
    pub percentile: u8,
    pub finish_minutes: f64,
}

/// Finish minutes at every integer percentile 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileCurve {
    pub points: Vec<PercentilePoint>,
}

impl PercentileCurve {
    pub fn at(&self, percentile: u8) -> Option<f64> {
        self.points
            .get(usize::from(percentile))
            .map(|p| p.finish_minutes)
    }
}

/// Sorted copy of `values`, rejecting empty input and NaN/inf.
pub fn sorted_finite(values: &[f64]) -> Result<Vec<f64>, StatsError> {
    if values.is_empty() {
        return Err(StatsError::InsufficientData("no finish times"));
    }
    if let Some(bad) = values.iter().copied().find(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite(bad));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Value at percentile `p` (0..=100) of ascending `sorted`, interpolating
/// linearly between the two nearest order statistics.
pub fn score_at_percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let idx = p.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let w = idx - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * w)
}

pub fn percentile_curve(values: &[f64]) -> Result<PercentileCurve, StatsError> {
    let sorted = sorted_finite(values)?;
    let points = (0..=100u8)
        .map(|p| PercentilePoint {
            percentile: p,
            // sorted is non-empty here
            finish_minutes: score_at_percentile(&sorted, f64::from(p)).unwrap_or(f64::NAN),
        })
        .collect();
    Ok(PercentileCurve { points })
}

/// Percentile rank of `score` within `values`. Values equal to `score`
/// share their average rank.
pub fn percentile_of_score(values: &[f64], score: f64) -> Result<f64, StatsError> {
    let sorted = sorted_finite(values)?;
    let n = sorted.len() as f64;
    let left = sorted.partition_point(|v| *v < score) as f64;
    let right = sorted.partition_point(|v| *v <= score) as f64;
    let plus1 = if right > left { 1.0 } else { 0.0 };
    Ok((left + right + plus1) * 50.0 / n)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinishSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; zero for a single finisher.
    pub std_dev: f64,
}

impl FinishSummary {
    pub fn from_minutes(values: &[f64]) -> Result<Self, StatsError> {
        let sorted = sorted_finite(values)?;
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        Ok(Self {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median: score_at_percentile(&sorted, 50.0).unwrap_or(mean),
            std_dev: sample_std_dev(&sorted, mean),
        })
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Evenly spaced histogram edges, in minutes: `start, start+step, ..., end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinGrid {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for BinGrid {
    fn default() -> Self {
        Self {
            start: 60.0,
            end: 390.0,
            step: 5.0,
        }
    }
}

impl BinGrid {
    pub fn edges(&self) -> Vec<f64> {
        let n = ((self.end - self.start) / self.step).round() as usize;
        (0..=n).map(|i| self.start + i as f64 * self.step).collect()
    }

    /// Bin midpoints, used as the KDE evaluation grid.
    pub fn centers(&self) -> Vec<f64> {
        self.edges()
            .windows(2)
            .map(|w| (w[0] + w[1]) / 2.0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// `count / (total_in_range * width)`; integrates to 1 over the grid.
    pub density: f64,
}

/// Density histogram over `grid`. Values outside the grid are ignored; the
/// last bin is closed on the right.
pub fn histogram(values: &[f64], grid: &BinGrid) -> Vec<HistogramBin> {
    let edges = grid.edges();
    if edges.len() < 2 {
        return Vec::new();
    }
    let mut counts = vec![0usize; edges.len() - 1];
    let (lo, hi) = (edges[0], edges[edges.len() - 1]);

    for &v in values.iter().filter(|v| v.is_finite()) {
        if v < lo || v > hi {
            continue;
        }
        let idx = edges
            .partition_point(|e| *e <= v)
            .saturating_sub(1)
            .min(counts.len() - 1);
        counts[idx] += 1;
    }

    let total: usize = counts.iter().sum();
    edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| {
            let width = w[1] - w[0];
            let density = if total == 0 {
                0.0
            } else {
                count as f64 / (total as f64 * width)
            };
            HistogramBin {
                lower: w[0],
                upper: w[1],
                count,
                density,
            }
        })
        .collect()
}

/// Gaussian kernel density estimate of `values` at each of `xs`, using
/// Scott's rule for the bandwidth.
pub fn gaussian_kde(values: &[f64], xs: &[f64]) -> Result<Vec<(f64, f64)>, StatsError> {
    let sorted = sorted_finite(values)?;
    let n = sorted.len();
    if n < 2 {
        return Err(StatsError::InsufficientData("density needs two finish times"));
    }
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let sd = sample_std_dev(&sorted, mean);
    if sd == 0.0 {
        return Err(StatsError::InsufficientData("finish times have no spread"));
    }

    let bandwidth = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    Ok(xs
        .iter()
        .map(|&x| {
            let sum: f64 = sorted
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect())
}
