//! Robust per-NET statistics
//!
//! Quantiles use linear interpolation between order statistics
//! (Hyndman & Fan Type 7), which is what spreadsheet `QUARTILE` and
//! `PERCENTILE.INC` evaluate:
//!
//! ```text
//! h = (n - 1) * p
//! q = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])
//! ```
//!
//! Two IQR fences are computed and they are not interchangeable. The
//! `TRIM_FENCE_K` fence selects the samples behind the trimmed mean/stdev
//! that drive the limits. The `DIAGNOSTIC_FENCE_K` fence is reported only.

use serde::{Deserialize, Serialize};

/// IQR multiplier for the trimmed mean/stdev subset
pub const TRIM_FENCE_K: f64 = 1.5;

/// IQR multiplier for the reported quartile ± k·IQR columns
pub const DIAGNOSTIC_FENCE_K: f64 = 4.0;

/// Statistics of one sample collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    /// Number of samples; 0 means every other field is undefined and zero
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n-1); 0 with fewer than 2 samples
    pub stdev: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// `max(0, q1 - 4·iqr)`
    pub lower_fence: f64,
    /// `q3 + 4·iqr`
    pub upper_fence: f64,
    /// Mean of samples inside `[q1 - 1.5·iqr, q3 + 1.5·iqr]`
    pub trimmed_mean: f64,
    /// Sample stdev of the same subset
    pub trimmed_stdev: f64,
    /// Samples inside the trim fence
    pub trimmed_count: usize,
}

impl StatisticsResult {
    /// All-zero result for an empty collection
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Compute every statistic for `samples` (order does not matter)
    pub fn compute(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = mean(&sorted);
        let stdev = sample_stdev(&sorted, mean);
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;

        let trimmed = trimmed_subset(
            &sorted,
            q1 - TRIM_FENCE_K * iqr,
            q3 + TRIM_FENCE_K * iqr,
        );
        let (trimmed_mean, trimmed_stdev) = trimmed_moments(&trimmed, mean, stdev);

        Self {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median: quantile_sorted(&sorted, 0.5),
            stdev,
            q1,
            q3,
            iqr,
            lower_fence: (q1 - DIAGNOSTIC_FENCE_K * iqr).max(0.0),
            upper_fence: q3 + DIAGNOSTIC_FENCE_K * iqr,
            trimmed_mean,
            trimmed_stdev,
            trimmed_count: trimmed.len(),
        }
    }
}

/// Samples inside the inclusive fence `[lo, hi]`
pub fn trimmed_subset(samples: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    samples
        .iter()
        .copied()
        .filter(|v| *v >= lo && *v <= hi)
        .collect()
}

/// Mean and stdev of a trimmed subset
///
/// An empty subset falls back to the untrimmed `mean`/`stdev`.
pub fn trimmed_moments(trimmed: &[f64], mean: f64, stdev: f64) -> (f64, f64) {
    if trimmed.is_empty() {
        (mean, stdev)
    } else {
        let m = self::mean(trimmed);
        (m, sample_stdev(trimmed, m))
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the n-1 denominator
///
/// Defined as 0 (not NaN) for fewer than two values.
pub fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linearly interpolated quantile of an ascending slice
///
/// Returns 0 for an empty slice. `p` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}
