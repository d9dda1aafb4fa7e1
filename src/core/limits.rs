//! 3-sigma control limit derivation
//!
//! `lsl = max(0, mean - 3σ)` floored to 3 decimals and
//! `usl = mean + 3σ` ceiled to 3 decimals, both computed on the trimmed
//! statistics. The internal pair is the same limits in thousandths with a
//! fixed manufacturing margin added on each side.

use serde::{Deserialize, Serialize};

use crate::core::stats::StatisticsResult;

/// Multiplier on the trimmed stdev
pub const SIGMA_K: f64 = 3.0;

/// Decimal places kept on the calculated limits
pub const LIMIT_DECIMALS: i32 = 3;

/// Scale of the internal (on-machine) limits
pub const INTERNAL_SCALE: f64 = 1000.0;

/// Margin applied to the internal pair: LSL - 5, USL + 5
pub const INTERNAL_MARGIN: i64 = 5;

/// Internal pair of the terminal (ground/chassis) NET
pub const SENTINEL_INTERNAL_LSL: i64 = 0;
pub const SENTINEL_INTERNAL_USL: i64 = 50;

/// Distance from an integer, in ULPs of the scaled value, treated as
/// arithmetic noise before floor/ceil
const SNAP_ULPS: f64 = 4.0;

/// Limits derived for one NET
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitResult {
    /// `max(0, mean - 3σ)` before rounding
    pub raw_lsl: f64,
    /// `mean + 3σ` before rounding
    pub raw_usl: f64,
    /// Floored to 3 decimals
    pub lsl: f64,
    /// Ceiled to 3 decimals
    pub usl: f64,
    /// `lsl × 1000`
    pub scaled_lsl: i64,
    /// `usl × 1000`
    pub scaled_usl: i64,
    /// `floor(lsl × 1000) - 5`
    pub internal_lsl: i64,
    /// `ceil(usl × 1000) + 5`
    pub internal_usl: i64,
    /// Fixed limits of the terminal NET, not computed from samples
    pub sentinel: bool,
}

impl LimitResult {
    /// Derive limits from a trimmed mean and stdev
    pub fn derive(trimmed_mean: f64, trimmed_stdev: f64) -> Self {
        let raw_lsl = (trimmed_mean - SIGMA_K * trimmed_stdev).max(0.0);
        let raw_usl = trimmed_mean + SIGMA_K * trimmed_stdev;

        let scaled_lsl = scaled_floor(raw_lsl);
        let scaled_usl = scaled_ceil(raw_usl);

        Self {
            raw_lsl,
            raw_usl,
            lsl: scaled_lsl as f64 / INTERNAL_SCALE,
            usl: scaled_usl as f64 / INTERNAL_SCALE,
            scaled_lsl,
            scaled_usl,
            internal_lsl: scaled_lsl - INTERNAL_MARGIN,
            internal_usl: scaled_usl + INTERNAL_MARGIN,
            sentinel: false,
        }
    }

    /// Limits of a NET from its statistics; `None` when it has no samples
    pub fn from_statistics(stats: &StatisticsResult) -> Option<Self> {
        if stats.is_empty() {
            None
        } else {
            Some(Self::derive(stats.trimmed_mean, stats.trimmed_stdev))
        }
    }

    /// Fixed limits of the terminal NET
    ///
    /// The internal and scaled pairs are `0 / 50`; in measurement units
    /// that is `0 / 0.05`. No margin is applied.
    pub fn sentinel() -> Self {
        let lsl = SENTINEL_INTERNAL_LSL as f64 / INTERNAL_SCALE;
        let usl = SENTINEL_INTERNAL_USL as f64 / INTERNAL_SCALE;
        Self {
            raw_lsl: lsl,
            raw_usl: usl,
            lsl,
            usl,
            scaled_lsl: SENTINEL_INTERNAL_LSL,
            scaled_usl: SENTINEL_INTERNAL_USL,
            internal_lsl: SENTINEL_INTERNAL_LSL,
            internal_usl: SENTINEL_INTERNAL_USL,
            sentinel: true,
        }
    }

    /// The pair written back to the reference sheet
    pub fn internal_pair(&self) -> (i64, i64) {
        (self.internal_lsl, self.internal_usl)
    }
}

/// Apply the terminal-NET override by position
///
/// The last entry is replaced with [`LimitResult::sentinel`] whatever it
/// held, including `None`.
pub fn apply_sentinel(limits: &mut [Option<LimitResult>]) {
    if let Some(last) = limits.last_mut() {
        *last = Some(LimitResult::sentinel());
    }
}

/// Round toward negative infinity at `decimals` places
pub fn floor_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    snap(value * factor).floor() / factor
}

/// Round toward positive infinity at `decimals` places
pub fn ceil_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    snap(value * factor).ceil() / factor
}

fn scaled_floor(value: f64) -> i64 {
    snap(value * INTERNAL_SCALE).floor() as i64
}

fn scaled_ceil(value: f64) -> i64 {
    snap(value * INTERNAL_SCALE).ceil() as i64
}

/// Snap to the nearest integer only when within a few ULPs of it, so
/// `1.231 × 1000` floors to 1231 while `1.2309999996 × 1000` still floors
/// to 1230
fn snap(scaled: f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() <= SNAP_ULPS * f64::EPSILON * scaled.abs().max(1.0) {
        nearest
    } else {
        scaled
    }
}
