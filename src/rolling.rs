// src/rolling.rs
//
// Rolling-window statistics over telemetry columns.
//
// Missing observations are encoded as NaN and excluded from a window's
// sample set, not zeroed. Variance is the sample variance (ddof = 1);
// a window with fewer than two observations yields NaN, and NaN never
// satisfies a `>` threshold comparison downstream.

use std::collections::VecDeque;

/// Sample variance over the trailing `window` values at each position.
///
/// Maintains a ring buffer with running sum and sum-of-squares so each
/// update is O(1) regardless of window size.
pub fn trailing_variance(values: &[f64], window: usize) -> Vec<f64> {
    debug_assert!(window > 0);

    let mut out = Vec::with_capacity(values.len());
    let mut buf: VecDeque<f64> = VecDeque::with_capacity(window + 1);
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for &v in values {
        buf.push_back(v);
        if v.is_finite() {
            count += 1;
            sum += v;
            sum_sq += v * v;
        }
        if buf.len() > window {
            if let Some(old) = buf.pop_front() {
                if old.is_finite() {
                    count -= 1;
                    sum -= old;
                    sum_sq -= old * old;
                }
            }
        }

        if count >= 2 {
            let n = count as f64;
            // Clamp at zero: cancellation can leave a tiny negative residue.
            out.push(((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0));
        } else {
            out.push(f64::NAN);
        }
    }

    out
}

/// Bounds of a centered window of size `window` at position `i`.
///
/// Even windows reach one element further back than ahead (12 → 6 back,
/// 5 ahead); edges shrink to whatever is available.
fn centered_bounds(i: usize, window: usize, len: usize) -> (usize, usize) {
    let ahead = (window - 1) / 2;
    let back = window - 1 - ahead;
    let lo = i.saturating_sub(back);
    let hi = (i + ahead + 1).min(len);
    (lo, hi)
}

/// Peak-to-peak range (max − min) over a centered window at each position.
pub fn centered_range(values: &[f64], window: usize) -> Vec<f64> {
    debug_assert!(window > 0);

    (0..values.len())
        .map(|i| {
            let (lo, hi) = centered_bounds(i, window, values.len());
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &v in &values[lo..hi] {
                if v.is_finite() {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
            if min.is_finite() {
                (max - min).abs()
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Median over a centered window at each position. An even observation
/// count averages the two middle values; an empty window yields 0.
pub fn centered_median(values: &[f64], window: usize) -> Vec<f64> {
    debug_assert!(window > 0);

    (0..values.len())
        .map(|i| {
            let (lo, hi) = centered_bounds(i, window, values.len());
            let mut sorted: Vec<f64> = values[lo..hi]
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if sorted.is_empty() {
                return 0.0;
            }
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 1 {
                sorted[mid]
            } else {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            }
        })
        .collect()
}

/// Mean over the finite values; NaN when none exist.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut count = 0usize;
    let mut sum = 0.0;
    for &v in values {
        if v.is_finite() {
            count += 1;
            sum += v;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (ddof = 1) over the finite values; NaN when
/// fewer than two exist. Two-pass for numerical stability.
pub fn nan_std(values: &[f64]) -> f64 {
    let mean = nan_mean(values);
    if !mean.is_finite() {
        return f64::NAN;
    }
    let mut count = 0usize;
    let mut sum_sq_dev = 0.0;
    for &v in values {
        if v.is_finite() {
            count += 1;
            let dev = v - mean;
            sum_sq_dev += dev * dev;
        }
    }
    if count < 2 {
        f64::NAN
    } else {
        (sum_sq_dev / (count as f64 - 1.0)).sqrt()
    }
}
