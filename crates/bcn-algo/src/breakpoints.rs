//! Piecewise-linear approximation of a demand-transfer function.
//!
//! A breakpoint pairs a cost-improvement fraction `x` (reached path cost over
//! base path cost) with the normalized fraction of demand transferred once the
//! path is at least that cheap. Index 0 needs the least improvement.

use bcn_core::costs::user_cost_factor;
use bcn_core::{BcnError, BcnResult, Breakpoint};
use std::cmp::Ordering;
use tracing::debug;

/// Samples taken of the shaping function over `[m, 1]`.
pub const SAMPLE_COUNT: usize = 10_000;

/// Best achievable cost ratio with `infrastructure_count` levels: the user cost
/// factor of the highest level.
pub fn default_m(infrastructure_count: usize) -> BcnResult<f64> {
    if infrastructure_count < 2 {
        return Err(BcnError::Config(format!(
            "infrastructure count must be at least 2, got {}",
            infrastructure_count
        )));
    }
    Ok(user_cost_factor(infrastructure_count - 1))
}

/// Approximate `f` on `[m, 1]` with `count` breakpoints.
///
/// Outputs are min-max normalized, then thresholds spaced `1 / (count - 1)`
/// apart are matched against the samples from `x = m` upwards. The result is
/// ordered by decreasing `x`: the first breakpoint is at `x = 1`, the last at
/// `x = m`.
pub fn build_breakpoints<F>(f: F, count: usize, m: f64) -> BcnResult<Vec<Breakpoint>>
where
    F: Fn(f64) -> f64,
{
    if count < 2 {
        return Err(BcnError::Config(format!(
            "at least 2 breakpoints are required, got {}",
            count
        )));
    }
    if !(0.0..1.0).contains(&m) {
        return Err(BcnError::Config(format!("m must lie in [0, 1), got {}", m)));
    }

    let step = (1.0 - m) / (SAMPLE_COUNT - 1) as f64;
    let xs: Vec<f64> = (0..SAMPLE_COUNT)
        .map(|i| {
            if i == SAMPLE_COUNT - 1 {
                1.0
            } else {
                m + step * i as f64
            }
        })
        .collect();
    let ys: Vec<f64> = xs.iter().map(|x| f(*x)).collect();

    if ys.iter().any(|y| !y.is_finite()) {
        return Err(BcnError::Config(
            "transfer function is not finite on [m, 1]".into(),
        ));
    }
    let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= 0.0 {
        return Err(BcnError::Config(
            "transfer function is constant on [m, 1]".into(),
        ));
    }
    let normalized: Vec<f64> = ys.iter().map(|y| (y - min) / span).collect();

    let interval = 1.0 / (count - 1) as f64;
    let mut threshold = 1.0;
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(count);
    for (x, y) in xs.iter().zip(&normalized) {
        if points.len() == count {
            break;
        }
        if *y <= threshold {
            points.push((*y, *x));
            threshold -= interval;
        }
    }
    if points.len() < count {
        if let (Some(x), Some(y)) = (xs.last(), normalized.last()) {
            points.push((*y, *x));
        }
    }
    points.reverse();

    debug!(count = points.len(), m, "built breakpoints");
    Ok(points
        .into_iter()
        .map(|(transfer, improvement)| Breakpoint::new(transfer, improvement))
        .collect())
}

/// Breakpoint reached by path cost `w`, given per-breakpoint cost thresholds
/// in decreasing order.
///
/// Among the thresholds not below `w`, the smallest wins; equal thresholds
/// resolve to the lowest index. Returns 0 when `w` exceeds every threshold.
pub fn get_breakpoint_index(w: f64, thresholds: &[f64]) -> usize {
    thresholds
        .iter()
        .enumerate()
        .filter(|(_, t)| **t >= w)
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(j, _)| j)
        .unwrap_or(0)
}
