//! Case-resampling bootstrap over the fitted slope.
//!
//! Resamples the `(run_count, reading)` pairs with replacement, refits the
//! line on each resample, and keeps the resulting slope distribution. The
//! percentiles of that distribution give a nonparametric confidence
//! interval, robust to non-normal residuals where a closed-form interval
//! would not be.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::ols::{fit_line, ratio_slope};

/// Counter-based RNG seed derivation using SplitMix64.
///
/// A stateless PRF from a base seed and an iteration counter to a
/// well-distributed 64-bit seed, avoiding the sequential correlation of
/// plain `base + counter` seeding.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Produce exactly `count` bootstrap slope estimates.
///
/// Each estimate comes from a with-replacement resample of the same size
/// as the original sample. A degenerate resample that happens to draw a
/// single distinct run-count falls back to the mean per-run ratio, so the
/// returned distribution always has exactly `count` entries.
///
/// `count == 0` is the disabled case and returns an empty vector without
/// touching the RNG.
pub fn bootstrap_slopes(points: &[(u64, f64)], count: usize, base_seed: u64) -> Vec<f64> {
    if count == 0 || points.is_empty() {
        return Vec::new();
    }

    let n = points.len();
    let mut slopes = Vec::with_capacity(count);
    let mut resample = vec![(0u64, 0.0f64); n];

    for iteration in 0..count {
        let mut rng =
            Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, iteration as u64));
        for slot in resample.iter_mut() {
            *slot = points[rng.random_range(0..n)];
        }

        let slope = match fit_line(&resample) {
            Ok(line) => line.slope,
            Err(_) => ratio_slope(&resample),
        };
        slopes.push(slope);
    }

    slopes
}

/// Percentile confidence interval over a slope distribution.
///
/// `level` is the two-sided confidence level, e.g. 0.95. Returns `None`
/// for an empty distribution or a level outside (0, 1).
pub fn percentile_interval(slopes: &[f64], level: f64) -> Option<(f64, f64)> {
    if slopes.is_empty() || level <= 0.0 || level >= 1.0 {
        return None;
    }

    let mut sorted = slopes.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let tail = (1.0 - level) / 2.0;
    let lo_index = (tail * (sorted.len() - 1) as f64).round() as usize;
    let hi_index = ((1.0 - tail) * (sorted.len() - 1) as f64).round() as usize;
    Some((sorted[lo_index], sorted[hi_index]))
}
