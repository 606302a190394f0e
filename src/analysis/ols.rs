//! Ordinary least squares over (run-count, reading) pairs.

use super::FitError;

/// A fitted line `reading = intercept + slope * n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Fixed per-batch overhead.
    pub intercept: f64,
    /// Calibrated per-call cost.
    pub slope: f64,
    /// Fraction of variance explained (1.0 by convention when the total
    /// variance is zero, since the model is then trivially exact).
    pub r_square: f64,
}

/// Fit a line through the collected pairs.
///
/// Closed-form OLS: `slope = Sxy / Sxx`, `intercept = ȳ - slope·x̄`.
///
/// # Errors
///
/// Fewer than two *distinct* run-counts leave the two-parameter model
/// underdetermined and yield [`FitError::Underdetermined`].
///
/// # Edge case
///
/// All-identical readings across distinct run-counts have zero reading
/// variance; the slope is then reported as the mean of the per-run ratios
/// `reading / n` with zero intercept, and R² is 1.0 by convention.
pub fn fit_line(points: &[(u64, f64)]) -> Result<Line, FitError> {
    let distinct = distinct_run_counts(points);
    if distinct < 2 {
        return Err(FitError::Underdetermined { distinct });
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|&(x, _)| x as f64).sum::<f64>() / n;
    let y_mean = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for &(x, y) in points {
        let dx = x as f64 - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if syy == 0.0 {
        // Zero reading variance: a constant cannot be split between the
        // two parameters, so attribute everything per call.
        let ratio_mean =
            points.iter().map(|&(x, y)| y / x as f64).sum::<f64>() / n;
        return Ok(Line {
            intercept: 0.0,
            slope: ratio_mean,
            r_square: 1.0,
        });
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_res: f64 = points
        .iter()
        .map(|&(x, y)| {
            let predicted = intercept + slope * x as f64;
            (y - predicted) * (y - predicted)
        })
        .sum();
    let r_square = 1.0 - ss_res / syy;

    Ok(Line {
        intercept,
        slope,
        r_square,
    })
}

/// Slope for a degenerate resample with a single distinct run-count:
/// the mean per-run ratio, same convention as the zero-variance case.
pub(super) fn ratio_slope(points: &[(u64, f64)]) -> f64 {
    let n = points.len() as f64;
    points.iter().map(|&(x, y)| y / x as f64).sum::<f64>() / n
}

fn distinct_run_counts(points: &[(u64, f64)]) -> usize {
    let mut counts: Vec<u64> = points.iter().map(|&(x, _)| x).collect();
    counts.sort_unstable();
    counts.dedup();
    counts.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn recovers_perfect_line() {
        // reading = 3 + 2n, no noise
        let points: Vec<(u64, f64)> =
            (1..=10).map(|n| (n, 3.0 + 2.0 * n as f64)).collect();
        let line = fit_line(&points).unwrap();
        assert!((line.intercept - 3.0).abs() < TOL);
        assert!((line.slope - 2.0).abs() < TOL);
        assert!((line.r_square - 1.0).abs() < TOL);
    }

    #[test]
    fn literal_calibration_scenario() {
        // Per-call cost 10, zero overhead, run-counts growing by 5.
        let points = vec![
            (1, 10.0),
            (5, 50.0),
            (25, 250.0),
            (125, 1250.0),
            (625, 6250.0),
        ];
        let line = fit_line(&points).unwrap();
        assert!(line.intercept.abs() < 1e-6);
        assert!((line.slope - 10.0).abs() < 1e-9);
        assert!((line.r_square - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_reading_uses_ratio_convention() {
        // Same reading regardless of n: zero variance, ratio convention.
        let points = vec![(1, 8.0), (2, 8.0), (4, 8.0)];
        let line = fit_line(&points).unwrap();
        let expected = (8.0 / 1.0 + 8.0 / 2.0 + 8.0 / 4.0) / 3.0;
        assert!((line.slope - expected).abs() < TOL);
        assert_eq!(line.intercept, 0.0);
        assert_eq!(line.r_square, 1.0);
    }

    #[test]
    fn zero_slope_generator() {
        // Readings vary slightly around a constant, uncorrelated with n.
        let points = vec![(1, 5.0), (2, 5.1), (4, 4.9), (8, 5.1), (16, 4.9)];
        let line = fit_line(&points).unwrap();
        assert!(line.slope.abs() < 0.02, "slope = {}", line.slope);
    }

    #[test]
    fn single_distinct_run_count_is_underdetermined() {
        let err = fit_line(&[(5, 50.0)]).unwrap_err();
        assert_eq!(err, FitError::Underdetermined { distinct: 1 });

        let err = fit_line(&[(5, 50.0), (5, 51.0), (5, 49.0)]).unwrap_err();
        assert_eq!(err, FitError::Underdetermined { distinct: 1 });
    }

    #[test]
    fn empty_sample_is_underdetermined() {
        let err = fit_line(&[]).unwrap_err();
        assert_eq!(err, FitError::Underdetermined { distinct: 0 });
    }

    #[test]
    fn noisy_line_keeps_high_r_square() {
        // Small symmetric noise on a strong linear signal.
        let points: Vec<(u64, f64)> = (1..=20)
            .map(|n| {
                let noise = if n % 2 == 0 { 0.5 } else { -0.5 };
                (n, 1.0 + 4.0 * n as f64 + noise)
            })
            .collect();
        let line = fit_line(&points).unwrap();
        assert!((line.slope - 4.0).abs() < 0.05);
        assert!(line.r_square > 0.99);
    }
}
