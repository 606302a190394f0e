//! Regression and resampling analysis over raw samples.
//!
//! The model is `reading(n) = intercept + slope * n`, fitted by ordinary
//! least squares over the `(run_count, reading)` pairs of one instrument:
//! the slope is the calibrated per-call cost, the intercept absorbs fixed
//! per-batch overhead, and R² flags noisy or interfered measurements.
//! Optionally a case-resampling bootstrap attaches a slope distribution,
//! and a Gaussian KDE over per-run costs attaches diagnostic smoothing.
//!
//! The engine consumes plain numeric data ([`RawSample`]) and knows
//! nothing about the registry or the instruments behind it.

mod bootstrap;
mod kde;
mod ols;

pub use bootstrap::{bootstrap_slopes, counter_rng_seed, percentile_interval};
pub use kde::{gaussian_kde, Kde};
pub use ols::{fit_line, Line};

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampler::RawSample;

/// Options controlling one fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Bootstrap resampling iterations; 0 disables the distribution.
    pub bootstrap_count: usize,
    /// Whether to attach R².
    pub r_square: bool,
    /// Optional KDE grid size over per-run costs.
    pub kde_sample_count: Option<usize>,
    /// Deterministic bootstrap seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            bootstrap_count: 0,
            r_square: true,
            kde_sample_count: None,
            seed: None,
        }
    }
}

/// Why a fit could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    /// Fewer than two distinct run-counts were collected before the quota
    /// ran out; a two-parameter line cannot be identified.
    Underdetermined {
        /// Distinct run-counts actually observed.
        distinct: usize,
    },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::Underdetermined { distinct } => write!(
                f,
                "fit underdetermined: {} distinct run-count(s), need at least 2",
                distinct
            ),
        }
    }
}

impl std::error::Error for FitError {}

/// Calibrated per-call estimates for one (test, instrument) pair.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Fixed per-batch overhead.
    pub intercept: f64,
    /// Calibrated per-call cost.
    pub slope: f64,
    /// Fraction of variance explained, when requested.
    pub r_square: Option<f64>,
    /// Bootstrap slope distribution, when requested (exactly
    /// `bootstrap_count` entries).
    pub bootstrap: Option<Vec<f64>>,
    /// Kernel density estimate over per-run costs, when requested.
    pub kde: Option<Kde>,
}

impl Analysis {
    /// Percentile confidence interval over the bootstrap distribution.
    ///
    /// `None` if no bootstrap was run or the level is outside (0, 1).
    pub fn slope_interval(&self, level: f64) -> Option<(f64, f64)> {
        self.bootstrap
            .as_deref()
            .and_then(|slopes| percentile_interval(slopes, level))
    }
}

/// Fit the linear cost model to one raw sample.
///
/// # Errors
///
/// [`FitError::Underdetermined`] when the sample holds fewer than two
/// distinct run-counts. This is per (test, instrument) and never fatal to
/// the session.
pub fn fit(sample: &RawSample, options: &FitOptions) -> Result<Analysis, FitError> {
    let line = fit_line(sample.points())?;

    let bootstrap = if options.bootstrap_count > 0 {
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        Some(bootstrap_slopes(
            sample.points(),
            options.bootstrap_count,
            seed,
        ))
    } else {
        None
    };

    let kde = options
        .kde_sample_count
        .and_then(|grid| gaussian_kde(&sample.per_run_costs(), grid));

    Ok(Analysis {
        intercept: line.intercept,
        slope: line.slope,
        r_square: options.r_square.then_some(line.r_square),
        bootstrap,
        kde,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_sample() -> RawSample {
        RawSample::from_points((1..=8).map(|n| (n, 1.5 + 4.0 * n as f64)).collect())
    }

    #[test]
    fn fit_attaches_requested_pieces() {
        let options = FitOptions {
            bootstrap_count: 100,
            r_square: true,
            kde_sample_count: Some(64),
            seed: Some(9),
        };
        let analysis = fit(&linear_sample(), &options).unwrap();

        assert!((analysis.intercept - 1.5).abs() < 1e-9);
        assert!((analysis.slope - 4.0).abs() < 1e-9);
        assert!((analysis.r_square.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(analysis.bootstrap.as_ref().unwrap().len(), 100);
        assert_eq!(analysis.kde.as_ref().unwrap().xs.len(), 64);
    }

    #[test]
    fn fit_omits_disabled_pieces() {
        let options = FitOptions {
            bootstrap_count: 0,
            r_square: false,
            kde_sample_count: None,
            seed: None,
        };
        let analysis = fit(&linear_sample(), &options).unwrap();

        assert!(analysis.r_square.is_none());
        assert!(analysis.bootstrap.is_none());
        assert!(analysis.kde.is_none());
        assert!(analysis.slope_interval(0.95).is_none());
    }

    #[test]
    fn slope_interval_comes_from_bootstrap() {
        let options = FitOptions {
            bootstrap_count: 400,
            seed: Some(11),
            ..FitOptions::default()
        };
        let analysis = fit(&linear_sample(), &options).unwrap();
        let (lo, hi) = analysis.slope_interval(0.95).unwrap();
        assert!(lo <= 4.0 + 1e-9 && 4.0 - 1e-9 <= hi, "({}, {})", lo, hi);
    }

    #[test]
    fn underdetermined_sample_reports_error() {
        let sample = RawSample::from_points(vec![(3, 30.0)]);
        let err = fit(&sample, &FitOptions::default()).unwrap_err();
        assert_eq!(err, FitError::Underdetermined { distinct: 1 });
        assert!(err.to_string().contains("need at least 2"));
    }
}
