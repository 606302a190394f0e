//! Configuration for a benchmarking session.

use std::time::Duration;

/// Configuration options shared by the sampling loop and the analysis engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of distinct run-counts to try per test (default: 20).
    pub limit: usize,

    /// Wall-clock budget per test (default: 1 s).
    ///
    /// Checked between batches only; a running batch always completes.
    /// Exhausting the quota truncates the run-count progression and is
    /// never an error.
    pub quota: Duration,

    /// Whether to run a short stabilization pass before each batch
    /// (default: true).
    ///
    /// A managed runtime would force a heap compaction here; without a
    /// collector the pass executes the thunk a few unmeasured times to
    /// prime caches and the allocator, preserving the "no interference
    /// across batches" intent.
    pub stabilize: bool,

    /// Geometric growth factor for the run-count progression (default: 2.0).
    ///
    /// The progression starts at 1 and advances with
    /// `n' = max(n + 1, ceil(n * growth))`, so it is strictly increasing
    /// for any factor >= 1.0.
    pub growth: f64,

    /// Optional grid size for a kernel density estimate over per-run costs
    /// (default: None, disabled).
    ///
    /// When set, each fitted instrument also carries a Gaussian KDE of
    /// `reading / n` across batches, useful for spotting multi-modal cost
    /// distributions the linear fit averages away.
    pub kde_sample_count: Option<usize>,

    /// Bootstrap resampling iterations for the slope distribution
    /// (default: 0, disabled).
    pub bootstrap_count: usize,

    /// Whether to compute and attach R² (default: true).
    pub r_square: bool,

    /// Optional deterministic seed for bootstrap resampling.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: 20,
            quota: Duration::from_secs(1),
            stabilize: true,
            growth: 2.0,
            kde_sample_count: None,
            bootstrap_count: 0,
            r_square: true,
            seed: None,
        }
    }
}

impl Config {
    /// Analysis options derived from this configuration.
    pub fn fit_options(&self) -> crate::analysis::FitOptions {
        crate::analysis::FitOptions {
            bootstrap_count: self.bootstrap_count,
            r_square: self.r_square,
            kde_sample_count: self.kde_sample_count,
            seed: self.seed,
        }
    }
}
