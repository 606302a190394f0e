//! Session entry point and builder.

use crate::analysis;
use crate::config::Config;
use crate::instrument::WallClock;
use crate::registry::{Registry, Witness};
use crate::report::{FitOutcome, InstrumentReport, Report, TestReport};
use crate::sampler;
use crate::unit::TestUnit;

/// Main entry point for a benchmarking session.
///
/// Configure with the builder methods, then [`run`](Harness::run) the
/// sampling loop and analysis over a registry, witnesses, and test units.
///
/// # Example
///
/// ```ignore
/// use percall::{Harness, Registry, TestUnit, WallClock};
/// use std::time::Duration;
///
/// let mut registry = Registry::new();
/// let clock = registry.register("wall-clock", WallClock::new);
/// let witness = registry.instantiate(clock)?;
///
/// let mut units = vec![TestUnit::new("parse", move || {
///     percall::black_box(parse(&input));
/// })];
///
/// let report = Harness::new()
///     .quota(Duration::from_millis(500))
///     .bootstrap_count(500)
///     .run(&mut registry, &[witness], &mut units);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Harness {
    config: Config,
}

impl Harness {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Maximum number of distinct run-counts per test.
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    /// Wall-clock budget per test.
    pub fn quota(mut self, quota: std::time::Duration) -> Self {
        self.config.quota = quota;
        self
    }

    /// Whether to run the stabilization pass before each batch.
    pub fn stabilize(mut self, on: bool) -> Self {
        self.config.stabilize = on;
        self
    }

    /// Geometric growth factor for the run-count progression.
    pub fn growth(mut self, factor: f64) -> Self {
        self.config.growth = factor;
        self
    }

    /// KDE grid size over per-run costs; disables KDE when unset.
    pub fn kde_sample_count(mut self, grid: usize) -> Self {
        self.config.kde_sample_count = Some(grid);
        self
    }

    /// Bootstrap resampling iterations for the slope distribution.
    pub fn bootstrap_count(mut self, count: usize) -> Self {
        self.config.bootstrap_count = count;
        self
    }

    /// Whether to compute and attach R².
    pub fn r_square(mut self, on: bool) -> Self {
        self.config.r_square = on;
        self
    }

    /// Deterministic seed for bootstrap resampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sample every test unit, fit each instrument's raw sample, and merge
    /// the per-instrument results into one report.
    ///
    /// Failures stay local: an instrument `load` failure marks that test
    /// only, an underdetermined fit marks that (test, instrument) pair
    /// only; everything else still gets measured and analyzed.
    pub fn run(
        &self,
        registry: &mut Registry,
        witnesses: &[Witness],
        units: &mut [TestUnit],
    ) -> Report {
        let session = sampler::run(&self.config, registry, witnesses, units);
        let options = self.config.fit_options();

        let tests = session
            .tests
            .into_iter()
            .map(|test| match test.outcome {
                Ok(instruments) => {
                    let reports = instruments
                        .into_iter()
                        .map(|per_instrument| {
                            let outcome = match analysis::fit(&per_instrument.sample, &options) {
                                Ok(analysis) => FitOutcome::Fitted { analysis },
                                Err(analysis::FitError::Underdetermined { distinct }) => {
                                    FitOutcome::Underdetermined {
                                        distinct_run_counts: distinct,
                                    }
                                }
                            };
                            InstrumentReport {
                                label: per_instrument.label,
                                unit: per_instrument.unit,
                                outcome,
                            }
                        })
                        .collect();
                    TestReport::merged(test.name, reports)
                }
                Err(resource) => TestReport::failed(test.name, resource.to_string()),
            })
            .collect();

        Report { tests }
    }
}

/// Measure one thunk against a wall clock with default configuration.
///
/// Convenience wrapper: registers a [`WallClock`], runs a single unit, and
/// returns the merged report.
pub fn bench(name: impl Into<String>, thunk: impl FnMut() + 'static) -> Report {
    let mut registry = Registry::new();
    let clock = registry.register("wall-clock", WallClock::new);
    let witness = registry
        .instantiate(clock)
        .unwrap_or_else(|_| unreachable!("id was just registered"));

    let mut units = vec![TestUnit::new(name, thunk)];
    Harness::new().run(&mut registry, &[witness], &mut units)
}
