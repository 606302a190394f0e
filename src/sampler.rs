//! The sampling loop: batches of growing run-counts per test unit.
//!
//! For each test unit, run-counts grow geometrically from 1. Each batch:
//!
//! 1. optionally stabilizes runtime state (a short unmeasured warm-up pass
//!    in place of a managed runtime's heap compaction),
//! 2. loads every requested instrument and samples a baseline,
//! 3. executes the unit's thunk exactly `n` times in a tight sequential
//!    loop with no interleaved work,
//! 4. samples each instrument again and records `(n, final - baseline)`,
//! 5. unloads every instrument via an RAII guard, on success and failure
//!    alike.
//!
//! The loop stops after `limit` batches or when the per-test wall-clock
//! `quota` is exhausted, whichever comes first. The quota is checked
//! between batches only, against `std::time::Instant`, a timing source
//! independent of the instruments under test, so a running batch always
//! completes. Quota exhaustion is not an error; it yields a shorter but
//! valid raw sample.

use std::time::Instant;

use crate::config::Config;
use crate::instrument::{black_box, ResourceError};
use crate::registry::{Loaded, Registry, Witness};
use crate::unit::TestUnit;

/// Unmeasured thunk executions per stabilization pass.
const STABILIZE_RUNS: usize = 4;

/// Ordered `(run_count, reading)` pairs for one (test, instrument) pair.
///
/// Append-only while the sampling loop runs; plain numeric data afterward.
/// The analysis engine consumes this and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    points: Vec<(u64, f64)>,
}

impl RawSample {
    /// Build a sample from pre-collected points (mainly for tests and
    /// synthetic data).
    pub fn from_points(points: Vec<(u64, f64)>) -> Self {
        Self { points }
    }

    /// The collected `(run_count, reading)` pairs in collection order.
    pub fn points(&self) -> &[(u64, f64)] {
        &self.points
    }

    /// Number of batches collected.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no batch completed before the quota ran out.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of distinct run-counts observed.
    ///
    /// An OLS fit needs at least two; fewer means the fit is
    /// underdetermined.
    pub fn distinct_run_counts(&self) -> usize {
        let mut counts: Vec<u64> = self.points.iter().map(|&(n, _)| n).collect();
        counts.sort_unstable();
        counts.dedup();
        counts.len()
    }

    /// Per-run costs `reading / n`, one per batch.
    pub fn per_run_costs(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|&(n, reading)| reading / n as f64)
            .collect()
    }

    fn push(&mut self, run_count: u64, reading: f64) {
        self.points.push((run_count, reading));
    }
}

/// Raw samples for one test across all requested instruments, or the
/// resource failure that aborted it.
#[derive(Debug)]
pub struct TestSamples {
    /// Name of the test unit.
    pub name: String,
    /// Per-instrument samples, or the load failure for this test.
    pub outcome: Result<Vec<InstrumentSamples>, ResourceError>,
}

/// Raw sample plus instrument identity for one (test, instrument) pair.
#[derive(Debug, Clone)]
pub struct InstrumentSamples {
    /// Instrument label (stable across runs).
    pub label: String,
    /// Physical unit of the readings.
    pub unit: String,
    /// The collected batches.
    pub sample: RawSample,
}

/// Everything one invocation of the sampling loop produced.
#[derive(Debug)]
pub struct SessionSamples {
    /// One entry per test unit, in input order.
    pub tests: Vec<TestSamples>,
}

/// Drive every test unit through the batch progression.
///
/// A `load` failure aborts sampling for that test only and is recorded in
/// its outcome; remaining tests still run. Instruments are released on
/// every exit path.
pub fn run(
    config: &Config,
    registry: &mut Registry,
    witnesses: &[Witness],
    units: &mut [TestUnit],
) -> SessionSamples {
    let tests = units
        .iter_mut()
        .map(|unit| TestSamples {
            name: unit.name().to_string(),
            outcome: run_one(config, registry, witnesses, unit),
        })
        .collect();

    SessionSamples { tests }
}

fn run_one(
    config: &Config,
    registry: &mut Registry,
    witnesses: &[Witness],
    unit: &mut TestUnit,
) -> Result<Vec<InstrumentSamples>, ResourceError> {
    let mut per_instrument: Vec<InstrumentSamples> = witnesses
        .iter()
        .map(|&w| InstrumentSamples {
            label: registry.label(w).to_string(),
            unit: registry.unit(w).to_string(),
            sample: RawSample::default(),
        })
        .collect();

    let started = Instant::now();
    let mut run_count: u64 = 1;

    for _ in 0..config.limit {
        if started.elapsed() >= config.quota {
            // Budget exhausted: stop adding run-counts, keep what we have.
            break;
        }

        if config.stabilize {
            stabilize(unit);
        }

        let mut guard = Loaded::acquire(registry, witnesses)?;

        let baselines: Vec<f64> = witnesses
            .iter()
            .map(|&w| guard.registry().sample(w).as_f64())
            .collect();

        for _ in 0..run_count {
            black_box(unit.run());
        }

        for (index, &w) in witnesses.iter().enumerate() {
            let reading = guard.registry().sample(w).as_f64() - baselines[index];
            per_instrument[index].sample.push(run_count, reading);
        }

        drop(guard);

        run_count = next_run_count(run_count, config.growth);
    }

    Ok(per_instrument)
}

/// Prime caches and the allocator before a batch.
///
/// Stands in for the heap-compaction request a garbage-collected runtime
/// would make: a few unmeasured executions bring the unit to steady state
/// so earlier batches cannot interfere with later ones.
fn stabilize(unit: &mut TestUnit) {
    for _ in 0..STABILIZE_RUNS {
        black_box(unit.run());
    }
}

/// Next run-count in the geometric progression, strictly increasing for
/// any growth factor.
fn next_run_count(current: u64, growth: f64) -> u64 {
    let grown = (current as f64 * growth).ceil() as u64;
    grown.max(current + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::CounterProbe;
    use std::time::Duration;

    fn quick_config(limit: usize) -> Config {
        Config {
            limit,
            quota: Duration::from_secs(10),
            stabilize: false,
            ..Config::default()
        }
    }

    #[test]
    fn progression_is_strictly_increasing() {
        assert_eq!(next_run_count(1, 2.0), 2);
        assert_eq!(next_run_count(4, 2.0), 8);
        assert_eq!(next_run_count(1, 5.0), 5);
        assert_eq!(next_run_count(125, 5.0), 625);
        // Degenerate growth factors still advance.
        assert_eq!(next_run_count(10, 1.0), 11);
        assert_eq!(next_run_count(10, 0.5), 11);
    }

    #[test]
    fn collects_limit_batches_with_generous_quota() {
        let mut registry = Registry::new();
        let id = registry.register("calls", || CounterProbe::new("calls", "count"));
        let witness = registry.instantiate(id).unwrap();

        let mut units = vec![TestUnit::new("noop", || {})];
        let session = run(&quick_config(6), &mut registry, &[witness], &mut units);

        assert_eq!(session.tests.len(), 1);
        let instruments = session.tests[0].outcome.as_ref().unwrap();
        assert_eq!(instruments.len(), 1);
        let sample = &instruments[0].sample;
        assert_eq!(sample.len(), 6);
        assert_eq!(sample.distinct_run_counts(), 6);

        let counts: Vec<u64> = sample.points().iter().map(|&(n, _)| n).collect();
        assert_eq!(counts, [1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn readings_are_per_batch_deltas() {
        let mut registry = Registry::new();
        let handle = crate::instrument::ProbeHandle::new();
        let probe_side = handle.clone();
        let id = registry.register("ops", move || {
            CounterProbe::from_handle("ops", "count", probe_side.clone())
        });
        let witness = registry.instantiate(id).unwrap();

        let mut units = vec![TestUnit::new("bump", move || handle.add(3))];
        let session = run(&quick_config(4), &mut registry, &[witness], &mut units);

        let instruments = session.tests[0].outcome.as_ref().unwrap();
        for &(n, reading) in instruments[0].sample.points() {
            assert_eq!(reading, (3 * n) as f64, "batch of {} runs", n);
        }
    }

    #[test]
    fn zero_quota_collects_nothing() {
        let mut registry = Registry::new();
        let id = registry.register("calls", || CounterProbe::new("calls", "count"));
        let witness = registry.instantiate(id).unwrap();

        let config = Config {
            quota: Duration::ZERO,
            ..quick_config(5)
        };
        let mut units = vec![TestUnit::new("noop", || {})];
        let session = run(&config, &mut registry, &[witness], &mut units);

        let instruments = session.tests[0].outcome.as_ref().unwrap();
        assert!(instruments[0].sample.is_empty());
    }

    #[test]
    fn per_run_costs_divide_by_run_count() {
        let sample = RawSample::from_points(vec![(1, 10.0), (5, 50.0), (25, 250.0)]);
        assert_eq!(sample.per_run_costs(), vec![10.0, 10.0, 10.0]);
        assert_eq!(sample.distinct_run_counts(), 3);
    }
}
