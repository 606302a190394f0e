//! # percall
//!
//! Calibrate the per-call cost of a unit of work.
//!
//! This crate runs a thunk repeatedly under geometrically growing repetition
//! counts, records one or more instruments' readings per batch, and fits a
//! linear model `reading = intercept + slope * n` to separate fixed per-batch
//! overhead from per-call cost:
//! - `slope` is the calibrated per-call cost,
//! - `intercept` absorbs fixed overhead,
//! - R² reports how much of the variance the linear model explains.
//!
//! Instruments are pluggable: a wall clock, an allocation counter, or any
//! custom probe can be registered without the engine knowing its concrete
//! reading type. Readings remain recoverable at their native numeric type
//! through the registry's witness handles.
//!
//! ## Quick start
//!
//! ```ignore
//! use percall::bench;
//!
//! let report = bench("fib 20", || {
//!     std::hint::black_box(fib(20));
//! });
//! println!("{}", percall::output::to_json_pretty(&report).unwrap());
//! ```
//!
//! ## Multiple instruments and parameterized tests
//!
//! ```ignore
//! use percall::{Harness, Registry, TestUnit, WallClock};
//! use std::time::Duration;
//!
//! let mut registry = Registry::new();
//! let clock = registry.register("wall-clock", WallClock::new);
//! let witness = registry.instantiate(clock)?;
//!
//! let mut units = TestUnit::indexed("sum", [10usize, 100, 1000], |len| {
//!     let input: Vec<u64> = (0..len as u64).collect(); // setup, unmeasured
//!     Box::new(move || {
//!         std::hint::black_box(input.iter().sum::<u64>());
//!     })
//! });
//!
//! let report = Harness::new()
//!     .limit(12)
//!     .quota(Duration::from_millis(200))
//!     .bootstrap_count(200)
//!     .run(&mut registry, &[witness], &mut units);
//! ```
//!
//! Sampling is deliberately single-threaded and sequential: interleaved work
//! would add unaccounted-for noise to the very quantities being measured.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod harness;
mod registry;
mod report;
mod unit;

pub mod analysis;
pub mod instrument;
pub mod output;
pub mod sampler;

pub use config::Config;
pub use harness::{bench, Harness};
pub use instrument::{
    black_box, CounterProbe, CounterValue, Instrument, ProbeHandle, ResourceError, Value,
    WallClock,
};
pub use registry::{MeasureId, Registry, RegistryError, Witness};
pub use report::{FitOutcome, InstrumentReport, Report, TestOutcome, TestReport};
pub use sampler::{InstrumentSamples, RawSample, SessionSamples, TestSamples};
pub use unit::TestUnit;

pub use analysis::{Analysis, FitError, FitOptions, Kde};
