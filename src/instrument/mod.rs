//! Pluggable measurement sources.
//!
//! An [`Instrument`] is anything that can observe a monotonically growing
//! counter around a batch of work: elapsed wall-clock time, a count of
//! allocated objects, a hardware event counter behind a custom probe.
//! Instruments differ in their native representation (a clock reads
//! floating-point seconds, an allocation counter reads an integer count),
//! so the contract is generic over a [`CounterValue`] reading type rather
//! than fixing one numeric type for everyone.
//!
//! Built-in sources:
//! - [`WallClock`]: monotonic elapsed seconds over `std::time::Instant`
//! - [`CounterProbe`]: shared atomic `u64` counter for custom probes
//!
//! Instruments are held by the [`Registry`](crate::Registry), which erases
//! their concrete type behind opaque witnesses while keeping readings
//! recoverable at their native type.

mod clock;
mod probe;

pub use clock::WallClock;
pub use probe::{CounterProbe, ProbeHandle};

use std::any::Any;
use std::fmt;
use std::hint::black_box as std_black_box;

/// Wrapper around `std::hint::black_box` for preventing compiler optimizations.
///
/// Wrap the work inside a measured thunk with this to keep the compiler from
/// optimizing the computation away or reordering it relative to instrument
/// reads.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

/// A native counter reading.
///
/// The open set of numeric representations instruments may report in:
/// `f64` for continuous quantities (seconds), `u64`/`u32` for discrete
/// counts. Conversion to the generic [`Value`] is explicit, never silent.
pub trait CounterValue: Copy + fmt::Debug + Send + 'static {
    /// Convert into the generic reading used by the analysis engine.
    fn into_value(self) -> Value;
}

impl CounterValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl CounterValue for u64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl CounterValue for u32 {
    fn into_value(self) -> Value {
        Value::Int(u64::from(self))
    }
}

/// A generic instrument reading.
///
/// Carries the reading at its native precision; [`Value::as_f64`] is the
/// single explicit narrowing point used when feeding the analysis engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Continuous quantity (e.g. seconds).
    Float(f64),
    /// Discrete count (e.g. allocated objects).
    Int(u64),
}

impl Value {
    /// View the reading as `f64` for regression purposes.
    ///
    /// Counts above 2^53 lose precision here; the exact value stays
    /// available through [`Registry::sample_exact`](crate::Registry::sample_exact).
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
        }
    }
}

/// Error raised when an instrument fails to acquire its observation
/// resources (e.g. the OS denies a timer handle or a perf counter).
///
/// Aborts sampling for the affected test only; other tests proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    /// Label of the instrument that failed to load.
    pub label: String,
    /// Human-readable reason for the failure.
    pub reason: String,
}

impl ResourceError {
    /// Create a new resource error for the given instrument label.
    pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instrument '{}' failed to load: {}", self.label, self.reason)
    }
}

impl std::error::Error for ResourceError {}

/// A concrete, pluggable measurement source.
///
/// The lifecycle contract:
/// 1. [`load`](Instrument::load) acquires whatever OS- or runtime-level
///    resources are needed to observe; it may fail with [`ResourceError`].
/// 2. [`sample`](Instrument::sample) reads the current counter value at its
///    native precision. Readings are point-in-time; the sampling loop takes
///    a baseline before a batch and subtracts it from the reading after.
/// 3. [`unload`](Instrument::unload) releases the resources. It must be
///    idempotent and safe to call even after a failed or partial `load`;
///    the registry guarantees release on every exit path and relies on that.
pub trait Instrument {
    /// Native reading type of this instrument's counter.
    type Reading: CounterValue;

    /// Stable, human-readable name (e.g. `"wall-clock"`).
    fn label(&self) -> &str;

    /// Physical unit of the readings (e.g. `"s"`, `"bytes"`).
    fn unit(&self) -> &str;

    /// Acquire the resources needed to observe.
    fn load(&mut self) -> Result<(), ResourceError>;

    /// Release observation resources. Idempotent.
    fn unload(&mut self);

    /// Read the current counter value.
    fn sample(&mut self) -> Self::Reading;
}

/// Object-safe erasure of [`Instrument`], used by the registry to hold
/// heterogeneous instruments in one collection.
///
/// The blanket impl forwards everything and additionally exposes the
/// reading as a boxed [`Any`] so the registry can project it back to the
/// exact registered type, failing safely on mismatch.
pub(crate) trait ErasedInstrument {
    fn label(&self) -> &str;
    fn unit(&self) -> &str;
    fn load(&mut self) -> Result<(), ResourceError>;
    fn unload(&mut self);
    fn sample_value(&mut self) -> Value;
    fn sample_boxed(&mut self) -> Box<dyn Any>;
    fn reading_type_name(&self) -> &'static str;
}

impl<I: Instrument> ErasedInstrument for I {
    fn label(&self) -> &str {
        Instrument::label(self)
    }

    fn unit(&self) -> &str {
        Instrument::unit(self)
    }

    fn load(&mut self) -> Result<(), ResourceError> {
        Instrument::load(self)
    }

    fn unload(&mut self) {
        Instrument::unload(self)
    }

    fn sample_value(&mut self) -> Value {
        self.sample().into_value()
    }

    fn sample_boxed(&mut self) -> Box<dyn Any> {
        Box::new(self.sample())
    }

    fn reading_type_name(&self) -> &'static str {
        std::any::type_name::<I::Reading>()
    }
}
