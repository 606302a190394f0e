//! Custom counter probe instrument.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{Instrument, ResourceError};

/// Handle for the side that feeds a [`CounterProbe`].
///
/// Cloneable and cheap to bump from inside a measured thunk. The probe
/// instrument samples the same underlying counter.
#[derive(Debug, Clone)]
pub struct ProbeHandle {
    counter: Arc<AtomicU64>,
}

impl ProbeHandle {
    /// Create a fresh counter handle not yet tied to a probe.
    ///
    /// Useful when the feeding side must exist before the instrument does,
    /// e.g. a registry factory that builds the probe lazily:
    ///
    /// ```ignore
    /// let handle = ProbeHandle::new();
    /// let id = registry.register("allocs", move || {
    ///     CounterProbe::from_handle("allocs", "objects", handle.clone())
    /// });
    /// ```
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Add `amount` to the counter.
    #[inline]
    pub fn add(&self, amount: u64) {
        self.counter.fetch_add(amount, Ordering::Relaxed);
    }

    /// Increment the counter by one.
    #[inline]
    pub fn bump(&self) {
        self.add(1);
    }
}

impl Default for ProbeHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer counter instrument fed through a [`ProbeHandle`].
///
/// Covers discrete measurement sources the engine has no built-in notion
/// of: allocation counts reported by a counting allocator, cache events,
/// domain-specific operation counts. Readings are the raw accumulated
/// `u64`; the sampling loop turns baseline/final pairs into per-batch
/// deltas, so the probe itself never resets.
#[derive(Debug)]
pub struct CounterProbe {
    label: String,
    unit: String,
    counter: Arc<AtomicU64>,
}

impl CounterProbe {
    /// Create a probe with the given label and unit.
    pub fn new(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a probe over an existing handle's counter.
    pub fn from_handle(
        label: impl Into<String>,
        unit: impl Into<String>,
        handle: ProbeHandle,
    ) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
            counter: handle.counter,
        }
    }

    /// Handle for the side that increments the counter.
    pub fn handle(&self) -> ProbeHandle {
        ProbeHandle {
            counter: Arc::clone(&self.counter),
        }
    }
}

impl Instrument for CounterProbe {
    type Reading = u64;

    fn label(&self) -> &str {
        &self.label
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn load(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn unload(&mut self) {}

    fn sample(&mut self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
