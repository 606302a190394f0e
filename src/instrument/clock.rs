//! Monotonic wall-clock instrument.

use std::sync::OnceLock;
use std::time::Instant;

use super::{Instrument, ResourceError};

/// Process-wide fallback epoch for sampling an unloaded clock.
///
/// Captured lazily on first use so even misuse readings stay monotonic.
fn fallback_epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Elapsed-seconds instrument backed by `std::time::Instant`.
///
/// Reads `f64` seconds since the instrument was loaded. `Instant` is
/// monotonic, so the reading never goes backwards; a baseline/final pair
/// around a batch yields the batch's elapsed time.
#[derive(Debug)]
pub struct WallClock {
    epoch: Option<Instant>,
}

impl WallClock {
    /// Create an unloaded wall clock.
    pub fn new() -> Self {
        Self { epoch: None }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrument for WallClock {
    type Reading = f64;

    fn label(&self) -> &str {
        "wall-clock"
    }

    fn unit(&self) -> &str {
        "s"
    }

    fn load(&mut self) -> Result<(), ResourceError> {
        self.epoch = Some(Instant::now());
        Ok(())
    }

    fn unload(&mut self) {
        self.epoch = None;
    }

    fn sample(&mut self) -> f64 {
        match self.epoch {
            Some(epoch) => epoch.elapsed().as_secs_f64(),
            // Sampling an unloaded clock is a caller bug; the shared
            // fallback epoch keeps the contract non-panicking and the
            // readings monotonic.
            None => fallback_epoch().elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_elapsed_seconds() {
        let mut clock = WallClock::new();
        clock.load().unwrap();
        let a = clock.sample();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = clock.sample();
        assert!(b > a);
        clock.unload();
    }

    #[test]
    fn unload_is_idempotent() {
        let mut clock = WallClock::new();
        clock.unload();
        clock.load().unwrap();
        clock.unload();
        clock.unload();
        assert!(clock.sample() >= 0.0);
    }

    #[test]
    fn unloaded_reads_stay_monotonic() {
        let mut clock = WallClock::new();
        let a = clock.sample();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = clock.sample();
        assert!(b >= a, "{} then {}", b, a);
        assert!(b > 0.0);
    }
}
