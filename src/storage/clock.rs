//! Time sources.
//!
//! Staleness checks compare file modification times against the recorded
//! index build time; tests drive both through [`ManualClock`].

use std::sync::Mutex;

/// Source of the current time in fractional seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        crate::current_timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now += seconds;
        }
    }

    /// Sets the clock to `value`.
    pub fn set(&self, value: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now = value;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.lock().map_or(0.0, |now| *now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10.0);
        assert!((clock.now() - 10.0).abs() < f64::EPSILON);
        clock.advance(2.5);
        assert!((clock.now() - 12.5).abs() < f64::EPSILON);
        clock.set(1.0);
        assert!((clock.now() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_system_clock_is_positive() {
        assert!(SystemClock.now() > 0.0);
    }
}
