//! Test and helper mocks for shock_core.

use shock_traits::{Clock, PositionSensor, Watchdog};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A sensor that always errors on read; useful when a loop must be
/// constructible but never successfully sample.
pub struct NoopSensor;

impl PositionSensor for NoopSensor {
    fn read_raw(
        &mut self,
        _channel: u8,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// Returns a shared, externally settable value for every channel; reads can
/// be failed on demand to exercise the transient-failure path.
#[derive(Clone, Default)]
pub struct SharedValueSensor {
    pub value: Arc<AtomicI32>,
    pub failing: Arc<AtomicBool>,
}

impl SharedValueSensor {
    pub fn at(value: i32) -> Self {
        let s = Self::default();
        s.value.store(value, Ordering::Relaxed);
        s
    }

    pub fn set(&self, value: i32) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl PositionSensor for SharedValueSensor {
    fn read_raw(
        &mut self,
        _channel: u8,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("adc busy")));
        }
        Ok(self.value.load(Ordering::Relaxed))
    }
}

/// Watchdog spy counting registrations and feeds; optionally starts failing
/// after a feed budget is exhausted.
#[derive(Clone)]
pub struct CountingWatchdog {
    pub registrations: Arc<AtomicU64>,
    pub feeds: Arc<AtomicU64>,
    fail_after: u64,
}

impl Default for CountingWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingWatchdog {
    pub fn new() -> Self {
        Self {
            registrations: Arc::new(AtomicU64::new(0)),
            feeds: Arc::new(AtomicU64::new(0)),
            fail_after: u64::MAX,
        }
    }

    /// Succeed for `budget` feeds, then fail every one after that.
    pub fn failing_after(budget: u64) -> Self {
        Self {
            fail_after: budget,
            ..Self::new()
        }
    }

    pub fn feed_count(&self) -> u64 {
        self.feeds.load(Ordering::Relaxed)
    }
}

impl Watchdog for CountingWatchdog {
    fn register(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.registrations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn feed(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let n = self.feeds.fetch_add(1, Ordering::Relaxed) + 1;
        if n > self.fail_after {
            return Err(Box::new(std::io::Error::other("watchdog expired")));
        }
        Ok(())
    }
}

/// Deterministic clock that advances only when slept on or explicitly told
/// to; lets loop tests control elapsed microseconds exactly.
#[derive(Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}
