pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Analog position source for one damper, addressed by ADC channel index.
///
/// `read_raw` returns the raw converter counts for a single conversion; it
/// may fail transiently (e.g. the converter is shared with a radio
/// subsystem). Callers are expected to average several consecutive reads.
pub trait PositionSensor {
    fn read_raw(
        &mut self,
        channel: u8,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

/// External liveness watchdog.
///
/// `register` subscribes the calling task once; `feed` must then be invoked
/// at the cadence the watchdog expects. A failed `feed` is not recoverable:
/// the watchdog will terminate the process on its own schedule.
pub trait Watchdog {
    fn register(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn feed(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
