//! Common time/period helpers for shock_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Shortest tick interval the sampling loops will run at. Anything shorter
/// would busy-loop the host scheduler instead of sampling faster.
pub const MIN_TICK_US: u64 = 100;

/// Compute the tick interval in microseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures the result is at least 1 microsecond.
#[inline]
pub fn tick_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Effective sampling rate in Hz for a given tick interval.
#[inline]
pub fn hz_from_tick_us(tick_us: u64) -> f32 {
    if tick_us == 0 {
        return 0.0;
    }
    MICROS_PER_SEC as f32 / tick_us as f32
}
