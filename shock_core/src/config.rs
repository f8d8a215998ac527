//! Runtime configuration for the sampling loops.

use crate::error::BuildError;
use crate::util;

/// All boot-time knobs for one sampling loop. Not runtime-mutable.
#[derive(Debug, Clone, Copy)]
pub struct SamplerCfg {
    /// Velocity buckets per corner
    pub bucket_count: usize,
    /// Maximum expected absolute shock velocity (mm/s)
    pub max_speed_mm_s: i32,
    /// Raw reads averaged into one position sample
    pub multisample_count: u32,
    /// Sleep between ticks (microseconds)
    pub tick_interval_us: u64,
    /// Ticks between sample-rate diagnostic reports
    pub report_interval_ticks: u32,
    /// Log every raw converter read at TRACE level
    pub trace_raw: bool,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            bucket_count: 10,
            max_speed_mm_s: 2000,
            multisample_count: 8,
            tick_interval_us: 1_000,
            report_interval_ticks: 1024,
            trace_raw: false,
        }
    }
}

impl SamplerCfg {
    /// Check structural fields and clamp the tick interval to the supported
    /// floor. Clamping is a startup correction, not an error.
    pub fn validated(mut self) -> Result<Self, BuildError> {
        if self.bucket_count == 0 {
            return Err(BuildError::InvalidConfig("bucket_count must be > 0"));
        }
        if self.max_speed_mm_s <= 0 {
            return Err(BuildError::InvalidConfig("max_speed_mm_s must be > 0"));
        }
        if 2 * i64::from(self.max_speed_mm_s) < self.bucket_count as i64 {
            return Err(BuildError::InvalidConfig(
                "bucket width rounds to zero for this speed span",
            ));
        }
        if self.multisample_count == 0 {
            return Err(BuildError::InvalidConfig("multisample_count must be > 0"));
        }
        if self.report_interval_ticks == 0 {
            return Err(BuildError::InvalidConfig(
                "report_interval_ticks must be > 0",
            ));
        }
        if self.tick_interval_us < util::MIN_TICK_US {
            tracing::warn!(
                configured_us = self.tick_interval_us,
                clamped_us = util::MIN_TICK_US,
                "tick interval shorter than the supported floor, clamping"
            );
            self.tick_interval_us = util::MIN_TICK_US;
        }
        Ok(self)
    }

    /// Map the TOML schema onto loop knobs.
    pub fn from_config(cfg: &shock_config::Config) -> Self {
        SamplerCfg {
            bucket_count: cfg.histogram.bucket_count,
            max_speed_mm_s: cfg.histogram.max_speed_mm_s,
            multisample_count: cfg.sampling.multisample_count,
            tick_interval_us: util::tick_us(cfg.sampling.rate_hz),
            report_interval_ticks: cfg.sampling.report_interval_ticks,
            trace_raw: cfg.sampling.trace_raw,
        }
    }
}
