//! Shock velocity estimation from timestamped position samples.

/// Last accepted position sample for one corner. Absent until the corner
/// has produced its first good reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    /// Raw converter counts (already multisample-averaged)
    pub position: i32,
    /// Microseconds since the owning loop's epoch
    pub timestamp_us: u64,
}

/// Simple linear calibration from raw converter counts to millimeters.
/// mm = gain_mm_per_count * (raw - zero_counts)
#[derive(Debug, Clone, Copy)]
pub struct PositionCalibration {
    pub gain_mm_per_count: f32,
    pub zero_counts: i32,
}

impl Default for PositionCalibration {
    fn default() -> Self {
        Self {
            // ~82 mm of travel across a 12-bit converter
            gain_mm_per_count: 0.02,
            zero_counts: 0,
        }
    }
}

/// Quantize a mm-per-count gain to whole micrometers per count, rounding to
/// nearest. Non-finite gains (NaN/±Inf) map to 0.
#[inline]
fn quantize_to_um_i64(gain_mm: f32) -> i64 {
    if !gain_mm.is_finite() {
        return 0;
    }
    (f64::from(gain_mm) * 1000.0).round() as i64
}

impl PositionCalibration {
    /// Micrometers of damper travel per raw count, cached by callers that
    /// want to stay integer-only per sample.
    #[inline]
    pub fn gain_um_per_count(&self) -> i64 {
        quantize_to_um_i64(self.gain_mm_per_count)
    }

    /// Convert a raw reading to millimeters of travel.
    ///
    /// Uses 64-bit intermediates; the result is clamped into i32.
    pub fn position_mm(&self, raw: i32) -> i32 {
        let delta = i64::from(raw) - i64::from(self.zero_counts);
        let um = delta * self.gain_um_per_count();
        (um / 1000).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Convert a rate in raw counts per second to millimeters per second.
    pub fn counts_per_s_to_mm_s(&self, counts_per_s: i64) -> i32 {
        let um_per_s = counts_per_s.saturating_mul(self.gain_um_per_count());
        (um_per_s / 1000).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl From<shock_config::Calibration> for PositionCalibration {
    fn from(c: shock_config::Calibration) -> Self {
        PositionCalibration {
            gain_mm_per_count: c.gain_mm_per_count,
            zero_counts: c.zero_counts,
        }
    }
}

impl From<shock_config::PersistedCalibration> for PositionCalibration {
    fn from(c: shock_config::PersistedCalibration) -> Self {
        PositionCalibration {
            gain_mm_per_count: c.gain_mm_per_count,
            zero_counts: c.zero_counts,
        }
    }
}

/// Finite-difference shock velocity in mm/s between a corner's previous
/// sample and a new reading.
///
/// Returns `None` when the new timestamp does not advance past the previous
/// one; such a sample carries no rate information and must not be binned.
pub fn shock_velocity_mm_s(
    calibration: &PositionCalibration,
    prev: Baseline,
    position: i32,
    timestamp_us: u64,
) -> Option<i32> {
    if timestamp_us <= prev.timestamp_us {
        return None;
    }
    let dt_us = (timestamp_us - prev.timestamp_us) as i64;
    let delta_counts = i64::from(position) - i64::from(prev.position);
    // |delta| <= 2^32 and the multiplier is 1e6, well inside i64
    let counts_per_s = delta_counts * 1_000_000 / dt_us;
    Some(calibration.counts_per_s_to_mm_s(counts_per_s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_gain() -> PositionCalibration {
        PositionCalibration {
            gain_mm_per_count: 1.0,
            zero_counts: 0,
        }
    }

    #[test]
    fn fifty_counts_over_one_ms_is_fifty_thousand_per_second() {
        let prev = Baseline {
            position: 100,
            timestamp_us: 1_000_000,
        };
        let v = shock_velocity_mm_s(&unit_gain(), prev, 150, 1_001_000).unwrap();
        assert_eq!(v, 50_000);
    }

    #[test]
    fn compression_and_rebound_are_signed() {
        let prev = Baseline {
            position: 1000,
            timestamp_us: 0,
        };
        let up = shock_velocity_mm_s(&unit_gain(), prev, 1100, 100_000).unwrap();
        let down = shock_velocity_mm_s(&unit_gain(), prev, 900, 100_000).unwrap();
        assert_eq!(up, 1000);
        assert_eq!(down, -1000);
    }

    #[test]
    fn zero_elapsed_time_is_a_no_op() {
        let prev = Baseline {
            position: 100,
            timestamp_us: 500,
        };
        assert_eq!(shock_velocity_mm_s(&unit_gain(), prev, 900, 500), None);
    }

    #[test]
    fn backwards_timestamp_is_a_no_op() {
        let prev = Baseline {
            position: 100,
            timestamp_us: 500,
        };
        assert_eq!(shock_velocity_mm_s(&unit_gain(), prev, 900, 400), None);
    }

    #[test]
    fn gain_scales_counts_to_millimeters() {
        let cal = PositionCalibration {
            gain_mm_per_count: 0.02,
            zero_counts: 100,
        };
        assert_eq!(cal.position_mm(100), 0);
        assert_eq!(cal.position_mm(1100), 20);
        assert_eq!(cal.counts_per_s_to_mm_s(50_000), 1000);
    }

    #[test]
    fn non_finite_gain_degrades_to_zero() {
        let cal = PositionCalibration {
            gain_mm_per_count: f32::NAN,
            zero_counts: 0,
        };
        assert_eq!(cal.position_mm(4095), 0);
        assert_eq!(cal.counts_per_s_to_mm_s(1_000_000), 0);
    }
}
