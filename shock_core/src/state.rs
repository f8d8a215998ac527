//! Shared read/control surface between the sampling loops and consumers.

use crate::config::SamplerCfg;
use crate::corner::{CORNER_COUNT, Corner};
use crate::histogram::{BucketMap, HistogramBank};
use crate::velocity::PositionCalibration;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Histograms, last known positions, and the recording flag for all corners.
///
/// One instance is shared by every loop and every consumer. Corner ownership
/// is partitioned by group at loop construction, so each counter and
/// position cell has exactly one writer; everything is relaxed atomics and
/// nothing on the sampling path can block.
pub struct ShockState {
    histograms: HistogramBank,
    buckets: BucketMap,
    calibration: PositionCalibration,
    positions: [AtomicI32; CORNER_COUNT],
    recording: AtomicBool,
}

impl ShockState {
    pub fn new(cfg: &SamplerCfg, calibration: PositionCalibration) -> Self {
        Self {
            histograms: HistogramBank::new(cfg.bucket_count),
            buckets: BucketMap::new(cfg.bucket_count, cfg.max_speed_mm_s),
            calibration,
            positions: std::array::from_fn(|_| AtomicI32::new(0)),
            recording: AtomicBool::new(true),
        }
    }

    // --- control surface ---

    pub fn recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    /// Flip recording on or off. Loops observe the change within one tick.
    pub fn set_recording(&self, active: bool) {
        self.recording.store(active, Ordering::Relaxed);
    }

    // --- sampling-side accessors ---

    pub fn histograms(&self) -> &HistogramBank {
        &self.histograms
    }

    pub fn buckets(&self) -> &BucketMap {
        &self.buckets
    }

    pub fn calibration(&self) -> &PositionCalibration {
        &self.calibration
    }

    pub(crate) fn record_position(&self, corner: Corner, raw: i32) {
        self.positions[corner.index()].store(raw, Ordering::Relaxed);
    }

    // --- read surface ---

    pub fn position_raw(&self, corner: Corner) -> i32 {
        self.positions[corner.index()].load(Ordering::Relaxed)
    }

    /// Last known damper position in millimeters of travel.
    pub fn position_mm(&self, corner: Corner) -> i32 {
        self.calibration.position_mm(self.position_raw(corner))
    }

    pub fn positions_mm(&self) -> [i32; CORNER_COUNT] {
        std::array::from_fn(|i| {
            self.calibration
                .position_mm(self.positions[i].load(Ordering::Relaxed))
        })
    }

    pub fn raw_histogram(&self, corner: Corner) -> Vec<u64> {
        self.histograms.counts(corner)
    }

    pub fn normalized_histogram(&self, corner: Corner) -> Vec<u32> {
        self.histograms.normalized(corner)
    }

    pub fn samples(&self, corner: Corner) -> u64 {
        self.histograms.samples(corner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_defaults_on_and_toggles() {
        let state = ShockState::new(&SamplerCfg::default(), PositionCalibration::default());
        assert!(state.recording());
        state.set_recording(false);
        assert!(!state.recording());
        state.set_recording(true);
        assert!(state.recording());
    }

    #[test]
    fn positions_convert_through_calibration() {
        let cal = PositionCalibration {
            gain_mm_per_count: 0.05,
            zero_counts: 100,
        };
        let state = ShockState::new(&SamplerCfg::default(), cal);
        state.record_position(Corner::RearLeft, 1100);
        assert_eq!(state.position_raw(Corner::RearLeft), 1100);
        assert_eq!(state.position_mm(Corner::RearLeft), 50);
        assert_eq!(state.positions_mm()[Corner::RearLeft.index()], 50);
        // untouched corners sit at the calibration zero offset
        assert_eq!(state.position_mm(Corner::FrontLeft), -5);
    }
}
