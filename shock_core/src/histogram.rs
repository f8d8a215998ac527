//! Velocity bucket mapping and per-corner histogram accumulation.
//!
//! Counters are relaxed atomics: each corner has exactly one writer (the
//! loop that owns its group), and the only concurrent access is a reader
//! taking a normalization snapshot. The distribution shape is what matters,
//! not exact counts, so a snapshot racing a writer is acceptable.

use crate::corner::{CORNER_COUNT, Corner};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maps a shock velocity (mm/s) onto a fixed set of histogram buckets.
///
/// The bucket domain spans `[-max_speed, +max_speed)`; velocities outside
/// the domain clamp into the edge buckets so every sample is counted
/// exactly once.
#[derive(Debug, Clone, Copy)]
pub struct BucketMap {
    bucket_count: usize,
    max_speed_mm_s: i32,
    bucket_width: i32,
}

impl BucketMap {
    pub fn new(bucket_count: usize, max_speed_mm_s: i32) -> Self {
        debug_assert!(bucket_count > 0, "bucket_count must be validated upstream");
        let bucket_count = bucket_count.max(1);
        let max_speed_mm_s = max_speed_mm_s.max(1);
        let span = 2 * i64::from(max_speed_mm_s);
        let bucket_width = (span / bucket_count as i64).max(1) as i32;
        Self {
            bucket_count,
            max_speed_mm_s,
            bucket_width,
        }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    #[inline]
    pub fn bucket_width(&self) -> i32 {
        self.bucket_width
    }

    #[inline]
    pub fn bucket_for(&self, velocity_mm_s: i32) -> usize {
        let raw =
            (i64::from(velocity_mm_s) + i64::from(self.max_speed_mm_s)) / i64::from(self.bucket_width);
        raw.clamp(0, self.bucket_count as i64 - 1) as usize
    }
}

/// Per-corner bucket counters plus a running sample total.
pub struct HistogramBank {
    bucket_count: usize,
    counts: Box<[AtomicU64]>,
    samples: [AtomicU64; CORNER_COUNT],
}

impl HistogramBank {
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        let counts = (0..CORNER_COUNT * bucket_count)
            .map(|_| AtomicU64::new(0))
            .collect();
        Self {
            bucket_count,
            counts,
            samples: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    #[inline]
    fn slot(&self, corner: Corner, bucket: usize) -> &AtomicU64 {
        &self.counts[corner.index() * self.bucket_count + bucket]
    }

    pub fn increment(&self, corner: Corner, bucket: usize) {
        debug_assert!(bucket < self.bucket_count);
        self.slot(corner, bucket).fetch_add(1, Ordering::Relaxed);
        self.samples[corner.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, corner: Corner) {
        for bucket in 0..self.bucket_count {
            self.slot(corner, bucket).store(0, Ordering::Relaxed);
        }
        self.samples[corner.index()].store(0, Ordering::Relaxed);
    }

    pub fn reset_all(&self) {
        for corner in Corner::ALL {
            self.reset(corner);
        }
    }

    /// Raw bucket counts for one corner. A stale-but-safe snapshot: a loop
    /// may keep incrementing while this reads.
    pub fn counts(&self, corner: Corner) -> Vec<u64> {
        (0..self.bucket_count)
            .map(|bucket| self.slot(corner, bucket).load(Ordering::Relaxed))
            .collect()
    }

    /// Total samples recorded for one corner since the last reset.
    pub fn samples(&self, corner: Corner) -> u64 {
        self.samples[corner.index()].load(Ordering::Relaxed)
    }

    /// Per-mille bucket shares for one corner, written into a fresh buffer
    /// so accumulation continues undisturbed. The extra pseudo-count keeps
    /// the division defined before any sample has landed.
    pub fn normalized(&self, corner: Corner) -> Vec<u32> {
        let counts = self.counts(corner);
        let total: u64 = 1 + counts.iter().sum::<u64>();
        counts
            .iter()
            .map(|&count| (count.saturating_mul(1000) / total) as u32)
            .collect()
    }
}
