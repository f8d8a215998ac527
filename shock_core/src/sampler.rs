//! Periodic per-corner-group sampling loops.
//!
//! Each loop owns a disjoint pair of corners and drives the whole chain for
//! them: multisampled position acquisition, velocity estimation, bucket
//! increment, shared position update, and watchdog liveness. Pausing is
//! purely flag-driven; the underlying loop never stops until cancelled.

use crate::config::SamplerCfg;
use crate::corner::{CORNER_COUNT, Corner, CornerGroup};
use crate::error::{Result, ShockError};
use crate::state::ShockState;
use crate::velocity::{Baseline, shock_velocity_mm_s};
use crossbeam_channel as xch;
use eyre::WrapErr;
use shock_traits::clock::{Clock, MonotonicClock};
use shock_traits::{PositionSensor, Watchdog};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cooperative stop signal shared between a loop and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Periodic diagnostics emitted once per report interval.
#[derive(Debug, Clone, Copy)]
pub struct RateReport {
    pub group: CornerGroup,
    /// Achieved sampling rate over the last interval
    pub rate_hz: f32,
    /// Last known positions for all corners, in millimeters
    pub positions_mm: [i32; CORNER_COUNT],
    /// Ticks whose work outlasted the tick interval
    pub overruns: u32,
}

pub type DiagnosticsSender = xch::Sender<RateReport>;
pub type DiagnosticsReceiver = xch::Receiver<RateReport>;

/// Latest-wins channel for `RateReport`s. The sender side never blocks a
/// sampling loop; an unread report is simply replaced.
pub fn diagnostics_channel() -> (DiagnosticsSender, DiagnosticsReceiver) {
    xch::bounded(1)
}

pub struct SamplingLoop<S: PositionSensor, W: Watchdog> {
    group: CornerGroup,
    shared: Arc<ShockState>,
    sensor: S,
    watchdog: W,
    cfg: SamplerCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    tick_interval: Duration,
    baselines: [Option<Baseline>; CORNER_COUNT],
    last_raw: [Option<i32>; CORNER_COUNT],
    pending_reset: bool,
    ticks_since_report: u32,
    report_epoch_us: u64,
    overruns: u32,
    diag_tx: Option<xch::Sender<RateReport>>,
}

/// Validate the config and assemble a loop for one corner group.
pub fn build_sampling_loop<S, W>(
    group: CornerGroup,
    shared: Arc<ShockState>,
    sensor: S,
    watchdog: W,
    cfg: SamplerCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    diagnostics: Option<xch::Sender<RateReport>>,
) -> Result<SamplingLoop<S, W>>
where
    S: PositionSensor,
    W: Watchdog,
{
    let cfg = cfg.validated().map_err(eyre::Report::new)?;
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();
    Ok(SamplingLoop {
        group,
        shared,
        sensor,
        watchdog,
        cfg,
        clock,
        epoch,
        tick_interval: Duration::from_micros(cfg.tick_interval_us),
        baselines: [None; CORNER_COUNT],
        last_raw: [None; CORNER_COUNT],
        pending_reset: false,
        ticks_since_report: 0,
        report_epoch_us: 0,
        overruns: 0,
        diag_tx: diagnostics,
    })
}

impl<S: PositionSensor, W: Watchdog> SamplingLoop<S, W> {
    pub fn group(&self) -> CornerGroup {
        self.group
    }

    /// One iteration of the sampling loop.
    ///
    /// Recoverable conditions are handled here; the only error that crosses
    /// this boundary is a failed watchdog feed, which the loop cannot
    /// outlive anyway.
    pub fn tick(&mut self) -> Result<()> {
        if !self.shared.recording() {
            self.feed_watchdog()?;
            // resuming later must start a fresh histogram, not mix sessions
            self.pending_reset = true;
            return Ok(());
        }

        if self.pending_reset {
            for &corner in self.group.corners() {
                self.shared.histograms().reset(corner);
            }
            self.pending_reset = false;
        }

        for &corner in self.group.corners() {
            self.sample_corner(corner)?;
            self.feed_watchdog()?;
        }
        self.maybe_report();
        Ok(())
    }

    /// Acquire one noise-reduced sample for `corner` and fold it into the
    /// histogram.
    fn sample_corner(&mut self, corner: Corner) -> Result<()> {
        let idx = corner.index();
        let mut acc: i64 = 0;
        let mut contributions: u32 = 0;
        for _ in 0..self.cfg.multisample_count {
            match self.sensor.read_raw(corner.channel()) {
                Ok(raw) => {
                    if self.cfg.trace_raw {
                        let t_us = self.clock.us_since(self.epoch);
                        tracing::trace!(corner = %corner, raw, t_us, "raw read");
                    }
                    self.last_raw[idx] = Some(raw);
                    acc += i64::from(raw);
                    contributions += 1;
                }
                Err(e) => {
                    tracing::warn!(corner = %corner, error = %e, "transient read failure");
                    if let Some(prev) = self.last_raw[idx] {
                        acc += i64::from(prev);
                        contributions += 1;
                    }
                }
            }
            // the multisample burst alone can outlast a watchdog period
            self.feed_watchdog()?;
        }
        if contributions == 0 {
            tracing::warn!(corner = %corner, "no usable readings, sample skipped");
            return Ok(());
        }
        let position = (acc / i64::from(contributions)) as i32;
        let timestamp_us = self.clock.us_since(self.epoch);

        match self.baselines[idx] {
            None => {
                // first reading only establishes the reference point
                self.baselines[idx] = Some(Baseline {
                    position,
                    timestamp_us,
                });
                self.shared.record_position(corner, position);
            }
            Some(prev) => {
                let Some(velocity) =
                    shock_velocity_mm_s(self.shared.calibration(), prev, position, timestamp_us)
                else {
                    tracing::debug!(corner = %corner, "non-advancing timestamp, sample dropped");
                    return Ok(());
                };
                let bucket = self.shared.buckets().bucket_for(velocity);
                self.shared.histograms().increment(corner, bucket);
                self.baselines[idx] = Some(Baseline {
                    position,
                    timestamp_us,
                });
                self.shared.record_position(corner, position);
            }
        }
        Ok(())
    }

    fn feed_watchdog(&self) -> Result<()> {
        self.watchdog
            .feed()
            .map_err(|e| eyre::Report::new(ShockError::Watchdog(e.to_string())))
            .wrap_err("watchdog feed")
    }

    fn maybe_report(&mut self) {
        self.ticks_since_report += 1;
        if self.ticks_since_report < self.cfg.report_interval_ticks {
            return;
        }
        let now_us = self.clock.us_since(self.epoch);
        let elapsed_us = now_us.saturating_sub(self.report_epoch_us);
        let rate_hz = if elapsed_us == 0 {
            0.0
        } else {
            self.ticks_since_report as f32 * 1_000_000.0 / elapsed_us as f32
        };
        let positions_mm = self.shared.positions_mm();
        tracing::info!(
            group = self.group.tag(),
            rate_hz,
            ?positions_mm,
            overruns = self.overruns,
            "sampling rate"
        );
        if let Some(tx) = &self.diag_tx {
            let _ = tx.try_send(RateReport {
                group: self.group,
                rate_hz,
                positions_mm,
                overruns: self.overruns,
            });
        }
        self.ticks_since_report = 0;
        self.overruns = 0;
        self.report_epoch_us = now_us;
    }

    /// Run until cancelled. Registers with the watchdog once, then sleeps
    /// and ticks forever. A watchdog feed failure ends the loop; the
    /// external watchdog takes it from there.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<()> {
        self.watchdog
            .register()
            .map_err(|e| eyre::Report::new(ShockError::Watchdog(e.to_string())))
            .wrap_err("watchdog register")?;
        while !cancel.is_cancelled() {
            self.clock.sleep(self.tick_interval);
            let started = self.clock.now();
            self.tick()?;
            if self.clock.us_since(started) > self.cfg.tick_interval_us {
                self.overruns = self.overruns.saturating_add(1);
            }
        }
        tracing::debug!(group = self.group.tag(), "sampling loop cancelled");
        Ok(())
    }
}

/// Owns a sampling-loop thread; cancels and joins it on drop so neither
/// tests nor the binary can leak a sampler.
pub struct SamplerHandle {
    group: CornerGroup,
    cancel: CancelToken,
    join_handle: Option<std::thread::JoinHandle<Result<()>>>,
}

impl SamplerHandle {
    pub fn spawn<S, W>(mut sampling_loop: SamplingLoop<S, W>) -> Self
    where
        S: PositionSensor + Send + 'static,
        W: Watchdog + Send + 'static,
    {
        let group = sampling_loop.group();
        let cancel = CancelToken::new();
        let cancel_clone = cancel.clone();
        let join_handle = std::thread::spawn(move || sampling_loop.run(&cancel_clone));
        Self {
            group,
            cancel,
            join_handle: Some(join_handle),
        }
    }

    pub fn group(&self) -> CornerGroup {
        self.group
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the loop, surfacing its final result.
    pub fn join(mut self) -> Result<()> {
        self.cancel.cancel();
        match self.join_handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(eyre::eyre!("sampling thread panicked"))),
            None => Ok(()),
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(Ok(())) => {
                    tracing::trace!(group = self.group.tag(), "sampling thread joined");
                }
                Ok(Err(e)) => {
                    tracing::error!(group = self.group.tag(), error = %e, "sampling loop exited with error");
                }
                Err(e) => {
                    tracing::warn!(?e, "sampling thread panicked during shutdown");
                }
            }
        }
    }
}
