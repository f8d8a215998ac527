#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Per-wheel shock velocity histogram engine (hardware-agnostic).
//!
//! This crate samples damper position sensors through the
//! `shock_traits::PositionSensor` seam and accumulates per-corner velocity
//! histograms. All hardware interactions go through traits.
//!
//! ## Architecture
//!
//! - **Corners**: fixed four-wheel enumeration, partitioned into front/rear
//!   groups (`corner` module)
//! - **Velocity**: linear raw→mm calibration and finite-difference velocity
//!   estimation (`velocity` module)
//! - **Histogram**: bucket mapping, relaxed-atomic accumulation, per-mille
//!   normalization (`histogram` module)
//! - **State**: shared read/control surface consumed by displays (`state`)
//! - **Sampling**: the periodic per-group loop with pause/resume/reset and
//!   watchdog liveness (`sampler`, `runner`)
//!
//! ## Integer hot path
//!
//! Positions are raw converter counts (`i32`), timestamps are microseconds
//! since the loop epoch (`u64`), velocities are mm/s (`i32`). The gain is
//! quantized to micrometers per count once at construction so no float math
//! runs per sample.

pub mod config;
pub mod corner;
pub mod error;
pub mod histogram;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod state;
pub mod util;
pub mod velocity;

pub use config::SamplerCfg;
pub use corner::{CORNER_COUNT, Corner, CornerGroup};
pub use histogram::{BucketMap, HistogramBank};
pub use sampler::{
    CancelToken, DiagnosticsReceiver, DiagnosticsSender, RateReport, SamplerHandle, SamplingLoop,
    build_sampling_loop, diagnostics_channel,
};
pub use state::ShockState;
pub use velocity::{Baseline, PositionCalibration, shock_velocity_mm_s};
