//! Assembly helpers: build and spawn one sampling loop per corner group.

use crate::config::SamplerCfg;
use crate::corner::CornerGroup;
use crate::error::Result;
use crate::sampler::{RateReport, SamplerHandle, build_sampling_loop};
use crate::state::ShockState;
use crossbeam_channel as xch;
use shock_traits::{PositionSensor, Watchdog};
use std::sync::Arc;

/// Spawn a sampling thread for every corner group over the shared state.
///
/// The factories run once per group so each thread owns its own sensor and
/// watchdog handle; corner ownership never overlaps.
pub fn spawn_corner_groups<S, W>(
    shared: &Arc<ShockState>,
    cfg: SamplerCfg,
    mut sensor_for: impl FnMut(CornerGroup) -> S,
    mut watchdog_for: impl FnMut(CornerGroup) -> W,
    diagnostics: Option<xch::Sender<RateReport>>,
) -> Result<Vec<SamplerHandle>>
where
    S: PositionSensor + Send + 'static,
    W: Watchdog + Send + 'static,
{
    let mut handles = Vec::with_capacity(CornerGroup::ALL.len());
    for group in CornerGroup::ALL {
        let sampling_loop = build_sampling_loop(
            group,
            Arc::clone(shared),
            sensor_for(group),
            watchdog_for(group),
            cfg,
            None,
            diagnostics.clone(),
        )?;
        handles.push(SamplerHandle::spawn(sampling_loop));
        tracing::info!(group = group.tag(), "sampling loop started");
    }
    Ok(handles)
}
