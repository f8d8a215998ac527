//! shockhist: capture per-wheel shock velocity histograms.

mod cli;
mod rt;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use eyre::{Result, WrapErr};
#[cfg(feature = "hardware")]
use shock_core::{CornerGroup, build_sampling_loop};
#[cfg(not(feature = "hardware"))]
use shock_core::runner;
use shock_core::{
    CancelToken, Corner, DiagnosticsSender, PositionCalibration, RateReport, SamplerCfg,
    SamplerHandle, ShockState, diagnostics_channel,
};
use shock_hardware::LogWatchdog;
use shock_traits::PositionSensor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let (config, config_found) = load_config(&args.config)?;
    init_tracing(&args.log_level, args.json, &config.logging);
    if !config_found {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
    }

    match &args.cmd {
        Commands::Run {
            duration_ms,
            snapshot,
            paused,
            print_every_s,
            rt,
            rt_prio,
        } => {
            let calibration = resolve_calibration(&args, &config)?;
            run_capture(
                &config,
                calibration,
                *duration_ms,
                snapshot.clone(),
                *paused,
                *print_every_s,
                *rt,
                *rt_prio,
            )
        }
        Commands::SelfCheck => self_check(),
    }
}

fn load_config(path: &Path) -> Result<(shock_config::Config, bool)> {
    if !path.exists() {
        return Ok((shock_config::Config::default(), false));
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    let config: shock_config::Config =
        toml::from_str(&text).wrap_err_with(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .wrap_err_with(|| format!("validating config {}", path.display()))?;
    Ok((config, true))
}

fn init_tracing(level: &str, json: bool, logging: &shock_config::Logging) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path.file_name().map_or_else(
            || std::ffi::OsString::from("shockhist.log"),
            |n| n.to_os_string(),
        );
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
    }
}

/// Persisted calibration from the config wins; a CSV fit is the fallback.
fn resolve_calibration(args: &Cli, config: &shock_config::Config) -> Result<PositionCalibration> {
    if let Some(persisted) = config.calibration {
        tracing::info!(
            gain = persisted.gain_mm_per_count,
            zero = persisted.zero_counts,
            "using calibration from config"
        );
        return Ok(persisted.into());
    }
    if let Some(path) = &args.calibration {
        let cal =
            shock_config::Calibration::from_csv_path(path).wrap_err("loading calibration csv")?;
        tracing::info!(
            gain = cal.gain_mm_per_count,
            zero = cal.zero_counts,
            "using calibration fitted from csv"
        );
        return Ok(cal.into());
    }
    tracing::info!("no calibration provided, using defaults");
    Ok(PositionCalibration::default())
}

#[cfg(feature = "hardware")]
const SPI_CLOCK_HZ: u32 = 1_350_000;

#[cfg(feature = "hardware")]
fn spawn_loops(
    shared: &Arc<ShockState>,
    cfg: SamplerCfg,
    diag_tx: DiagnosticsSender,
) -> Result<Vec<SamplerHandle>> {
    let mut handles = Vec::new();
    for group in CornerGroup::ALL {
        let sensor = shock_hardware::mcp3008::Mcp3008::new(SPI_CLOCK_HZ)
            .map_err(|e| eyre::eyre!("opening spi adc for {group}: {e}"))?;
        let sampling_loop = build_sampling_loop(
            group,
            Arc::clone(shared),
            sensor,
            LogWatchdog,
            cfg,
            None,
            Some(diag_tx.clone()),
        )?;
        handles.push(SamplerHandle::spawn(sampling_loop));
        tracing::info!(group = group.tag(), "sampling loop started");
    }
    Ok(handles)
}

#[cfg(not(feature = "hardware"))]
fn spawn_loops(
    shared: &Arc<ShockState>,
    cfg: SamplerCfg,
    diag_tx: DiagnosticsSender,
) -> Result<Vec<SamplerHandle>> {
    runner::spawn_corner_groups(
        shared,
        cfg,
        |_| shock_hardware::SimulatedPositionSensor::default(),
        |_| LogWatchdog,
        Some(diag_tx),
    )
}

#[allow(clippy::too_many_arguments)]
fn run_capture(
    config: &shock_config::Config,
    calibration: PositionCalibration,
    duration_ms: Option<u64>,
    snapshot: Option<PathBuf>,
    paused: bool,
    print_every_s: u64,
    rt: bool,
    rt_prio: Option<i32>,
) -> Result<()> {
    rt::setup_rt_once(rt, rt_prio);

    let sampler_cfg = SamplerCfg::from_config(config)
        .validated()
        .map_err(eyre::Report::new)?;
    let shared = Arc::new(ShockState::new(&sampler_cfg, calibration));
    if paused {
        shared.set_recording(false);
        tracing::info!("starting paused; histograms reset on resume");
    }

    let (diag_tx, diag_rx) = diagnostics_channel();
    let handles = spawn_loops(&shared, sampler_cfg, diag_tx)?;

    let stop = CancelToken::new();
    let stop_for_signal = stop.clone();
    ctrlc::set_handler(move || stop_for_signal.cancel()).wrap_err("installing signal handler")?;

    let started = Instant::now();
    let mut last_print = Instant::now();
    while !stop.is_cancelled() {
        if let Some(ms) = duration_ms
            && started.elapsed() >= Duration::from_millis(ms)
        {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
        while let Ok(report) = diag_rx.try_recv() {
            log_rate_report(&report);
        }
        if print_every_s > 0 && last_print.elapsed() >= Duration::from_secs(print_every_s) {
            print_histograms(&shared);
            last_print = Instant::now();
        }
    }

    for handle in handles {
        handle.join()?;
    }

    if let Some(path) = snapshot {
        write_snapshot(&shared, &sampler_cfg, &path)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn log_rate_report(report: &RateReport) {
    tracing::info!(
        group = report.group.tag(),
        rate_hz = report.rate_hz,
        overruns = report.overruns,
        positions_mm = ?report.positions_mm,
        "loop rate"
    );
}

fn print_histograms(shared: &ShockState) {
    for corner in Corner::ALL {
        println!(
            "{:>11}  pos {:>5} mm  {:>9} samples  {:?}",
            corner.to_string(),
            shared.position_mm(corner),
            shared.samples(corner),
            shared.normalized_histogram(corner),
        );
    }
}

fn write_snapshot(shared: &ShockState, cfg: &SamplerCfg, path: &Path) -> Result<()> {
    use serde_json::json;

    let mut corners = serde_json::Map::new();
    for corner in Corner::ALL {
        corners.insert(
            corner.to_string(),
            json!({
                "position_mm": shared.position_mm(corner),
                "samples": shared.samples(corner),
                "counts": shared.raw_histogram(corner),
                "per_mille": shared.normalized_histogram(corner),
            }),
        );
    }
    let doc = json!({
        "bucket_count": cfg.bucket_count,
        "max_speed_mm_s": cfg.max_speed_mm_s,
        "recording": shared.recording(),
        "corners": corners,
    });
    let bytes = serde_json::to_vec_pretty(&doc).wrap_err("serializing snapshot")?;
    std::fs::write(path, bytes)
        .wrap_err_with(|| format!("writing snapshot {}", path.display()))?;
    Ok(())
}

fn self_check() -> Result<()> {
    #[cfg(feature = "hardware")]
    let mut sensor = shock_hardware::mcp3008::Mcp3008::new(SPI_CLOCK_HZ)
        .map_err(|e| eyre::eyre!("opening spi adc: {e}"))?;
    #[cfg(not(feature = "hardware"))]
    let mut sensor = shock_hardware::SimulatedPositionSensor::default();

    for corner in Corner::ALL {
        let raw = sensor
            .read_raw(corner.channel())
            .map_err(|e| eyre::eyre!("sensor check failed on {corner}: {e}"))?;
        tracing::debug!(corner = %corner, raw, "self-check read");
    }
    println!("self-check ok");
    Ok(())
}
