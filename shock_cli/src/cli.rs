//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "shockhist", version, about = "Per-wheel shock velocity histograms")]
pub struct Cli {
    /// Path to config TOML (built-in defaults are used when the file is absent)
    #[arg(long, value_name = "FILE", default_value = "etc/shockhist.toml")]
    pub config: PathBuf,

    /// Optional calibration CSV (strict raw,mm header)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture shock velocity histograms until interrupted
    Run {
        /// Stop after this many milliseconds (runs until Ctrl-C when absent)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,

        /// Write a JSON snapshot of the histograms on exit
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,

        /// Start with recording disabled
        #[arg(long, action = ArgAction::SetTrue)]
        paused: bool,

        /// Seconds between console histogram prints (0 disables)
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        print_every_s: u64,

        /// Enable real-time scheduling (SCHED_FIFO + mlockall, Linux only)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux: attempts SCHED_FIFO priority and locks the process address space with mlockall to reduce sampling jitter. May require elevated privileges (CAP_SYS_NICE / memlock ulimit)."
        )]
        rt: bool,

        /// SCHED_FIFO priority when --rt is enabled (1..=max)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Quick health check (sensor presence / sim ok)
    SelfCheck,
}
