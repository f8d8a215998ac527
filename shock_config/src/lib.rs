#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration parsing for the shock histogram sampler.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration CSV loader fits a linear raw-counts to millimeters model
//!   via ordinary least squares.
use serde::Deserialize;

/// Calibration CSV schema.
///
/// Expected headers:
/// raw,mm
///
/// Example:
/// raw,mm
/// 120,0.0
/// 3980,72.5
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub raw: i64,
    pub mm: f32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct HistogramCfg {
    /// Number of velocity buckets per corner
    pub bucket_count: usize,
    /// Maximum expected absolute shock velocity (mm/s); sets the bucket span
    pub max_speed_mm_s: i32,
}

impl Default for HistogramCfg {
    fn default() -> Self {
        Self {
            bucket_count: 10,
            max_speed_mm_s: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SamplingCfg {
    /// Target sampling rate per corner group (Hz)
    pub rate_hz: u32,
    /// Raw reads averaged into one position sample
    pub multisample_count: u32,
    /// Ticks between sample-rate diagnostic reports
    pub report_interval_ticks: u32,
    /// Log every raw converter read at TRACE level
    pub trace_raw: bool,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            rate_hz: 1000,
            multisample_count: 8,
            report_interval_ticks: 1024,
            trace_raw: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PersistedCalibration {
    /// millimeters of damper travel per raw count
    pub gain_mm_per_count: f32,
    /// raw counts at the zero position
    #[serde(default)]
    pub zero_counts: i32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub histogram: HistogramCfg,
    pub sampling: SamplingCfg,
    /// Optional persisted calibration; preferred at runtime over CSV when present.
    pub calibration: Option<PersistedCalibration>,
    pub logging: Logging,
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.histogram.bucket_count == 0 {
            eyre::bail!("histogram.bucket_count must be > 0");
        }
        if self.histogram.bucket_count > 1024 {
            eyre::bail!("histogram.bucket_count too large (max 1024)");
        }
        if self.histogram.max_speed_mm_s <= 0 {
            eyre::bail!("histogram.max_speed_mm_s must be > 0");
        }
        let span = 2i64 * i64::from(self.histogram.max_speed_mm_s);
        if span < self.histogram.bucket_count as i64 {
            eyre::bail!("histogram span narrower than one count per bucket");
        }
        if self.sampling.multisample_count == 0 {
            eyre::bail!("sampling.multisample_count must be > 0");
        }
        if self.sampling.multisample_count > 64 {
            eyre::bail!("sampling.multisample_count too large (max 64)");
        }
        if self.sampling.report_interval_ticks == 0 {
            eyre::bail!("sampling.report_interval_ticks must be > 0");
        }
        if let Some(cal) = &self.calibration {
            if !cal.gain_mm_per_count.is_finite() || cal.gain_mm_per_count <= 0.0 {
                eyre::bail!("calibration.gain_mm_per_count must be finite and > 0");
            }
        }
        Ok(())
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Linear position calibration fitted from CSV rows.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    /// millimeters per raw count
    pub gain_mm_per_count: f32,
    /// raw counts where travel reads 0 mm
    pub zero_counts: i32,
}

impl From<PersistedCalibration> for Calibration {
    fn from(p: PersistedCalibration) -> Self {
        Calibration {
            gain_mm_per_count: p.gain_mm_per_count,
            zero_counts: p.zero_counts,
        }
    }
}

impl Calibration {
    /// Build a Calibration from CSV rows using ordinary least squares.
    /// Fits mm = a*raw + b, then converts to mm = a*(raw - zero_counts)
    /// where zero_counts = round(-b/a).
    pub fn from_rows(rows: &[CalibrationRow]) -> eyre::Result<Self> {
        if rows.len() < 2 {
            eyre::bail!("calibration requires at least two rows, got {}", rows.len());
        }
        for pair in rows.windows(2) {
            if pair[1].raw == pair[0].raw {
                eyre::bail!("calibration rows have duplicate raw value {}", pair[0].raw);
            }
        }

        let n = rows.len() as f64;
        let mean_x: f64 = rows.iter().map(|r| r.raw as f64).sum::<f64>() / n;
        let mean_y: f64 = rows.iter().map(|r| f64::from(r.mm)).sum::<f64>() / n;
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for r in rows {
            let x = r.raw as f64 - mean_x;
            let y = f64::from(r.mm) - mean_y;
            sxx += x * x;
            sxy += x * y;
        }
        if !sxx.is_finite() || sxx == 0.0 {
            eyre::bail!("calibration cannot determine slope (degenerate raw variance)");
        }
        let a = sxy / sxx;
        if !a.is_finite() || a == 0.0 {
            eyre::bail!("calibration produced an unusable slope");
        }
        let b = mean_y - a * mean_x;

        let zero = -b / a;
        if !zero.is_finite() {
            eyre::bail!("calibration produced an invalid zero position");
        }

        Ok(Calibration {
            gain_mm_per_count: a as f32,
            zero_counts: zero.round() as i32,
        })
    }

    /// Load and fit a calibration CSV with the strict `raw,mm` header.
    pub fn from_csv_path(path: &std::path::Path) -> eyre::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| eyre::eyre!("opening calibration csv: {e}"))?;

        let headers = rdr
            .headers()
            .map_err(|e| eyre::eyre!("reading calibration headers: {e}"))?;
        if headers.len() < 2 || &headers[0] != "raw" || &headers[1] != "mm" {
            eyre::bail!("calibration csv must have headers: raw,mm");
        }

        let mut rows = Vec::new();
        for rec in rdr.deserialize::<CalibrationRow>() {
            rows.push(rec.map_err(|e| eyre::eyre!("parsing calibration row: {e}"))?);
        }
        Self::from_rows(&rows)
    }
}
