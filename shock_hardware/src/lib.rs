#[cfg(feature = "hardware")]
pub mod mcp3008;

pub mod error;

use shock_traits::{PositionSensor, Watchdog};

/// Deterministic simulated damper position source.
///
/// Each channel produces a triangle wave (the damper cycling through its
/// travel) with a small amount of xorshift noise on top, so velocity
/// estimates and histogram shapes look plausible without hardware.
pub struct SimulatedPositionSensor {
    amplitude: i32,
    period_reads: u32,
    step: [u32; 8],
    noise_state: u32,
}

impl SimulatedPositionSensor {
    pub fn new(amplitude_counts: i32, period_reads: u32) -> Self {
        SimulatedPositionSensor {
            amplitude: amplitude_counts.max(1),
            period_reads: period_reads.max(2),
            step: [0; 8],
            noise_state: 0x5EED_5EED,
        }
    }

    fn next_noise(&mut self) -> i32 {
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        // small symmetric noise in [-4, 3] counts
        (x % 8) as i32 - 4
    }
}

impl Default for SimulatedPositionSensor {
    fn default() -> Self {
        // roughly one full compression/rebound cycle per second at 1 kHz
        Self::new(1200, 1000)
    }
}

impl PositionSensor for SimulatedPositionSensor {
    fn read_raw(
        &mut self,
        channel: u8,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let ch = usize::from(channel) % self.step.len();
        let step = self.step[ch];
        self.step[ch] = step.wrapping_add(1);

        let phase = step % self.period_reads;
        let half = self.period_reads / 2;
        let tri = if phase < half {
            (phase as i64 * i64::from(self.amplitude)) / i64::from(half)
        } else {
            ((self.period_reads - phase) as i64 * i64::from(self.amplitude)) / i64::from(half)
        };
        Ok(tri as i32 + self.next_noise())
    }
}

/// Watchdog implementation that only records liveness in the log stream.
///
/// Stands in for a platform task watchdog when running on a desktop; `feed`
/// never fails, so the sampling loops run until cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWatchdog;

impl Watchdog for LogWatchdog {
    fn register(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!("task registered with log watchdog");
        Ok(())
    }

    fn feed(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!("watchdog fed");
        Ok(())
    }
}
