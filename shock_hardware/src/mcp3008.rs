//! MCP3008 SPI ADC reader (Linux / rppal).

use crate::error::HwError;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use shock_traits::PositionSensor;

/// 10-bit SPI ADC commonly wired to linear damper potentiometers.
pub struct Mcp3008 {
    spi: Spi,
}

impl Mcp3008 {
    pub fn new(clock_hz: u32) -> Result<Self, HwError> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Mcp3008 { spi })
    }

    fn convert(&mut self, channel: u8) -> Result<i32, HwError> {
        // single-ended conversion: start bit, SGL/DIFF=1, 3-bit channel
        let tx = [0x01, (0x08 | (channel & 0x07)) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok((i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2]))
    }
}

impl PositionSensor for Mcp3008 {
    fn read_raw(
        &mut self,
        channel: u8,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        if channel > 7 {
            return Err(Box::new(HwError::Busy(format!(
                "channel {channel} out of range for mcp3008"
            ))));
        }
        match self.convert(channel) {
            Ok(raw) => {
                tracing::trace!(channel, raw, "mcp3008 sample");
                Ok(raw)
            }
            Err(e) => {
                tracing::error!(channel, error = %e, "mcp3008 read failed");
                Err(Box::new(e))
            }
        }
    }
}
