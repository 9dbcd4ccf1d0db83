//! Raspberry Pi bus backend built on rppal.

use super::{BusError, PadBus};
use crate::config::DriverConfig;
use rppal::gpio::{Gpio, OutputPin};
use rppal::i2c::I2c;
use std::time::Duration;
use tracing::{debug, info};

/// rppal-backed implementation of [`PadBus`].
///
/// Transfers go through the kernel i2c-dev interface, which bounds each
/// transaction on its own; the per-call timeouts of the trait are satisfied
/// by that bound rather than enforced here. The bus clock is fixed by
/// firmware config on the Pi, so `bus_frequency_hz` is logged for the
/// operator but not enforced either.
pub struct HardwareBus {
    i2c: I2c,
    mux: OutputPin,
}

impl HardwareBus {
    /// Opens the default i2c bus and claims the mux pin as a low output.
    pub fn open(config: &DriverConfig) -> Result<Self, BusError> {
        let i2c = I2c::new().map_err(|e| BusError::Setup(format!("i2c open failed: {e}")))?;

        let gpio = Gpio::new().map_err(|e| BusError::Setup(format!("gpio open failed: {e}")))?;
        let mux = gpio
            .get(config.mux_pin)
            .map_err(|e| BusError::Setup(format!("mux pin {} unavailable: {e}", config.mux_pin)))?
            .into_output_low();

        info!(
            "i2c bus open: device 0x{:02x}, mux pin {}, nominal clock {} Hz",
            config.device_address, config.mux_pin, config.bus_frequency_hz
        );
        Ok(Self { i2c, mux })
    }

    fn select(&mut self, addr: u8) -> Result<(), BusError> {
        self.i2c
            .set_slave_address(addr as u16)
            .map_err(|e| BusError::Transfer(format!("address 0x{addr:02x} rejected: {e}")))
    }
}

impl PadBus for HardwareBus {
    fn write(&mut self, addr: u8, bytes: &[u8], _timeout: Duration) -> Result<usize, BusError> {
        self.select(addr)?;
        self.i2c
            .write(bytes)
            .map_err(|e| BusError::Transfer(e.to_string()))
    }

    fn read(&mut self, addr: u8, buf: &mut [u8], _timeout: Duration) -> Result<usize, BusError> {
        self.select(addr)?;
        self.i2c
            .read(buf)
            .map_err(|e| BusError::Transfer(e.to_string()))
    }

    fn set_mux(&mut self, level: bool) {
        if level {
            self.mux.set_high();
        } else {
            self.mux.set_low();
        }
    }

    fn settle(&self, period: Duration) {
        std::thread::sleep(period);
    }

    fn teardown(&mut self) -> Result<(), BusError> {
        // rppal closes the i2c handle and resets the pin mode on drop;
        // park the mux line low so a later open starts from port 0.
        self.mux.set_low();
        debug!("bus released, mux parked low");
        Ok(())
    }
}
