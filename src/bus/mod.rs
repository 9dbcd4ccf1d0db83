//! Bus transport abstraction.
//!
//! The protocol core only needs timed write/read primitives, the mux line
//! and a settle pause. Keeping those behind a trait lets the driver run
//! against the rppal-backed [`HardwareBus`] on a Raspberry Pi and against a
//! scripted mock in tests.

pub mod hardware;

pub use hardware::HardwareBus;

use std::time::Duration;

/// Transport errors.
///
/// Probe failures on an unplugged pad are expected traffic and are handled
/// by the driver; these errors only carry diagnostics for init and setup
/// paths.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus setup failed: {0}")]
    Setup(String),

    #[error("i2c transfer failed: {0}")]
    Transfer(String),

    #[error("short write ({written}/{expected} bytes)")]
    ShortWrite { written: usize, expected: usize },
}

/// Two-wire bus with a port mux line, as seen by the pad driver.
///
/// All operations are bounded: transfers by `timeout`, pauses by `period`.
/// That bound is the driver's only backpressure mechanism against a wedged
/// or missing pad, so implementations must never block indefinitely.
pub trait PadBus: Send {
    /// Writes `bytes` to the device at `addr`, returning how many bytes
    /// were acknowledged. An absent device may surface as an error or as a
    /// short count; callers treat both the same way.
    fn write(&mut self, addr: u8, bytes: &[u8], timeout: Duration) -> Result<usize, BusError>;

    /// Reads into `buf` from the device at `addr`, returning how many
    /// bytes actually arrived.
    fn read(&mut self, addr: u8, buf: &mut [u8], timeout: Duration) -> Result<usize, BusError>;

    /// Drives the port mux line to `level`.
    fn set_mux(&mut self, level: bool);

    /// Blocks for one settle period (mux switching, pad response setup).
    fn settle(&self, period: Duration);

    /// Releases the bus and returns the pins to their reset state.
    fn teardown(&mut self) -> Result<(), BusError>;
}
