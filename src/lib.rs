//! Polling driver for Wii-style extension gamepads on a shared I2C bus.
//!
//! Two pads share one bus behind a digital mux line; the driver alternates
//! between them, decodes each pad's raw status frame into a button bitmask
//! and latches changes into a shared per-port input store. The bus is
//! treated as hot-pluggable and noisy: absent pads, short reads and garbage
//! frames all degrade to "no input this cycle" instead of stalling the
//! caller's loop.

pub mod bus;
pub mod config;
pub mod pad;

pub use bus::{BusError, HardwareBus, PadBus};
pub use config::{ConfigError, DriverConfig, FrameSize};
pub use pad::{
    Buttons, PadDriver, PadError, PadHandle, PadState, PadStateStore, PollOutcome, Port,
};
