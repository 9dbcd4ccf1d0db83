//! Extension pad subsystem.
//!
//! One poll cycle moves through a fixed pipeline, one port at a time:
//!
//! ```text
//! PortSelector ──► liveness probe ──► timed read ──► decode ──► latch
//!      │                │ (fail)                       │ (reject)
//!      ▼                ▼                              ▼
//!   mux pin      throttled reinit                dropped cycle
//! ```
//!
//! Only the latch step touches externally visible state, and only when the
//! decoded buttons actually changed.

pub mod buttons;
pub mod driver;
pub mod frame;
pub mod pad_handle;
pub mod state;

pub use buttons::Buttons;
pub use driver::{
    Closed, DriverState, PadDriver, PollOutcome, PortSelector, ProbeThrottle, Ready,
    Uninitialized,
};
pub use frame::{decode, DecodeError, RawFrame};
pub use pad_handle::{PadError, PadHandle};
pub use state::{PadState, PadStateStore, Port};
