//! Polling/decode state machine for two multiplexed extension pads.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──open()──► Ready ──close()──► Closed
//!                             │ ▲
//!                             ▼ │
//!                        poll() cycles
//! ```
//!
//! `open()` wakes both pads once, unconditionally. Every `poll()` handles
//! exactly one port (the mux needs settle time after switching, so the two
//! ports are never read in the same call) and reports what happened as a
//! [`PollOutcome`]. A pad that stops acknowledging the liveness probe gets
//! its init sequences resent, but only once every `reinit_interval` failed
//! cycles so an empty port does not flood the bus or add latency to the
//! caller's loop.

use crate::bus::{BusError, PadBus};
use crate::config::DriverConfig;
use crate::pad::buttons::Buttons;
use crate::pad::frame::{decode, DecodeError, RawFrame, MAX_FRAME_LEN};
use crate::pad::state::{PadStateStore, Port};
use statum::{machine, state};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

const INIT_TIMEOUT: Duration = Duration::from_micros(400);
const INIT_SETTLE: Duration = Duration::from_micros(400);
const PROBE_TIMEOUT: Duration = Duration::from_micros(400);
const PROBE_SETTLE: Duration = Duration::from_micros(200);
const READ_TIMEOUT: Duration = Duration::from_micros(1000);

/// Single-command wake sequence older pads expect.
const INIT_LEGACY: [u8; 2] = [0x40, 0x00];
/// Two-command handshake; leaves the pad's data stream unencrypted.
const INIT_HANDSHAKE: [u8; 2] = [0xf0, 0x55];
const INIT_DATA_FORMAT: [u8; 2] = [0xfb, 0x00];

/// Limits how often a failed probe may trigger re-initialization.
///
/// Probing an empty port fails fast, but the init sequences are several
/// writes plus settle pauses. One attempt per `interval` failed cycles
/// keeps the bus quiet and bounds the latency an absent pad adds.
#[derive(Debug)]
pub struct ProbeThrottle {
    interval: u32,
    count: u32,
}

impl ProbeThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            count: 0,
        }
    }

    /// Counts one failed cycle; true when a reinit attempt is due.
    pub fn admit(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.interval {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

/// Alternates between the two pad positions, one per poll call.
#[derive(Debug)]
pub struct PortSelector {
    current: Port,
}

impl PortSelector {
    pub fn new(start: Port) -> Self {
        Self { current: start }
    }

    /// Steps to the other port and returns it. Strict 0,1,0,1 rotation,
    /// no skipping.
    pub fn advance(&mut self) -> Port {
        self.current = self.current.other();
        self.current
    }

    pub fn current(&self) -> Port {
        self.current
    }
}

/// What one poll cycle did, for one port.
///
/// None of these are errors from the caller's point of view: a flaky,
/// corrupt or absent pad degrades to "no input this cycle" and the next
/// poll simply retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fresh state decoded and written to the shared store.
    Updated { port: Port, buttons: Buttons },
    /// Pad answered but reported the same state as last time; the shared
    /// slot was left alone.
    Unchanged(Port),
    /// Liveness probe not acknowledged. `reinit` tells whether this cycle
    /// was allowed to resend the init sequences.
    Absent { port: Port, reinit: bool },
    /// Pad acknowledged the probe but the status read came back short.
    ShortRead(Port),
    /// Frame decoded to the impossible all-buttons state.
    Rejected(Port),
}

#[state]
#[derive(Debug, Clone)]
pub enum DriverState {
    Uninitialized,
    Ready,
    Closed,
}

/// The pad driver, generic over its lifecycle state.
///
/// All mutable driver state (port rotation, per-port latches, reinit
/// throttle) lives on the instance, so several independent drivers can
/// coexist and tests can run against a scripted bus.
#[machine]
pub struct PadDriver<S: DriverState> {
    bus: Box<dyn PadBus>,
    config: DriverConfig,
    selector: PortSelector,
    throttle: ProbeThrottle,
    latch: [Buttons; 2],
}

impl PadDriver<Uninitialized> {
    pub fn create(bus: Box<dyn PadBus>, config: DriverConfig) -> Self {
        let throttle = ProbeThrottle::new(config.reinit_interval);
        // Selector starts on port 1 so the first poll lands on port 0.
        Self::new(
            bus,
            config,
            PortSelector::new(Port::One),
            throttle,
            [Buttons::NONE; 2],
        )
    }

    /// Wakes both pads and transitions to Ready.
    ///
    /// Init failures are logged and tolerated; a pad that is missing now
    /// gets picked up later through the throttled reinit path.
    pub fn open(mut self) -> Result<PadDriver<Ready>, BusError> {
        for port in [Port::Zero, Port::One] {
            self.bus.set_mux(port.mux_level());
            if let Err(e) = self.init_extension() {
                warn!("pad init failed on port {}: {}", port.index(), e);
            }
        }
        info!(
            "pad driver ready (frame size {}, legacy init {}, standard init {})",
            self.config.frame_size.len(),
            self.config.legacy_init,
            self.config.standard_init,
        );
        Ok(self.transition())
    }
}

impl PadDriver<Ready> {
    /// Runs one poll cycle for the next port in the rotation.
    pub fn poll(&mut self, store: &mut PadStateStore) -> PollOutcome {
        let port = self.selector.advance();
        self.bus.set_mux(port.mux_level());

        // Liveness probe; an unplugged pad fails here and nothing else
        // happens this cycle.
        let probe = [0u8];
        let alive = matches!(
            self.bus.write(self.config.device_address, &probe, PROBE_TIMEOUT),
            Ok(1)
        );
        if !alive {
            let reinit = self.throttle.admit();
            if reinit {
                debug!("pad {} absent, resending init sequences", port.index());
                if let Err(e) = self.init_extension() {
                    debug!("pad {} reinit failed: {}", port.index(), e);
                }
            }
            return PollOutcome::Absent { port, reinit };
        }

        self.bus.settle(PROBE_SETTLE);

        let mut raw = [0u8; MAX_FRAME_LEN];
        let wanted = self.config.frame_size.len();
        let got = self
            .bus
            .read(self.config.device_address, &mut raw[..wanted], READ_TIMEOUT)
            .unwrap_or(0);
        if got != wanted {
            trace!("pad {} short read ({got}/{wanted} bytes)", port.index());
            return PollOutcome::ShortRead(port);
        }

        let buttons = match decode(&RawFrame::new(&raw[..wanted])) {
            Ok(buttons) => buttons,
            Err(DecodeError::CorruptFrame) => {
                debug!("pad {} frame rejected as corrupt", port.index());
                return PollOutcome::Rejected(port);
            }
        };

        self.apply(port, buttons, store)
    }

    /// Change-only latch into the shared store.
    ///
    /// An unchanged pad must not rewrite its slot: other drivers share the
    /// store, and redundant writes would clobber state they may have set.
    /// Each port only ever touches its own slot.
    fn apply(&mut self, port: Port, buttons: Buttons, store: &mut PadStateStore) -> PollOutcome {
        if self.latch[port.index()] == buttons {
            return PollOutcome::Unchanged(port);
        }
        self.latch[port.index()] = buttons;
        store.port_state_mut(port).buttons = buttons;
        debug!("pad {} -> {:?}", port.index(), buttons);
        PollOutcome::Updated { port, buttons }
    }

    /// Releases the bus and transitions to Closed. The only terminal
    /// action; never taken automatically.
    pub fn close(mut self) -> Result<PadDriver<Closed>, BusError> {
        self.bus.teardown()?;
        info!("pad driver closed");
        Ok(self.transition())
    }
}

impl<S: DriverState> PadDriver<S> {
    /// Sends the enabled wake/configuration sequences to whichever port
    /// the mux currently selects. Best effort: the first failed write
    /// aborts the remaining steps and the caller retries on a later
    /// throttled cycle.
    fn init_extension(&mut self) -> Result<(), BusError> {
        if self.config.legacy_init {
            self.write_init(&INIT_LEGACY)?;
        }
        if self.config.standard_init {
            self.write_init(&INIT_HANDSHAKE)?;
            self.write_init(&INIT_DATA_FORMAT)?;
        }
        Ok(())
    }

    fn write_init(&mut self, command: &[u8; 2]) -> Result<(), BusError> {
        let written = self
            .bus
            .write(self.config.device_address, command, INIT_TIMEOUT)?;
        if written != command.len() {
            return Err(BusError::ShortWrite {
                written,
                expected: command.len(),
            });
        }
        self.bus.settle(INIT_SETTLE);
        Ok(())
    }
}
