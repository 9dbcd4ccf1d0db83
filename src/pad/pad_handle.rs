//! Background polling task and its public handle.
//!
//! The driver itself is synchronous and single-threaded; this wraps it in a
//! tokio task that ticks at the configured interval and publishes state
//! snapshots through a watch channel whenever a poll produced fresh input.

use crate::bus::{BusError, PadBus};
use crate::config::DriverConfig;
use crate::pad::driver::{PadDriver, PollOutcome};
use crate::pad::state::PadStateStore;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PadError {
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error("pad task error: {0}")]
    Task(String),
}

/// Handle for the pad polling task.
///
/// Owns the driver lifecycle: `spawn` opens the driver and starts polling,
/// `shutdown` stops the task and closes the driver. Consumers subscribe to
/// the watch channel and react to state snapshots.
pub struct PadHandle {
    state_rx: watch::Receiver<PadStateStore>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PadHandle {
    pub fn spawn(bus: Box<dyn PadBus>, config: DriverConfig) -> Result<Self, PadError> {
        let interval_ms = config.poll_interval_ms;
        let mut driver = PadDriver::create(bus, config).open()?;

        let (state_tx, state_rx) = watch::channel(PadStateStore::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut store = PadStateStore::default();
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("pad task shutdown requested");
                        break;
                    }

                    _ = ticker.tick() => {
                        if let PollOutcome::Updated { port, buttons } = driver.poll(&mut store) {
                            debug!("publishing pad {} state: {:?}", port.index(), buttons);
                            let _ = state_tx.send(store);
                        }
                    }
                }
            }

            match driver.close() {
                Ok(_) => info!("pad task stopped"),
                Err(e) => warn!("bus teardown failed: {}", e),
            }
        });

        info!("pad polling task spawned ({interval_ms}ms interval)");
        Ok(Self {
            state_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Get a receiver for pad state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PadStateStore> {
        self.state_rx.clone()
    }

    /// Stops polling and releases the bus.
    pub async fn shutdown(&mut self) -> Result<(), PadError> {
        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("pad task already stopped");
            }
        }
        if let Some(handle) = self.task.take() {
            handle
                .await
                .map_err(|e| PadError::Task(format!("pad task panicked: {e}")))?;
        }
        Ok(())
    }
}
