//! Runtime configuration for the pad driver.
//!
//! Everything the original hardware build wired in at compile time (init
//! strategy, frame size, bus speed, pin assignment, throttle interval) is a
//! plain config value here, loaded from TOML with sane defaults so the
//! driver runs without any config file at all.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Wire frame length.
///
/// Six bytes is right for most pads. Some (psclassic-style pads among them)
/// only deliver usable status in the last two bytes of an eight-byte frame;
/// for those the longer read feeds the trailer-substitution path of the
/// decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FrameSize {
    Six,
    Eight,
}

impl FrameSize {
    pub fn len(self) -> usize {
        match self {
            FrameSize::Six => 6,
            FrameSize::Eight => 8,
        }
    }
}

impl TryFrom<u8> for FrameSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(FrameSize::Six),
            8 => Ok(FrameSize::Eight),
            other => Err(format!("frame_size must be 6 or 8, got {other}")),
        }
    }
}

impl From<FrameSize> for u8 {
    fn from(value: FrameSize) -> Self {
        value.len() as u8
    }
}

/// Driver configuration, one instance per driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Fixed i2c address shared by all pads of this family.
    pub device_address: u8,

    /// Nominal bus clock in Hz. On the Pi the real clock comes from the
    /// firmware config; this value is reported, not enforced.
    pub bus_frequency_hz: u32,

    /// BCM number of the digital output selecting the active port.
    pub mux_pin: u8,

    /// How many status bytes one poll reads from the pad.
    pub frame_size: FrameSize,

    /// Send the single-command wake sequence some older pads need.
    pub legacy_init: bool,

    /// Send the two-command handshake that leaves pad data unencrypted.
    pub standard_init: bool,

    /// Failed poll cycles between re-initialization attempts.
    pub reinit_interval: u32,

    /// Tick period of the background polling task.
    pub poll_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device_address: 0x52,
            bus_frequency_hz: 100_000,
            mux_pin: 22,
            frame_size: FrameSize::Six,
            legacy_init: false,
            standard_init: true,
            reinit_interval: 100,
            poll_interval_ms: 5,
        }
    }
}

impl DriverConfig {
    /// Loads the config from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Default config file location (`<config dir>/wiipad/config.toml`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wiipad")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hardware() {
        let config = DriverConfig::default();
        assert_eq!(config.device_address, 0x52);
        assert_eq!(config.frame_size, FrameSize::Six);
        assert!(config.standard_init);
        assert!(!config.legacy_init);
        assert_eq!(config.reinit_interval, 100);
    }

    #[test]
    fn parses_partial_toml() {
        let config: DriverConfig = toml::from_str(
            r#"
            frame_size = 8
            legacy_init = true
            mux_pin = 17
            "#,
        )
        .unwrap();
        assert_eq!(config.frame_size, FrameSize::Eight);
        assert!(config.legacy_init);
        assert_eq!(config.mux_pin, 17);
        // untouched fields keep their defaults
        assert_eq!(config.device_address, 0x52);
    }

    #[test]
    fn rejects_unsupported_frame_size() {
        let result: Result<DriverConfig, _> = toml::from_str("frame_size = 7");
        assert!(result.is_err());
    }
}
