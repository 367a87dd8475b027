//! Configuration type definitions
//!
//! These types describe the panel hardware and jog behavior. They are
//! persisted as postcard-serialized binary data when the `serde` feature is
//! enabled.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::N_AXIS;

/// Number of selectable MPG gains
pub const MULTIPLIER_COUNT: usize = 3;

/// Upper bound on the encoded size of a [`PanelConfig`]
pub const MAX_CONFIG_SIZE: usize = 128;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Encoding failed or did not fit the buffer
    Serialize,
    /// Stored bytes are not a valid configuration
    Deserialize,
    /// Counts per unit not positive, or feed limits inverted
    InvalidAxis,
}

/// One jog wheel axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Encoder counts per machine unit at ×1
    pub counts_per_unit: f32,
    /// Disabled axes never move
    pub enabled: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            counts_per_unit: 400.0,
            enabled: true,
        }
    }
}

/// Panel configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// X, Y, Z
    pub axes: [AxisConfig; N_AXIS],
    /// Selectable MPG gains
    pub step_multipliers: [u16; MULTIPLIER_COUNT],
    /// Jog feed clamp (units/min)
    pub min_feed: u32,
    pub max_feed: u32,
    /// Default timeout for acknowledgement waits
    pub ack_timeout_ms: u32,
    /// Interval between `?` status requests
    pub status_poll_interval_ms: u32,
    /// MPG engine tick
    pub mpg_tick_interval_ms: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            axes: [AxisConfig::default(); N_AXIS],
            step_multipliers: [1, 10, 100],
            min_feed: 1,
            max_feed: 5000,
            ack_timeout_ms: 1000,
            status_poll_interval_ms: 50,
            mpg_tick_interval_ms: 20,
        }
    }
}

impl PanelConfig {
    /// Check values the jog engine divides by or clamps with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let axes_ok = self
            .axes
            .iter()
            .all(|axis| axis.counts_per_unit > 0.0 && axis.counts_per_unit.is_finite());
        if !axes_ok || self.min_feed > self.max_feed {
            return Err(ConfigError::InvalidAxis);
        }
        Ok(())
    }

    /// Encode into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Decode and validate
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step_multipliers, [1, 10, 100]);
        assert_eq!(config.axes[2].counts_per_unit, 400.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PanelConfig::default();
        config.axes[1].counts_per_unit = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAxis));

        let mut config = PanelConfig::default();
        config.min_feed = 6000;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAxis));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_persistence() {
        let mut config = PanelConfig::default();
        config.axes[0].enabled = false;
        config.max_feed = 2500;

        let mut buf = [0u8; MAX_CONFIG_SIZE];
        let used = config.to_bytes(&mut buf).unwrap().len();
        assert_eq!(PanelConfig::from_bytes(&buf[..used]), Ok(config));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_garbage_and_invalid_rejected() {
        assert_eq!(PanelConfig::from_bytes(&[0xFF; 3]), Err(ConfigError::Deserialize));

        let mut config = PanelConfig::default();
        config.axes[0].counts_per_unit = -1.0;
        let mut buf = [0u8; MAX_CONFIG_SIZE];
        let used = config.to_bytes(&mut buf).unwrap().len();
        assert_eq!(PanelConfig::from_bytes(&buf[..used]), Err(ConfigError::InvalidAxis));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_small_buffer_fails() {
        let mut buf = [0u8; 4];
        assert_eq!(
            PanelConfig::default().to_bytes(&mut buf).map(|b| b.len()),
            Err(ConfigError::Serialize)
        );
    }
}
