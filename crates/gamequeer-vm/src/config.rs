//! Engine configuration

use crate::memory::RegionSizes;
use gamequeer_types::layout::MAX_OFFSET;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens to a suspended background cue when a foreground cue ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundCuePolicy {
    /// Resume at the exact frame and elapsed position it was suspended at
    #[default]
    Resume,
    /// Drop it; LEDs go dark when the foreground cue finishes
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{region} region must not be empty")]
    EmptyRegion { region: &'static str },

    #[error("{region} region of {size} bytes exceeds the 24-bit offset space")]
    RegionTooLarge { region: &'static str, size: usize },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Tunables for one engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Save flash size in bytes
    pub save_size: usize,
    /// FRAM size in bytes
    pub fram_size: usize,
    /// Heap size in bytes
    pub heap_size: usize,
    /// System ticks per second
    pub tick_hz: u32,
    /// System ticks per LED update
    pub led_divider: u32,
    /// Instructions one script may execute before it is cut off
    pub max_instructions: u32,
    pub cue_policy: BackgroundCuePolicy,
    /// Refuse cartridges whose header checksum does not match
    pub verify_checksum: bool,
    /// Player id exposed to content through `GQI_BADGE_ID`
    pub badge_id: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_size: 64 * 1024,
            fram_size: 512,
            heap_size: 512,
            tick_hz: 100,
            led_divider: 4,
            max_instructions: 1_000_000,
            cue_policy: BackgroundCuePolicy::Resume,
            verify_checksum: true,
            badge_id: 0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (region, size) in [
            ("save", self.save_size),
            ("fram", self.fram_size),
            ("heap", self.heap_size),
        ] {
            if size == 0 {
                return Err(ConfigError::EmptyRegion { region });
            }
            if size > MAX_OFFSET as usize + 1 {
                return Err(ConfigError::RegionTooLarge { region, size });
            }
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::Zero("tick_hz"));
        }
        if self.led_divider == 0 {
            return Err(ConfigError::Zero("led_divider"));
        }
        if self.max_instructions == 0 {
            return Err(ConfigError::Zero("max_instructions"));
        }
        Ok(())
    }

    pub fn region_sizes(&self) -> RegionSizes {
        RegionSizes {
            save: self.save_size,
            fram: self.fram_size,
            heap: self.heap_size,
        }
    }
}
