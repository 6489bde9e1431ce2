//! Queue Configuration Module
//!
//! Provides the flush configuration for a [`QueueManager`](crate::queue::QueueManager),
//! named presets and TOML round-tripping for the application's configuration file.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::queue::{QueueError, QueueResult};

/// Default number of pending items that forces an immediate flush
pub const DEFAULT_QUEUE_THRESHOLD: usize = 50;

/// Default periodic flush interval in milliseconds
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

/// Flush configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushConfig {
    /// Pending size at which an append flushes synchronously
    pub queue_threshold: usize,

    /// Periodic flush interval in milliseconds
    pub flush_interval_ms: u64,

    /// Promote into the top of main (newest first) instead of the bottom
    pub insert_at_top: bool,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            queue_threshold: DEFAULT_QUEUE_THRESHOLD,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            insert_at_top: false,
        }
    }
}

impl FlushConfig {
    /// The interval is kept in whole milliseconds. A fractional millisecond
    /// rounds up, so any non-zero `flush_interval` stays non-zero.
    pub fn new(queue_threshold: usize, flush_interval: Duration, insert_at_top: bool) -> Self {
        let flush_interval_ms = u64::try_from(flush_interval.as_nanos().div_ceil(1_000_000))
            .unwrap_or(u64::MAX);
        Self {
            queue_threshold,
            flush_interval_ms,
            insert_at_top,
        }
    }

    /// Periodic flush interval
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> QueueResult<()> {
        if self.queue_threshold == 0 {
            return Err(QueueError::invalid_configuration(
                "queue_threshold must be at least 1",
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(QueueError::invalid_configuration(
                "flush_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Flush configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPreset {
    /// Chat feed: small batches, newest rows on top
    Chat,
    /// Default thresholds, append at the bottom
    Balanced,
    /// Large infrequent batches for bursty producers
    Burst,
    /// Every append is promoted immediately
    Realtime,
}

impl FlushPreset {
    /// Get flush configuration for this preset
    pub fn config(self) -> FlushConfig {
        match self {
            FlushPreset::Chat => FlushConfig {
                queue_threshold: 10,
                flush_interval_ms: 1000,
                insert_at_top: true,
            },

            FlushPreset::Balanced => FlushConfig::default(),

            FlushPreset::Burst => FlushConfig {
                queue_threshold: 200,
                flush_interval_ms: 250,
                ..Default::default()
            },

            FlushPreset::Realtime => FlushConfig {
                queue_threshold: 1,
                flush_interval_ms: 100,
                ..Default::default()
            },
        }
    }
}

impl std::str::FromStr for FlushPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(FlushPreset::Chat),
            "balanced" => Ok(FlushPreset::Balanced),
            "burst" => Ok(FlushPreset::Burst),
            "realtime" => Ok(FlushPreset::Realtime),
            _ => Err(format!(
                "Invalid flush preset: {}. Valid options: chat, balanced, burst, realtime",
                s
            )),
        }
    }
}

/// Load flush configuration from TOML string
pub fn load_flush_config(toml_str: &str) -> QueueResult<FlushConfig> {
    let config: FlushConfig = toml::from_str(toml_str)
        .map_err(|e| QueueError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Save flush configuration to TOML string
pub fn save_flush_config(config: &FlushConfig) -> QueueResult<String> {
    toml::to_string_pretty(config).map_err(|e| QueueError::Config(e.to_string()))
}
