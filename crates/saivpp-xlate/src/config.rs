//! Client configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all with [`XlateConfig::load_or_default`]) gives a working setup.
//!
//! ```toml
//! [connect]
//! refresh_interfaces = true
//!
//! [events]
//! sync_before_drain = true
//! drain_batch = 1024
//! ```

use crate::error::{XlateError, XlateResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/saivpp.toml";

/// Upper bound for `events.drain_batch`.
pub const MAX_DRAIN_BATCH: usize = 65536;

/// Session setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Re-read the engine's interface list right after connecting.
    #[serde(default = "default_refresh_interfaces")]
    pub refresh_interfaces: bool,
}

/// Event draining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Pull engine events into the queue before each drain.
    #[serde(default = "default_sync_before_drain")]
    pub sync_before_drain: bool,

    /// Maximum events handled per drain; 0 drains until empty.
    #[serde(default = "default_drain_batch")]
    pub drain_batch: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XlateConfig {
    #[serde(default)]
    pub connect: ConnectConfig,

    #[serde(default)]
    pub events: EventConfig,
}

fn default_refresh_interfaces() -> bool {
    true
}

fn default_sync_before_drain() -> bool {
    true
}

fn default_drain_batch() -> usize {
    1024
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            refresh_interfaces: default_refresh_interfaces(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            sync_before_drain: default_sync_before_drain(),
            drain_batch: default_drain_batch(),
        }
    }
}

impl XlateConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> XlateResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| XlateError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> XlateResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            XlateError::Config { message } => {
                XlateError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> XlateResult<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(XlateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> XlateResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| XlateError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> XlateResult<()> {
        if self.events.drain_batch > MAX_DRAIN_BATCH {
            return Err(XlateError::config(format!(
                "events.drain_batch must be at most {} (got {})",
                MAX_DRAIN_BATCH, self.events.drain_batch
            )));
        }
        Ok(())
    }

    /// Drain limit, `None` meaning unbounded.
    pub fn drain_limit(&self) -> Option<usize> {
        match self.events.drain_batch {
            0 => None,
            n => Some(n),
        }
    }
}
