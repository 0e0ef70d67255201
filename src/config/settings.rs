//! The receiver's persisted configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::protocol::xymodem::OverrunPolicy;

/// Top-level configuration for a receive session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Directory received files are written into.
    pub output_dir: PathBuf,
    /// What to do when a file's payload runs past its declared length.
    pub overrun_policy: OverrunPolicy,
    /// Serial port name to open by default, if not given on the command
    /// line.
    pub default_port: Option<String>,
    /// Default baud rate.
    pub default_baud_rate: u32,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overrun_policy: OverrunPolicy::Ignore,
            default_port: None,
            default_baud_rate: 115_200,
        }
    }
}

impl ReceiverConfig {
    /// Load config from the OS config directory, falling back to defaults
    /// if no file is present.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist config to the OS config directory.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}
