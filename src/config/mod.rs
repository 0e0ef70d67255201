//! Configuration module
//!
//! Handles the receiver's on-disk settings: where finished files land, how
//! length overruns are handled, and timeout overrides.

mod settings;

pub use settings::ReceiverConfig;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "xyrecv", "xyrecv").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the application data directory
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "xyrecv", "xyrecv").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Initialize application directories
pub fn init_directories() -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
    }
    if let Some(dir) = data_dir() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}
