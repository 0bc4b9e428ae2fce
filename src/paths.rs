//! Filesystem layout.
//!
//! ```text
//! ~/.trending-sync/
//! └── config.toml              # Global config
//! ```
//!
//! `.env` is read from the working directory, not from here.

use std::path::{Path, PathBuf};

/// Tool home directory: `~/.trending-sync/`
pub fn home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trending-sync")
}

/// Global config file: `~/.trending-sync/config.toml`
pub fn config_path() -> PathBuf {
    home().join("config.toml")
}

/// Config file to load: the explicit one if given, else the global default.
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(config_path)
}
