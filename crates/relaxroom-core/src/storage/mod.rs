mod config;

pub use config::{Config, DisplayConfig, SessionSettings};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the configuration directory.
///
/// `RELAXROOM_HOME` wins when set. Otherwise `~/.config/relaxroom[-dev]/`,
/// with `RELAXROOM_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("RELAXROOM_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RELAXROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("relaxroom-dev")
            } else {
                base_dir.join("relaxroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
