mod config;

pub use config::{Config, SoundConfig, Theme, TimerConfig, UiConfig};

use std::path::PathBuf;

/// Returns `~/.config/cosmic-focus[-dev]/` based on COSMIC_FOCUS_ENV.
///
/// Set COSMIC_FOCUS_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("COSMIC_FOCUS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cosmic-focus-dev")
    } else {
        base_dir.join("cosmic-focus")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
