// Settings file handling for the overlay inspector
//
// Cross-platform settings stored in:
// - macOS: ~/Library/Application Support/overlay/settings.json
// - Linux: ~/.config/overlay/settings.json
// - Windows: %APPDATA%\overlay\settings.json

use anyhow::{Context, Result};
use overlay_core::TopologySettings;
use std::path::{Path, PathBuf};

/// Get the config directory path (cross-platform)
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to determine config directory")?
        .join("overlay"))
}

/// Get the default settings file path
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("settings.json"))
}

/// Load settings from `explicit` if given, else from the default location
/// if a file exists there, else defaults.
pub fn load(explicit: Option<&Path>) -> Result<TopologySettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = settings_file()?;
            if !path.exists() {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                return Ok(TopologySettings::default());
            }
            path
        }
    };

    TopologySettings::from_json_file(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

/// Write `settings` to `path`, creating parent directories
pub fn save(settings: &TopologySettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let contents = settings.to_json_pretty().context("Failed to serialize settings")?;
    std::fs::write(path, contents).context("Failed to write settings file")?;
    Ok(())
}
