//! Configuration management
//!
//! Handles loading and saving the profile's configuration file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Profile directory not found")]
    NoProfileDir,
}

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Update check settings
    pub updates: UpdateConfig,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Location for windows opened without one (None = surface default)
    pub default_location: Option<String>,
    /// Exit when the last window closes (None = platform default:
    /// keep running on macOS, exit elsewhere)
    pub quit_on_last_window_closed: Option<bool>,
}

impl GeneralConfig {
    /// Resolve the quit-on-last-window-closed policy for this platform
    pub fn quit_when_all_windows_closed(&self) -> bool {
        self.quit_on_last_window_closed
            .unwrap_or(!cfg!(target_os = "macos"))
    }
}

/// Update check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Whether update checks are allowed at all
    pub enabled: bool,
    /// GitHub repository to check releases on, as "owner/repo"
    pub repo: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repo: "kestrel-shell/kestrel".into(),
        }
    }
}

/// Get the default profile directory path
pub fn default_profile_dir() -> Option<PathBuf> {
    ProjectDirs::from("io", "kestrel", "kestrel").map(|p| p.config_dir().to_path_buf())
}

/// Get the config file path inside a profile directory
pub fn config_path(profile_dir: &Path) -> PathBuf {
    profile_dir.join("config.toml")
}

/// Load configuration from the profile directory
pub fn load_config(profile_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(profile_dir);

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

/// Save configuration to the profile directory
pub fn save_config(config: &Config, profile_dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(profile_dir)?;

    let path = config_path(profile_dir);
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, &content)?;

    // Set restrictive permissions on config file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(&path, perms);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.general.default_location.is_none());
        assert!(config.updates.enabled);
        assert_eq!(config.updates.repo, "kestrel-shell/kestrel");
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(serialized.contains("[general]"));
        assert!(serialized.contains("[updates]"));
    }

    #[test]
    fn test_quit_policy_explicit_overrides_platform() {
        let mut general = GeneralConfig::default();
        general.quit_on_last_window_closed = Some(false);
        assert!(!general.quit_when_all_windows_closed());

        general.quit_on_last_window_closed = Some(true);
        assert!(general.quit_when_all_windows_closed());
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.updates.enabled);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.default_location = Some("about:start".into());
        config.updates.enabled = false;

        save_config(&config, dir.path()).unwrap();
        let back = load_config(dir.path()).unwrap();

        assert_eq!(back.general.default_location.as_deref(), Some("about:start"));
        assert!(!back.updates.enabled);
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(config_path(dir.path()), "general = \"not a table\"").unwrap();

        assert!(matches!(
            load_config(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
