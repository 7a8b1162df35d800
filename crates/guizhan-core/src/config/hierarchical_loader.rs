//! Hierarchical configuration loader with precedence
//!
//! Loads updater settings from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into the library)
//! 2. Global config (~/.guizhan/updater.yaml, or `<dir>/updater.yaml` with [`HierarchicalConfigLoader::with_dir`])
//! 3. Environment variables (GUIZHAN_UPDATER_* prefix)
//! 4. Programmatic overrides (handled by caller)

use crate::error::{Error, Result};
use crate::types::{NetworkConfig, UpdaterSettings};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Name of the global settings file inside the config directory
pub const SETTINGS_FILE: &str = "updater.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.guizhan)
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;

        Ok(home.join(".guizhan"))
    }

    /// Load updater settings with hierarchical precedence
    pub fn load_settings(&self) -> Result<UpdaterSettings> {
        let mut settings = Self::load_embedded_config::<UpdaterSettings>("updater-defaults.yaml")?;

        let settings_path = self.config_dir.join(SETTINGS_FILE);
        if settings_path.exists() {
            debug!("Loading updater settings from {}", settings_path);
            let file_settings = self.load_yaml_file::<UpdaterSettings>(&settings_path)?;
            settings = Self::merge_settings(settings, file_settings);
        }

        self.apply_env_overrides(settings)
    }

    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Merge two settings values (base is overridden by overlay)
    fn merge_settings(base: UpdaterSettings, overlay: UpdaterSettings) -> UpdaterSettings {
        UpdaterSettings {
            mirror: overlay.mirror,
            mode: overlay.mode,
            network: Self::merge_network(base.network, overlay.network),
            staging: overlay.staging,
        }
    }

    /// Values left unset in the overlay keep the base value
    fn merge_network(base: NetworkConfig, overlay: NetworkConfig) -> NetworkConfig {
        NetworkConfig {
            check_timeout_secs: overlay.check_timeout_secs.or(base.check_timeout_secs),
            download_timeout_secs: overlay.download_timeout_secs.or(base.download_timeout_secs),
            user_agent: overlay.user_agent.or(base.user_agent),
        }
    }

    fn apply_env_overrides(&self, mut settings: UpdaterSettings) -> Result<UpdaterSettings> {
        if let Ok(val) = env::var("GUIZHAN_UPDATER_MIRROR") {
            settings.mirror = val.parse()?;
        }

        if let Ok(val) = env::var("GUIZHAN_UPDATER_MODE") {
            settings.mode = val.parse()?;
        }

        if let Ok(val) = env::var("GUIZHAN_UPDATER_CHECK_TIMEOUT_SECS") {
            settings.network.check_timeout_secs = Some(val.parse().map_err(|_| {
                Error::invalid_config("GUIZHAN_UPDATER_CHECK_TIMEOUT_SECS must be a valid number")
            })?);
        }

        if let Ok(val) = env::var("GUIZHAN_UPDATER_DOWNLOAD_TIMEOUT_SECS") {
            settings.network.download_timeout_secs = Some(val.parse().map_err(|_| {
                Error::invalid_config(
                    "GUIZHAN_UPDATER_DOWNLOAD_TIMEOUT_SECS must be a valid number",
                )
            })?);
        }

        if let Ok(val) = env::var("GUIZHAN_UPDATER_USER_AGENT") {
            settings.network.user_agent = Some(val);
        }

        if let Ok(val) = env::var("GUIZHAN_UPDATER_PENDING_DIR") {
            settings.staging.pending_dir = val;
        }

        Ok(settings)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
