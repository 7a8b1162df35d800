//! Runtime settings for the updater
//!
//! These types mirror the layout of `updater.yaml`. Network timeouts have no
//! default: a host that never configures them gets an `InvalidConfig` error
//! when it tries to build an updater.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::MirrorKind;

/// Whether a newer build is only reported or also fetched and staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    CheckOnly,
    #[default]
    CheckAndDownload,
}

impl UpdateMode {
    /// Whether this mode downloads and stages new builds
    pub fn downloads(&self) -> bool {
        matches!(self, UpdateMode::CheckAndDownload)
    }
}

impl std::str::FromStr for UpdateMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "check-only" | "check_only" | "check" => Ok(UpdateMode::CheckOnly),
            "check-and-download" | "check_and_download" | "download" => {
                Ok(UpdateMode::CheckAndDownload)
            }
            other => Err(Error::invalid_config(format!(
                "Unknown update mode '{}'. Expected 'check-only' or 'check-and-download'",
                other
            ))),
        }
    }
}

/// Complete updater settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdaterSettings {
    /// Which mirror to query
    #[serde(default)]
    pub mirror: MirrorKind,

    /// Check only, or check and download
    #[serde(default)]
    pub mode: UpdateMode,

    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where deferred replacements are parked
    #[serde(default)]
    pub staging: StagingConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Version-check request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_timeout_secs: Option<u64>,

    /// Artifact download timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,

    /// User agent string for HTTP requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            check_timeout_secs: None,
            download_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl NetworkConfig {
    /// Configured user agent, or `guizhan-updater/<version> (<os>; <arch>)`
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(default_user_agent)
    }

    /// Configured version-check timeout
    pub fn check_timeout(&self) -> Result<Duration> {
        required_timeout("network.check-timeout-secs", self.check_timeout_secs)
    }

    /// Configured download timeout
    pub fn download_timeout(&self) -> Result<Duration> {
        required_timeout("network.download-timeout-secs", self.download_timeout_secs)
    }
}

fn required_timeout(key: &str, value: Option<u64>) -> Result<Duration> {
    match value {
        Some(0) => Err(Error::invalid_config(format!("{} must be positive", key))),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Err(Error::invalid_config(format!("{} is not configured", key))),
    }
}

fn default_user_agent() -> String {
    format!(
        "guizhan-updater/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StagingConfig {
    /// Directory name, relative to the artifact's directory, that holds
    /// replacements waiting for the next startup
    #[serde(default = "default_pending_dir")]
    pub pending_dir: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            pending_dir: default_pending_dir(),
        }
    }
}

fn default_pending_dir() -> String {
    "update".to_string()
}
