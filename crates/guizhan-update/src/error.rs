//! Error types for the updater

use std::fmt;
use thiserror::Error;

/// Result type alias using the updater's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Coarse classification of an updater failure, reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed project reference or missing configuration
    InvalidConfig,
    /// Version check failed (network, status or body)
    CheckFailed,
    /// Artifact could not be fetched
    DownloadFailed,
    /// Artifact was truncated or failed checksum verification
    CorruptDownload,
    /// Validated artifact could not be moved into place
    StagingFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidConfig => "invalid config",
            ErrorKind::CheckFailed => "check failed",
            ErrorKind::DownloadFailed => "download failed",
            ErrorKind::CorruptDownload => "corrupt download",
            ErrorKind::StagingFailed => "staging failed",
        };
        f.write_str(name)
    }
}

/// Updater errors
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Invalid updater configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Version check failed: {message}")]
    CheckFailed { message: String },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Corrupt download: {message}")]
    CorruptDownload { message: String },

    #[error("Staging failed: {message}")]
    StagingFailed { message: String },
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            UpdateError::CheckFailed { .. } => ErrorKind::CheckFailed,
            UpdateError::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            UpdateError::CorruptDownload { .. } => ErrorKind::CorruptDownload,
            UpdateError::StagingFailed { .. } => ErrorKind::StagingFailed,
        }
    }

    /// Human-readable detail without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            UpdateError::InvalidConfig { message }
            | UpdateError::CheckFailed { message }
            | UpdateError::DownloadFailed { message }
            | UpdateError::CorruptDownload { message }
            | UpdateError::StagingFailed { message } => message,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Flattens an `anyhow` context chain into a check failure
    pub fn check_failed(err: impl Into<anyhow::Error>) -> Self {
        Self::CheckFailed {
            message: format!("{:#}", err.into()),
        }
    }

    pub fn download_failed(err: impl Into<anyhow::Error>) -> Self {
        Self::DownloadFailed {
            message: format!("{:#}", err.into()),
        }
    }

    pub fn corrupt_download(message: impl Into<String>) -> Self {
        Self::CorruptDownload {
            message: message.into(),
        }
    }

    pub fn staging_failed(err: impl Into<anyhow::Error>) -> Self {
        Self::StagingFailed {
            message: format!("{:#}", err.into()),
        }
    }
}

impl From<guizhan_core::Error> for UpdateError {
    fn from(err: guizhan_core::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
