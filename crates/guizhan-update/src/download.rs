//! Artifact download with completeness and checksum verification
//!
//! The artifact is streamed into a private temporary file created next to the
//! target so the later rename never crosses volumes. A file only leaves this
//! module once it has been validated:
//! - byte count matches the declared `Content-Length` (if any)
//! - the body stream ended cleanly
//! - SHA256 matches the checksum published by the mirror (if any)
//!
//! Anything else deletes the temporary file and yields `CorruptDownload`.

use anyhow::{anyhow, Context};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};
use crate::version::BuildInfo;

/// Suffix of in-flight download files
pub const PARTIAL_SUFFIX: &str = ".part";

/// A downloaded artifact that passed validation
///
/// Dropping it deletes the temporary file.
#[derive(Debug)]
pub struct DownloadedArtifact {
    file: NamedTempFile,
    size: u64,
    checksum: String,
}

impl DownloadedArtifact {
    pub(crate) fn new(file: NamedTempFile, size: u64, checksum: String) -> Self {
        Self {
            file,
            size,
            checksum,
        }
    }

    /// Path of the temporary file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercase hex SHA256 of the content
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub(crate) fn into_temp_file(self) -> NamedTempFile {
        self.file
    }
}

/// Streams build artifacts to disk
pub struct ArtifactDownloader {
    client: reqwest::Client,
    timeout: Duration,
}

impl ArtifactDownloader {
    /// `timeout` bounds the whole transfer, including the body
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download `build` into a temporary file in `dest_dir`
    ///
    /// `file_name` is the target artifact's name; temp files are named
    /// `.{file_name}.<random>.part`.
    pub async fn download(
        &self,
        build: &BuildInfo,
        dest_dir: &Path,
        file_name: &str,
    ) -> Result<DownloadedArtifact> {
        sweep_partials(dest_dir, file_name);

        let mut temp = tempfile::Builder::new()
            .prefix(&partial_prefix(file_name))
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(dest_dir)
            .with_context(|| {
                format!("Failed to create temporary file in {}", dest_dir.display())
            })
            .map_err(UpdateError::download_failed)?;

        debug!(
            "Downloading {} to {}",
            build.download_url,
            temp.path().display()
        );

        let response = self
            .client
            .get(&build.download_url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", build.download_url))
            .map_err(UpdateError::download_failed)?;

        if !response.status().is_success() {
            return Err(UpdateError::download_failed(anyhow!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let declared = response.content_length();
        if let Some(len) = declared {
            info!("Downloading build {} ({})", build.version, human_readable_size(len));
        }

        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            // An early close or timeout mid-body is a truncated transfer
            let chunk: bytes::Bytes = chunk.map_err(|e| {
                UpdateError::corrupt_download(format!(
                    "Transfer interrupted after {} bytes: {}",
                    written, e
                ))
            })?;

            temp.write_all(&chunk)
                .context("Failed to write to temporary file")
                .map_err(UpdateError::download_failed)?;
            hasher.update(&chunk);
            written += chunk.len() as u64;
        }

        temp.as_file()
            .sync_all()
            .context("Failed to flush temporary file")
            .map_err(UpdateError::download_failed)?;

        verify_length(declared, written)?;

        let checksum = format!("{:x}", hasher.finalize());
        if let Some(expected) = &build.checksum {
            verify_checksum(expected, &checksum)?;
            debug!("Checksum verified: {}", checksum);
        }

        info!("Downloaded build {} ({} bytes)", build.version, written);

        Ok(DownloadedArtifact::new(temp, written, checksum))
    }
}

fn partial_prefix(file_name: &str) -> String {
    format!(".{}.", file_name)
}

/// Require the received byte count to match the declared length
pub fn verify_length(declared: Option<u64>, received: u64) -> Result<()> {
    match declared {
        Some(expected) if expected != received => Err(UpdateError::corrupt_download(format!(
            "File size mismatch: expected {}, got {}",
            expected, received
        ))),
        _ => Ok(()),
    }
}

/// Compare a published checksum against the computed digest
///
/// Published values may be upper-case and may carry a `sha256:` prefix.
pub fn verify_checksum(expected: &str, actual: &str) -> Result<()> {
    let expected = expected.trim();
    let expected = expected
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("sha256:"))
        .map(|_| &expected[7..])
        .unwrap_or(expected);

    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(UpdateError::corrupt_download(format!(
            "Checksum mismatch: expected {}, got {}",
            expected, actual
        )))
    }
}

/// Remove `.part` files a previous, interrupted run left for `file_name`
///
/// Returns the number of files removed.
pub fn sweep_partials(dir: &Path, file_name: &str) -> usize {
    let prefix = partial_prefix(file_name);
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot scan {} for partial downloads: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        let is_partial = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(&prefix) && n.ends_with(PARTIAL_SUFFIX))
            .unwrap_or(false);

        if !is_partial {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed stale partial download {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// Convert bytes to human-readable size
fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
