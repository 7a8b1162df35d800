//! Atomic replacement of the artifact on disk
//!
//! A validated download is renamed over the target in one step. When the host
//! holds the target open in a way that forbids replacement (Windows locks
//! loaded jars), the file is renamed into the pending directory instead and
//! [`apply_pending`] swaps it in during the next startup, before the artifact
//! is loaded again. Both renames stay inside the target's directory tree, so
//! readers of the target only ever see the old or the new file.

use anyhow::{anyhow, Context};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::artifact::LocalArtifact;
use crate::download::DownloadedArtifact;
use crate::error::{Result, UpdateError};

/// Where a validated artifact ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    /// Final location of the new artifact
    pub path: PathBuf,

    /// True when the swap waits for the next startup
    pub deferred: bool,

    /// Size in bytes
    pub size: u64,

    /// SHA256 of the staged content
    pub checksum: String,
}

/// Moves validated downloads into place
#[derive(Debug, Clone)]
pub struct Stager {
    pending_dir: String,
    lock_check: fn(&io::Error) -> bool,
}

impl Stager {
    /// `pending_dir` is relative to the artifact's directory
    pub fn new(pending_dir: impl Into<String>) -> Self {
        Self {
            pending_dir: pending_dir.into(),
            lock_check: is_locked,
        }
    }

    /// Replace how a failed rename is classified as "target locked"
    #[cfg(test)]
    fn with_lock_check(mut self, lock_check: fn(&io::Error) -> bool) -> Self {
        self.lock_check = lock_check;
        self
    }

    /// Pending location for `artifact`
    pub fn pending_path(&self, artifact: &LocalArtifact) -> Result<PathBuf> {
        Ok(artifact
            .directory()?
            .join(&self.pending_dir)
            .join(artifact.file_name()?))
    }

    /// Replace the artifact with `download`, or park it at the pending path
    /// when the artifact is locked
    pub fn stage(
        &self,
        download: DownloadedArtifact,
        artifact: &LocalArtifact,
    ) -> Result<StagedArtifact> {
        let size = download.size();
        let checksum = download.checksum().to_string();
        let target = artifact.path();

        debug!(
            "Replacing artifact: {:?} -> {:?}",
            download.path(),
            target
        );

        let err = match download.into_temp_file().persist(target) {
            Ok(_) => {
                info!("Artifact replaced: {}", target.display());
                return Ok(StagedArtifact {
                    path: target.to_path_buf(),
                    deferred: false,
                    size,
                    checksum,
                });
            }
            Err(err) => err,
        };

        if !(self.lock_check)(&err.error) {
            let kept = keep_for_cleanup(err.file);
            return Err(UpdateError::staging_failed(anyhow!(
                "Failed to replace {}: {}; new artifact left at {}",
                target.display(),
                err.error,
                kept
            )));
        }

        warn!(
            "{} is locked ({}); deferring replacement to next startup",
            target.display(),
            err.error
        );

        self.defer(err.file, artifact, size, checksum)
    }

    /// Park `file` at the pending path for the host bootstrap to apply
    fn defer(
        &self,
        file: tempfile::NamedTempFile,
        artifact: &LocalArtifact,
        size: u64,
        checksum: String,
    ) -> Result<StagedArtifact> {
        let pending = self.pending_path(artifact)?;
        if let Some(parent) = pending.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                let kept = keep_for_cleanup(file);
                return Err(UpdateError::staging_failed(anyhow!(
                    "Failed to create {}: {}; new artifact left at {}",
                    parent.display(),
                    e,
                    kept
                )));
            }
        }

        match file.persist(&pending) {
            Ok(_) => {
                info!("Artifact staged for next startup: {}", pending.display());
                Ok(StagedArtifact {
                    path: pending,
                    deferred: true,
                    size,
                    checksum,
                })
            }
            Err(err) => {
                let error = err.error.to_string();
                let kept = keep_for_cleanup(err.file);
                Err(UpdateError::staging_failed(anyhow!(
                    "Failed to stage {}: {}; new artifact left at {}",
                    pending.display(),
                    error,
                    kept
                )))
            }
        }
    }
}

/// Keep a temp file that could not be moved so it can be inspected or swept
fn keep_for_cleanup(file: tempfile::NamedTempFile) -> String {
    match file.keep() {
        Ok((_, path)) => path.display().to_string(),
        Err(e) => format!("<lost: {}>", e.error),
    }
}

/// Whether a rename failed because the target is in use
fn is_locked(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }

    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}

/// Host bootstrap step: move a pending artifact over its target
///
/// Must run before the artifact is loaded. Returns `true` if a pending
/// artifact was applied.
pub fn apply_pending(target: &Path, pending_dir: &str) -> anyhow::Result<bool> {
    let file_name = target
        .file_name()
        .ok_or_else(|| anyhow!("Artifact path has no file name: {}", target.display()))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let pending = dir.join(pending_dir).join(file_name);

    if !pending.is_file() {
        return Ok(false);
    }

    fs::rename(&pending, target).with_context(|| {
        format!(
            "Failed to apply pending artifact {} to {}",
            pending.display(),
            target.display()
        )
    })?;

    info!("Applied pending artifact to {}", target.display());
    Ok(true)
}
