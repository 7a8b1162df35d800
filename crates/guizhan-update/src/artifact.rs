//! The artifact currently loaded by the host
//!
//! The running version is read exactly once, when the [`LocalArtifact`] is
//! built, either from the caller or from the `plugin.yml` descriptor packed
//! inside the plugin jar.

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::version::BuildVersion;

/// Descriptor entry inside a plugin jar
pub const PLUGIN_DESCRIPTOR: &str = "plugin.yml";

/// The artifact file loaded by the host and its running version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    path: PathBuf,
    current_version: BuildVersion,
}

#[derive(Deserialize)]
struct PluginDescriptor {
    version: BuildVersion,
}

impl LocalArtifact {
    /// Artifact whose version the host already knows
    pub fn new(path: impl Into<PathBuf>, current_version: impl Into<BuildVersion>) -> Self {
        Self {
            path: path.into(),
            current_version: current_version.into(),
        }
    }

    /// Read the running version from the `plugin.yml` inside a plugin jar
    pub fn from_plugin_jar(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current_version = read_descriptor_version(&path).map_err(|e| {
            UpdateError::invalid_config(format!(
                "Cannot read version from {}: {:#}",
                path.display(),
                e
            ))
        })?;

        debug!(
            "Loaded artifact {} at version {}",
            path.display(),
            current_version
        );

        Ok(Self {
            path,
            current_version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_version(&self) -> &BuildVersion {
        &self.current_version
    }

    /// File name of the artifact, used for temp and pending file names
    pub fn file_name(&self) -> Result<&str> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UpdateError::invalid_config(format!(
                    "Artifact path has no usable file name: {}",
                    self.path.display()
                ))
            })
    }

    /// Directory holding the artifact; temp files are created here so the
    /// final rename stays on one volume
    pub fn directory(&self) -> Result<&Path> {
        match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
            Some(parent) => Ok(parent),
            None => Err(UpdateError::invalid_config(format!(
                "Artifact path has no parent directory: {}",
                self.path.display()
            ))),
        }
    }
}

fn read_descriptor_version(path: &Path) -> anyhow::Result<BuildVersion> {
    let file = File::open(path).context("Failed to open artifact")?;
    let mut archive = zip::ZipArchive::new(file).context("Artifact is not a jar archive")?;

    let mut entry = archive
        .by_name(PLUGIN_DESCRIPTOR)
        .map_err(|_| anyhow!("{} not found in artifact", PLUGIN_DESCRIPTOR))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", PLUGIN_DESCRIPTOR))?;

    let descriptor: PluginDescriptor = serde_yaml_ng::from_str(&content)
        .with_context(|| format!("Failed to parse {}", PLUGIN_DESCRIPTOR))?;

    Ok(descriptor.version)
}
