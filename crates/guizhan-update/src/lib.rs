//! Self-update for plugins published on Guizhan Builds
//!
//! Provides:
//! - Latest-build lookup on the global or China mirror
//! - Build identifier comparison
//! - Artifact download with length and SHA256 verification
//! - Atomic replacement of the artifact, or deferral to the next startup
//! - A per-run state machine reporting to host callbacks

pub mod artifact;
pub mod checker;
pub mod download;
pub mod error;
pub mod listener;
pub mod staging;
pub mod updater;
pub mod version;

pub use artifact::LocalArtifact;
pub use checker::BuildChecker;
pub use download::{ArtifactDownloader, DownloadedArtifact};
pub use error::{ErrorKind, Result, UpdateError};
pub use listener::{TracingListener, UpdateListener};
pub use staging::{apply_pending, StagedArtifact, Stager};
pub use updater::{BuildUpdater, BuildUpdaterBuilder, RunOutcome, RunReport, UpdateState};
pub use version::{compare, BuildInfo, BuildVersion, Comparison};

pub use guizhan_core::{Mirror, MirrorKind, ProjectRef, UpdateMode, UpdaterSettings};

/// Updater library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
