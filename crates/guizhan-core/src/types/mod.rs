//! Type definitions shared by the updater crates

pub mod mirror;
pub mod project;
pub mod settings;

pub use mirror::{Mirror, MirrorKind};
pub use project::ProjectRef;
pub use settings::{NetworkConfig, StagingConfig, UpdateMode, UpdaterSettings};
