//! # guizhan-core
//!
//! Core library for the Guizhan Builds updater providing:
//! - Project references (owner/repo/branch) with validation
//! - Build mirrors as plain data
//! - Update mode and runtime settings types
//! - Hierarchical configuration loading (embedded defaults, file, env)

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{Mirror, MirrorKind, ProjectRef, UpdateMode, UpdaterSettings};
