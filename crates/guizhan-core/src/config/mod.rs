//! Configuration loading

mod hierarchical_loader;

pub use hierarchical_loader::{HierarchicalConfigLoader, SETTINGS_FILE};
