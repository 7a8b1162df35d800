//! Common test infrastructure for guizhan-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Project coordinates, build numbers, artifact content
//! - `builders`: Fluent builder for mirror build-info responses
//! - `mock_server`: Wiremock setup helpers for the mirror API
//! - `listener`: Listener that records every callback

// Not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod listener;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use listener::*;
pub use mock_server::*;

use guizhan_update::{BuildUpdater, LocalArtifact, Mirror, ProjectRef, UpdateMode};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Lowercase hex SHA256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// The project every test checks
pub fn test_project() -> ProjectRef {
    ProjectRef::new(OWNER, REPO, BRANCH).unwrap()
}

/// Write `content` as the running artifact and describe it
pub fn install_artifact(dir: &Path, build: u64, content: &[u8]) -> LocalArtifact {
    let path = dir.join(ARTIFACT_NAME);
    std::fs::write(&path, content).unwrap();
    LocalArtifact::new(path, build)
}

/// Route library logs to the test output; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Updater pointed at the mock mirror with short timeouts
pub fn updater_for(
    server_uri: &str,
    artifact: LocalArtifact,
    mode: UpdateMode,
    listener: Arc<RecordingListener>,
) -> BuildUpdater {
    init_tracing();
    BuildUpdater::builder(test_project(), artifact)
        .mirror(Mirror::new(server_uri, "en-US"))
        .mode(mode)
        .check_timeout(Duration::from_secs(5))
        .download_timeout(Duration::from_secs(10))
        .listener(listener)
        .build()
        .unwrap()
}
