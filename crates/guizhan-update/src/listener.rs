//! Host callback interface

use tracing::{error, info, warn};

use crate::error::ErrorKind;
use crate::staging::StagedArtifact;
use crate::version::BuildInfo;

/// Receives the results of an update run
///
/// Each run ends with at most one `on_staged` or one `on_failed` call.
/// `on_update_available` fires before downloading, or as the only call in
/// check-only mode.
pub trait UpdateListener: Send + Sync {
    fn on_update_available(&self, build: &BuildInfo);

    fn on_staged(&self, staged: &StagedArtifact);

    fn on_failed(&self, kind: ErrorKind, detail: &str);
}

/// Listener that reports through `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingListener;

impl UpdateListener for TracingListener {
    fn on_update_available(&self, build: &BuildInfo) {
        info!("New build available: {}", build.version);
    }

    fn on_staged(&self, staged: &StagedArtifact) {
        if staged.deferred {
            warn!(
                "Update staged at {}; it will be applied on next startup",
                staged.path.display()
            );
        } else {
            info!(
                "Update installed to {}; restart to load it",
                staged.path.display()
            );
        }
    }

    fn on_failed(&self, kind: ErrorKind, detail: &str) {
        error!("Update failed ({}): {}", kind, detail);
    }
}
