//! One check-and-update pass
//!
//! The updater is built once per run by the host, which owns it and passes it
//! where needed. A run walks the states
//!
//! ```text
//! Idle -> Checking -> UpToDate
//!                  -> UpdateReported                (check-only mode)
//!                  -> Downloading -> Staged
//!                  -> Failed                        (from any step)
//! ```
//!
//! and never retries; scheduling another run is the host's decision.

use guizhan_core::{Mirror, ProjectRef, UpdateMode, UpdaterSettings};
use std::path::{Component, Path};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::artifact::LocalArtifact;
use crate::checker::BuildChecker;
use crate::download::ArtifactDownloader;
use crate::error::{ErrorKind, Result, UpdateError};
use crate::listener::{TracingListener, UpdateListener};
use crate::staging::{StagedArtifact, Stager};
use crate::version::{compare, BuildInfo, BuildVersion, Comparison};

/// Updater state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Checking,
    Downloading,
    UpToDate,
    UpdateReported,
    Staged,
    Failed,
}

impl UpdateState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpdateState::UpToDate
                | UpdateState::UpdateReported
                | UpdateState::Staged
                | UpdateState::Failed
        )
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The mirror's latest build is the running one
    UpToDate { version: BuildVersion },

    /// A different build exists; check-only mode stops here
    UpdateAvailable { build: BuildInfo },

    /// The new build is on disk
    Staged {
        build: BuildInfo,
        staged: StagedArtifact,
    },

    /// The run was aborted
    Failed { kind: ErrorKind, detail: String },
}

impl RunOutcome {
    /// Terminal state matching this outcome
    pub fn state(&self) -> UpdateState {
        match self {
            RunOutcome::UpToDate { .. } => UpdateState::UpToDate,
            RunOutcome::UpdateAvailable { .. } => UpdateState::UpdateReported,
            RunOutcome::Staged { .. } => UpdateState::Staged,
            RunOutcome::Failed { .. } => UpdateState::Failed,
        }
    }
}

/// Outcome of a run together with the states it passed through
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub transitions: Vec<UpdateState>,
}

impl RunReport {
    pub fn state(&self) -> UpdateState {
        self.outcome.state()
    }
}

/// Updater for a single project and artifact
pub struct BuildUpdater {
    project: ProjectRef,
    artifact: LocalArtifact,
    mode: UpdateMode,
    checker: BuildChecker,
    downloader: ArtifactDownloader,
    stager: Stager,
    listener: Arc<dyn UpdateListener>,
    state: UpdateState,
    transitions: Vec<UpdateState>,
}

impl BuildUpdater {
    /// Start configuring an updater for `project` and the running `artifact`
    pub fn builder(project: ProjectRef, artifact: LocalArtifact) -> BuildUpdaterBuilder {
        BuildUpdaterBuilder::new(project, artifact)
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    pub fn artifact(&self) -> &LocalArtifact {
        &self.artifact
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn mirror(&self) -> &Mirror {
        self.checker.mirror()
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Run the pass on the tokio runtime without blocking the caller
    pub fn spawn(self) -> JoinHandle<RunReport> {
        tokio::spawn(self.run())
    }

    /// Perform one check-and-update pass
    ///
    /// Steps:
    /// 1. Ask the mirror for the latest build
    /// 2. Compare it with the running version
    /// 3. Report the new build to the listener
    /// 4. Download and validate it (check-and-download mode only)
    /// 5. Replace the artifact, or park the file for the next startup
    ///
    /// Errors never escape: they end the run as `Failed` and are reported to
    /// the listener exactly once.
    pub async fn run(mut self) -> RunReport {
        info!(
            "Checking {} for updates on {} (running {})",
            self.project,
            self.checker.mirror(),
            self.artifact.current_version()
        );

        let outcome = match self.execute().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.transition(UpdateState::Failed);
                self.listener.on_failed(e.kind(), e.detail());
                RunOutcome::Failed {
                    kind: e.kind(),
                    detail: e.detail().to_string(),
                }
            }
        };

        RunReport {
            outcome,
            transitions: self.transitions,
        }
    }

    async fn execute(&mut self) -> Result<RunOutcome> {
        self.transition(UpdateState::Checking);
        let build = self.checker.latest(&self.project).await?;
        let local = self.artifact.current_version();

        if compare(local, &build.version) == Comparison::UpToDate {
            info!("{} is up to date ({})", self.project, local);
            self.transition(UpdateState::UpToDate);
            return Ok(RunOutcome::UpToDate {
                version: build.version,
            });
        }

        if let (Some(running), Some(latest)) = (local.build_number(), build.version.build_number())
        {
            if latest < running {
                warn!(
                    "Mirror reports build {} for {}, lower than running build {}",
                    latest, self.project, running
                );
            }
        }

        self.listener.on_update_available(&build);

        if !self.mode.downloads() {
            self.transition(UpdateState::UpdateReported);
            return Ok(RunOutcome::UpdateAvailable { build });
        }

        self.transition(UpdateState::Downloading);
        let download = self
            .downloader
            .download(
                &build,
                self.artifact.directory()?,
                self.artifact.file_name()?,
            )
            .await?;

        let staged = self.stager.stage(download, &self.artifact)?;
        self.transition(UpdateState::Staged);
        self.listener.on_staged(&staged);

        Ok(RunOutcome::Staged { build, staged })
    }

    fn transition(&mut self, next: UpdateState) {
        debug!("Updater state: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }
}

/// Builder for [`BuildUpdater`]
///
/// Settings usually come from `HierarchicalConfigLoader::load_settings`;
/// individual setters override them.
pub struct BuildUpdaterBuilder {
    project: ProjectRef,
    artifact: LocalArtifact,
    settings: UpdaterSettings,
    mirror: Option<Mirror>,
    check_timeout: Option<Duration>,
    download_timeout: Option<Duration>,
    listener: Option<Arc<dyn UpdateListener>>,
    client: Option<reqwest::Client>,
}

impl BuildUpdaterBuilder {
    fn new(project: ProjectRef, artifact: LocalArtifact) -> Self {
        Self {
            project,
            artifact,
            settings: UpdaterSettings::default(),
            mirror: None,
            check_timeout: None,
            download_timeout: None,
            listener: None,
            client: None,
        }
    }

    /// Replace all settings
    pub fn settings(mut self, settings: UpdaterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a specific mirror instead of the configured one
    pub fn mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn mode(mut self, mode: UpdateMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Timeout for the version-check request, taking precedence over settings
    pub fn check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    /// Timeout for the artifact download, taking precedence over settings
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = Some(timeout);
        self
    }

    pub fn pending_dir(mut self, dir: impl Into<String>) -> Self {
        self.settings.staging.pending_dir = dir.into();
        self
    }

    pub fn listener(mut self, listener: Arc<dyn UpdateListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Share an existing HTTP client; the configured user agent is then not applied
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validate the configuration and build the updater
    ///
    /// Fails with `InvalidConfig` when a timeout is missing or zero, or the
    /// artifact path cannot host a sibling temp file.
    pub fn build(self) -> Result<BuildUpdater> {
        let check_timeout = match self.check_timeout {
            Some(timeout) => positive_timeout("check timeout", timeout)?,
            None => self.settings.network.check_timeout()?,
        };
        let download_timeout = match self.download_timeout {
            Some(timeout) => positive_timeout("download timeout", timeout)?,
            None => self.settings.network.download_timeout()?,
        };

        self.artifact.file_name()?;
        self.artifact.directory()?;

        validate_pending_dir(&self.settings.staging.pending_dir)?;

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(self.settings.network.user_agent())
                .connect_timeout(check_timeout)
                .build()
                .map_err(|e| {
                    UpdateError::invalid_config(format!("Failed to create HTTP client: {}", e))
                })?,
        };

        let mirror = self
            .mirror
            .unwrap_or_else(|| self.settings.mirror.resolve());

        debug!(
            "Updater initialized: project={}, artifact={:?}, mirror={}, mode={:?}",
            self.project,
            self.artifact.path(),
            mirror,
            self.settings.mode
        );

        Ok(BuildUpdater {
            project: self.project,
            artifact: self.artifact,
            mode: self.settings.mode,
            checker: BuildChecker::new(client.clone(), mirror, check_timeout),
            downloader: ArtifactDownloader::new(client, download_timeout),
            stager: Stager::new(self.settings.staging.pending_dir),
            listener: self
                .listener
                .unwrap_or_else(|| Arc::new(TracingListener) as Arc<dyn UpdateListener>),
            state: UpdateState::Idle,
            transitions: Vec::new(),
        })
    }
}

/// The pending directory must be a plain relative path below the artifact's
/// directory so the deferred rename stays on the same volume
fn validate_pending_dir(dir: &str) -> Result<()> {
    let path = Path::new(dir);
    let plain = !dir.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

    if plain {
        Ok(())
    } else {
        Err(UpdateError::invalid_config(format!(
            "staging.pending-dir must be a relative directory without '.' or '..', got '{}'",
            dir
        )))
    }
}

fn positive_timeout(name: &str, timeout: Duration) -> Result<Duration> {
    if timeout.is_zero() {
        return Err(UpdateError::invalid_config(format!(
            "{} must be positive",
            name
        )));
    }
    Ok(timeout)
}
