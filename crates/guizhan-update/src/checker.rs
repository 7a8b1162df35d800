//! Version-check client for Guizhan Builds mirrors

use anyhow::{anyhow, Context};
use guizhan_core::{Mirror, ProjectRef};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::version::BuildInfo;

/// Queries a mirror for the latest build of a project
pub struct BuildChecker {
    client: reqwest::Client,
    mirror: Mirror,
    timeout: Duration,
}

impl BuildChecker {
    /// Create a checker bound to one mirror
    ///
    /// `timeout` bounds the whole request, connect to last body byte.
    pub fn new(client: reqwest::Client, mirror: Mirror, timeout: Duration) -> Self {
        Self {
            client,
            mirror,
            timeout,
        }
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build-info endpoint for a project
    pub fn latest_url(&self, project: &ProjectRef) -> String {
        format!(
            "{}/api/{}/{}/{}/latest",
            self.mirror.base_url(),
            project.owner(),
            project.repo(),
            project.branch()
        )
    }

    /// Fetch the latest build of `project`
    ///
    /// Every failure (transport, timeout, status, body) is a `CheckFailed`.
    pub async fn latest(&self, project: &ProjectRef) -> Result<BuildInfo> {
        self.fetch_latest(project)
            .await
            .map_err(UpdateError::check_failed)
    }

    async fn fetch_latest(&self, project: &ProjectRef) -> anyhow::Result<BuildInfo> {
        let url = self.latest_url(project);
        debug!("Fetching latest build from: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.mirror.base_url()))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Mirror returned {} for {}",
                response.status(),
                project
            ));
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read build info")?;
        let mut info: BuildInfo =
            serde_json::from_slice(&body).context("Malformed build info response")?;

        info.download_url = self.resolve_download_url(&info.download_url)?;
        Ok(info)
    }

    /// Mirrors may answer with a path on the same host
    fn resolve_download_url(&self, raw: &str) -> anyhow::Result<String> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw.to_string())
        } else if raw.starts_with('/') {
            Ok(format!("{}{}", self.mirror.base_url(), raw))
        } else {
            Err(anyhow!("Unsupported download URL in build info: '{}'", raw))
        }
    }
}
