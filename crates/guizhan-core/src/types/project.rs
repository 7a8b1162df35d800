//! Project reference identifying a build stream

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("segment regex is valid"));

/// Owner, repository and branch of a project published on a build mirror
///
/// Fields are validated once in [`ProjectRef::new`] and never change afterwards,
/// so every other component can splice them into URLs without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectRef {
    owner: String,
    repo: String,
    branch: String,
}

impl ProjectRef {
    /// Create a validated project reference
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self> {
        let owner = validate_segment("owner", owner.into())?;
        let repo = validate_segment("repo", repo.into())?;
        let branch = validate_segment("branch", branch.into())?;

        Ok(Self {
            owner,
            repo,
            branch,
        })
    }

    /// Repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Tracked branch
    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.branch)
    }
}

impl<'de> Deserialize<'de> for ProjectRef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            owner: String,
            repo: String,
            branch: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        ProjectRef::new(raw.owner, raw.repo, raw.branch).map_err(serde::de::Error::custom)
    }
}

fn validate_segment(field: &'static str, value: String) -> Result<String> {
    if SEGMENT_RE.is_match(&value) {
        Ok(value)
    } else {
        Err(Error::invalid_project_ref(field, value))
    }
}
