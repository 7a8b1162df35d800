//! Build versions, build metadata and version comparison
//!
//! Build servers identify artifacts by build number. The comparator only
//! answers "same build or not": it never decides that one build is older than
//! another, so a mirror that rolls back is followed rather than second-guessed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque version token as reported by a mirror or embedded in an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildVersion(String);

impl BuildVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build number, if the token is numeric or of the form `Build <n>`
    pub fn build_number(&self) -> Option<u64> {
        if let Ok(n) = self.0.parse::<u64>() {
            return Some(n);
        }

        let rest = self
            .0
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("build"))
            .map(|_| self.0[5..].trim_start())?;
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);

        if digits.is_empty() || !(tail.is_empty() || tail.starts_with(char::is_whitespace)) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<u64> for BuildVersion {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for BuildVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            // YAML reads `version: 1.0` as a float
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => BuildVersion::from(n),
            Raw::Float(f) => BuildVersion(format!("{:?}", f)),
            Raw::Text(s) => BuildVersion::new(s),
        })
    }
}

/// Latest build metadata returned by a mirror
///
/// Unknown fields in the response are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Build number or version token
    pub version: BuildVersion,

    /// Where the artifact can be fetched
    #[serde(alias = "download_url")]
    pub download_url: String,

    /// SHA-256 digest of the artifact (hex)
    #[serde(default, alias = "sha256")]
    pub checksum: Option<String>,
}

/// Outcome of comparing the local and remote versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    UpToDate,
    UpdateAvailable,
}

/// Compare the running version with the mirror's latest version
///
/// Numeric build identifiers are compared by value (`"012"` equals `12`,
/// `"Build 12"` equals `12`); anything else by exact text. Inequality in
/// either direction means an update is available.
pub fn compare(local: &BuildVersion, remote: &BuildVersion) -> Comparison {
    let same = match (local.build_number(), remote.build_number()) {
        (Some(a), Some(b)) => a == b,
        _ => local.as_str() == remote.as_str(),
    };

    if same {
        Comparison::UpToDate
    } else {
        Comparison::UpdateAvailable
    }
}
