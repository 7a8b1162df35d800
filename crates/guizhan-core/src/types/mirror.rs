//! Build mirrors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Base URL of the global Guizhan Builds service
pub const GLOBAL_BASE_URL: &str = "https://builds.guizhanss.net";

/// Base URL of the mainland China mirror
pub const CHINA_BASE_URL: &str = "https://builds.guizhanss.cn";

/// A network endpoint serving build metadata and artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    base_url: String,
    language_tag: String,
}

impl Mirror {
    /// Create a mirror from a base URL and a language tag
    ///
    /// A trailing slash on the base URL is dropped.
    pub fn new(base_url: impl Into<String>, language_tag: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            language_tag: language_tag.into(),
        }
    }

    /// The global mirror (`en-US`)
    pub fn global() -> Self {
        Self::new(GLOBAL_BASE_URL, "en-US")
    }

    /// The mainland China mirror (`zh-CN`)
    pub fn china() -> Self {
        Self::new(CHINA_BASE_URL, "zh-CN")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_url, self.language_tag)
    }
}

/// Mirror selection as it appears in configuration
///
/// `global` and `china` name the well-known mirrors; any `http(s)://` URL
/// selects a self-hosted mirror.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MirrorKind {
    #[default]
    Global,
    China,
    Custom(String),
}

impl MirrorKind {
    /// Resolve the selection to a concrete mirror
    pub fn resolve(&self) -> Mirror {
        match self {
            MirrorKind::Global => Mirror::global(),
            MirrorKind::China => Mirror::china(),
            MirrorKind::Custom(url) => Mirror::new(url.clone(), "en-US"),
        }
    }
}

impl FromStr for MirrorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "global" | "net" => Ok(MirrorKind::Global),
            "china" | "cn" => Ok(MirrorKind::China),
            _ if lower.starts_with("http://") || lower.starts_with("https://") => {
                Ok(MirrorKind::Custom(trimmed.to_string()))
            }
            _ => Err(Error::invalid_config(format!(
                "Unknown mirror '{}'. Expected 'global', 'china' or an http(s) URL",
                s
            ))),
        }
    }
}

impl fmt::Display for MirrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorKind::Global => write!(f, "global"),
            MirrorKind::China => write!(f, "china"),
            MirrorKind::Custom(url) => write!(f, "{}", url),
        }
    }
}

impl Serialize for MirrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MirrorKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
