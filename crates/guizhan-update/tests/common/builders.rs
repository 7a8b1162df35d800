//! Builder for build-info response bodies

use serde_json::{json, Value};

use super::constants::*;

/// Builds the JSON a mirror returns for the latest build
#[derive(Debug, Clone)]
pub struct BuildInfoBuilder {
    version: Value,
    download_url: String,
    checksum: Option<String>,
}

impl BuildInfoBuilder {
    pub fn new() -> Self {
        Self {
            version: json!(BUILD_13),
            download_url: ARTIFACT_PATH.to_string(),
            checksum: None,
        }
    }

    /// Numeric build identifier
    pub fn build(mut self, number: u64) -> Self {
        self.version = json!(number);
        self
    }

    /// Identifier as the mirror's display string, e.g. "Build 13"
    pub fn version_string(mut self, version: &str) -> Self {
        self.version = json!(version);
        self
    }

    pub fn download_url(mut self, url: &str) -> Self {
        self.download_url = url.to_string();
        self
    }

    pub fn checksum(mut self, checksum: &str) -> Self {
        self.checksum = Some(checksum.to_string());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "version": self.version,
            "downloadUrl": self.download_url,
        });
        if let Some(checksum) = &self.checksum {
            body["checksum"] = json!(checksum);
        }
        body
    }
}

impl Default for BuildInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}
