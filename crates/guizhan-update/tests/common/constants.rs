//! Shared constants for test infrastructure

// Project coordinates
pub const OWNER: &str = "ybw0014";
pub const REPO: &str = "GuizhanLibPlugin";
pub const BRANCH: &str = "master";

/// Path of the build-info endpoint on the mock mirror
pub const LATEST_PATH: &str = "/api/ybw0014/GuizhanLibPlugin/master/latest";

/// Path the mock mirror serves artifacts from
pub const ARTIFACT_PATH: &str = "/f/ybw0014/GuizhanLibPlugin/master/GuizhanLibPlugin.jar";

pub const ARTIFACT_NAME: &str = "GuizhanLibPlugin.jar";

// Build numbers
pub const BUILD_12: u64 = 12;
pub const BUILD_13: u64 = 13;

// Artifact content
pub const OLD_CONTENT: &[u8] = b"old artifact build 12";
pub const NEW_CONTENT: &[u8] = b"new artifact build 13 with a longer body";

pub const WRONG_CHECKSUM: &str = "0000000000000000000000000000000000000000000000000000000000000000";
