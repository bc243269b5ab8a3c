//! Normalized registry metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version string used when no registry or package manager could answer
pub const UNKNOWN_VERSION: &str = "unknown";

/// Registry lookup result, normalized across registries.
///
/// Only `latest_version` and `is_deprecated` are always meaningful; the other
/// fields depend on what the registry exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    pub latest_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub maintainers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

impl RegistryMetadata {
    /// Metadata carrying only a version
    pub fn with_version(latest_version: impl Into<String>) -> Self {
        Self {
            latest_version: latest_version.into(),
            ..Self::default()
        }
    }

    /// Metadata for a package whose latest version could not be determined
    pub fn unknown() -> Self {
        Self::with_version(UNKNOWN_VERSION)
    }

    /// Returns true if the latest version is unknown
    pub fn is_unknown(&self) -> bool {
        self.latest_version == UNKNOWN_VERSION
    }

    /// Mark this metadata as deprecated
    pub fn deprecated(mut self, message: Option<String>) -> Self {
        self.is_deprecated = true;
        self.deprecation_message = message.filter(|m| !m.is_empty());
        self
    }
}
