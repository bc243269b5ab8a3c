//! Per-package update records produced by the analyzer

use super::{Ecosystem, RegistryMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an available update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Patch,
    Minor,
    Major,
    /// Versions could not be compared as semver
    Unknown,
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateType::Patch => "patch",
            UpdateType::Minor => "minor",
            UpdateType::Major => "major",
            UpdateType::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One available update for a declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUpdateInfo {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub ecosystem: Ecosystem,
    pub package_manager_name: String,
    pub update_type: UpdateType,
    pub has_breaking_change: bool,
    #[serde(default)]
    pub breaking_change_notes: Vec<String>,
    pub is_deprecated: bool,
    pub metadata: RegistryMetadata,
}

impl PackageUpdateInfo {
    /// Returns true if the latest version could not be determined
    pub fn is_lookup_failure(&self) -> bool {
        self.metadata.is_unknown()
    }
}

impl fmt::Display for PackageUpdateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({})",
            self.name, self.current_version, self.latest_version, self.update_type
        )
    }
}
