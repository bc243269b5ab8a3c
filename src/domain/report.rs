//! Analysis and apply summaries handed to the presentation layer

use super::{Ecosystem, PackageUpdateInfo, RegistryMetadata};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A package looked up outside any detected project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLookup {
    pub name: String,
    pub metadata: RegistryMetadata,
}

/// Result of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Active ecosystem; `None` means no supported project was found
    pub ecosystem: Option<Ecosystem>,
    /// Package manager resolved for the project
    pub package_manager: Option<String>,
    /// Directory holding the detected manifest
    pub project_root: Option<PathBuf>,
    /// Available updates, sorted by package name
    pub updates: Vec<PackageUpdateInfo>,
    /// Requested packages absent from the manifest
    pub not_found: Vec<String>,
    /// Requested packages queried without a project
    pub lookups: Vec<PackageLookup>,
}

impl AnalysisReport {
    /// Report for a directory without a supported manifest
    pub fn no_project() -> Self {
        Self::default()
    }

    /// Returns true if a supported project was detected
    pub fn has_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Updates whose latest version could not be determined
    pub fn failed_lookups(&self) -> impl Iterator<Item = &PackageUpdateInfo> {
        self.updates.iter().filter(|u| u.is_lookup_failure())
    }

    /// Updates that can actually be applied
    pub fn actionable(&self) -> impl Iterator<Item = &PackageUpdateInfo> {
        self.updates.iter().filter(|u| !u.is_lookup_failure())
    }
}

/// A package the executor failed to update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpdate {
    pub name: String,
    pub reason: String,
}

/// Outcome of applying a batch of updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedUpdate>,
    pub skipped: Vec<String>,
    /// Breaking updates were not confirmed, so nothing ran
    #[serde(default)]
    pub confirmation_declined: bool,
}

impl ApplySummary {
    /// Summary for a batch that was never started because breaking updates
    /// were not confirmed; every update counts as skipped
    pub fn declined(updates: &[PackageUpdateInfo]) -> Self {
        Self {
            skipped: updates.iter().map(|u| u.name.clone()).collect(),
            confirmation_declined: true,
            ..Self::default()
        }
    }

    /// Returns true if every attempted update succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of packages the executor looked at
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }
}
