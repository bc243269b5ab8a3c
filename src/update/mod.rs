//! Update classification for declared dependencies
//!
//! This module provides:
//! - Version normalization (operator stripping, `v` prefix, zero padding)
//! - Update classification (patch/minor/major/unknown)
//! - Assembly of [`PackageUpdateInfo`] records from registry metadata

mod version;

pub use version::{current_version_from_constraint, parse_version};

use crate::domain::{Ecosystem, PackageUpdateInfo, RegistryMetadata, UpdateType};
use version::precedence;

/// Severity of an available update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub update_type: UpdateType,
    pub has_breaking_change: bool,
}

/// Classify the change from `current` to `latest`.
///
/// Returns `None` when there is nothing to update: equal versions, or a
/// semver `latest` that does not exceed `current`. Versions that are not
/// semver are compared as strings and any difference counts as a breaking
/// change of unknown severity.
pub fn classify(current: &str, latest: &str) -> Option<Classification> {
    match (parse_version(current), parse_version(latest)) {
        (Some(cur), Some(lat)) => {
            if precedence(&lat) <= precedence(&cur) {
                return None;
            }

            let update_type = if lat.major != cur.major {
                UpdateType::Major
            } else if lat.minor != cur.minor {
                UpdateType::Minor
            } else {
                // Equal components with a newer release or pre-release
                UpdateType::Patch
            };

            Some(Classification {
                update_type,
                has_breaking_change: update_type == UpdateType::Major,
            })
        }
        _ if current.trim() == latest.trim() => None,
        _ => Some(Classification {
            update_type: UpdateType::Unknown,
            has_breaking_change: true,
        }),
    }
}

/// Decides whether a declared dependency has an update and builds its record
pub struct UpdateJudge {
    ecosystem: Ecosystem,
    package_manager_name: String,
}

impl UpdateJudge {
    /// Create a judge for one ecosystem and package manager
    pub fn new(ecosystem: Ecosystem, package_manager_name: impl Into<String>) -> Self {
        Self {
            ecosystem,
            package_manager_name: package_manager_name.into(),
        }
    }

    /// Build the update record for `name`, or `None` if it is up to date
    pub fn judge(
        &self,
        name: &str,
        constraint: &str,
        metadata: RegistryMetadata,
    ) -> Option<PackageUpdateInfo> {
        let current_version = current_version_from_constraint(constraint);
        let classification = classify(&current_version, &metadata.latest_version)?;

        let mut notes = Vec::new();
        match classification.update_type {
            UpdateType::Major => notes.push(format!(
                "major version change from {} to {}",
                current_version, metadata.latest_version
            )),
            UpdateType::Unknown => notes.push(format!(
                "{} and {} are not comparable as semantic versions",
                current_version, metadata.latest_version
            )),
            UpdateType::Patch | UpdateType::Minor => {}
        }
        if metadata.is_deprecated {
            notes.push(match &metadata.deprecation_message {
                Some(message) => format!("deprecated: {}", message),
                None => "deprecated".to_string(),
            });
        }

        Some(PackageUpdateInfo {
            name: name.to_string(),
            current_version,
            latest_version: metadata.latest_version.clone(),
            ecosystem: self.ecosystem,
            package_manager_name: self.package_manager_name.clone(),
            update_type: classification.update_type,
            has_breaking_change: classification.has_breaking_change,
            breaking_change_notes: notes,
            is_deprecated: metadata.is_deprecated,
            metadata,
        })
    }

    /// Record for a package whose latest version could not be determined
    pub fn lookup_failure(&self, name: &str, constraint: &str, reason: &str) -> PackageUpdateInfo {
        let metadata = RegistryMetadata::unknown();
        PackageUpdateInfo {
            name: name.to_string(),
            current_version: current_version_from_constraint(constraint),
            latest_version: metadata.latest_version.clone(),
            ecosystem: self.ecosystem,
            package_manager_name: self.package_manager_name.clone(),
            update_type: UpdateType::Unknown,
            has_breaking_change: false,
            breaking_change_notes: vec![format!("latest version lookup failed: {}", reason)],
            is_deprecated: false,
            metadata,
        }
    }
}
