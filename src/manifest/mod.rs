//! Manifest file detection and parsing
//!
//! This module provides functionality to:
//! - Detect the project manifest in a directory (one level of subdirectories)
//! - Parse declared dependencies from every supported manifest format
//! - Recover what it can from malformed manifests instead of failing

mod cargo_toml;
mod detector;
mod gemfile;
mod go_mod;
mod package_json;
mod pyproject_toml;
mod requirements_txt;
pub mod toml_lite;

pub use cargo_toml::CargoTomlParser;
pub use detector::{detect_project, DetectedProject};
pub use gemfile::GemfileParser;
pub use go_mod::GoModParser;
pub use package_json::PackageJsonParser;
pub use pyproject_toml::PyprojectTomlParser;
pub use requirements_txt::RequirementsTxtParser;

use crate::domain::{DependencyMap, Ecosystem};
use crate::error::ManifestError;
use std::path::Path;

/// Trait for parsing manifest files.
///
/// Parsers never fail: entries that cannot be understood are skipped.
pub trait ManifestParser {
    /// Parse declared dependencies from manifest content
    fn parse(&self, content: &str) -> DependencyMap;

    /// Returns the manifest filename this parser handles
    fn filename(&self) -> &'static str;
}

/// Get a manifest parser for the specified manifest filename
pub fn get_parser(filename: &str) -> Option<Box<dyn ManifestParser>> {
    match filename {
        "package.json" => Some(Box::new(PackageJsonParser)),
        "Cargo.toml" => Some(Box::new(CargoTomlParser)),
        "requirements.txt" => Some(Box::new(RequirementsTxtParser)),
        "pyproject.toml" => Some(Box::new(PyprojectTomlParser)),
        "go.mod" => Some(Box::new(GoModParser)),
        "Gemfile" => Some(Box::new(GemfileParser)),
        _ => None,
    }
}

/// Parse manifest content for an ecosystem.
///
/// Returns an empty map when the filename does not belong to the ecosystem.
pub fn parse_manifest(ecosystem: Ecosystem, content: &str, filename: &str) -> DependencyMap {
    if !ecosystem.descriptor().manifest_files.contains(&filename) {
        tracing::debug!(%ecosystem, filename, "manifest does not belong to ecosystem");
        return DependencyMap::new();
    }

    match get_parser(filename) {
        Some(parser) => parser.parse(content),
        None => DependencyMap::new(),
    }
}

/// Read a manifest file
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Version of a TOML dependency value: a bare string or a table's `version` key
fn toml_dependency_version(value: &toml::Value) -> Option<&str> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Table(table) => table.get("version").and_then(|v| v.as_str()),
        _ => None,
    }
}

/// Insert every versioned entry of a TOML table, skipping `excluded` keys
fn collect_toml_table(table: &toml::Table, excluded: &[&str], deps: &mut DependencyMap) {
    for (name, value) in table {
        if excluded.contains(&name.as_str()) {
            continue;
        }
        match toml_dependency_version(value) {
            Some(version) => {
                deps.insert(name.clone(), version.to_string());
            }
            None => tracing::debug!(name = %name, "skipping dependency without version"),
        }
    }
}

/// Same as [`collect_toml_table`] for a salvaged [`toml_lite`] section
fn collect_lite_section(
    entries: &[(String, toml_lite::LiteValue)],
    excluded: &[&str],
    deps: &mut DependencyMap,
) {
    for (name, value) in entries {
        if excluded.contains(&name.as_str()) {
            continue;
        }
        if let Some(version) = value.dependency_version() {
            deps.insert(name.clone(), version.to_string());
        }
    }
}
