//! Project detection
//!
//! Features:
//! - Checks manifest filenames in global priority order
//! - Falls back to one pass over immediate subdirectories (monorepo layouts)
//! - Never recurses deeper than one level

use crate::domain::{manifest_priority, Ecosystem, EcosystemDescriptor};
use std::path::{Path, PathBuf};

/// Directories never searched for manifests
const SKIPPED_DIRS: [&str; 1] = ["node_modules"];

/// A project located by [`detect_project`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedProject {
    /// Descriptor of the active ecosystem
    pub descriptor: &'static EcosystemDescriptor,
    /// Directory holding the manifest
    pub root: PathBuf,
    /// Manifest that triggered detection
    pub manifest: PathBuf,
}

impl DetectedProject {
    /// Active ecosystem
    pub fn ecosystem(&self) -> Ecosystem {
        self.descriptor.id
    }

    /// Every manifest of the active ecosystem present in the project root,
    /// in descriptor order
    pub fn manifest_paths(&self) -> Vec<PathBuf> {
        self.descriptor
            .manifest_files
            .iter()
            .map(|f| self.root.join(f))
            .filter(|p| p.is_file())
            .collect()
    }
}

/// Detect the project in `dir`.
///
/// Returns `None` when neither `dir` nor any of its immediate subdirectories
/// holds a supported manifest.
pub fn detect_project(dir: &Path) -> Option<DetectedProject> {
    if let Some(project) = detect_in(dir) {
        tracing::debug!(manifest = %project.manifest.display(), "detected project");
        return Some(project);
    }

    let project = subdirectories(dir).iter().find_map(|sub| detect_in(sub));
    match &project {
        Some(p) => tracing::debug!(manifest = %p.manifest.display(), "detected project in subdirectory"),
        None => tracing::debug!(dir = %dir.display(), "no supported manifest found"),
    }
    project
}

fn detect_in(dir: &Path) -> Option<DetectedProject> {
    manifest_priority().find_map(|(file, descriptor)| {
        let manifest = dir.join(file);
        manifest.is_file().then(|| DetectedProject {
            descriptor,
            root: dir.to_path_buf(),
            manifest,
        })
    })
}

/// Immediate subdirectories sorted by name, without hidden or skipped ones
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}
