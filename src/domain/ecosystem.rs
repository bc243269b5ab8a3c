//! Ecosystem descriptors for supported package ecosystems
//!
//! A single static table drives detection priority, manifest parsing,
//! registry client selection and package-manager selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported language/package-manager ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// JavaScript/TypeScript (package.json)
    JavaScript,
    /// Rust (Cargo.toml)
    Rust,
    /// Python (requirements.txt, pyproject.toml)
    Python,
    /// Go (go.mod)
    Go,
    /// Ruby (Gemfile)
    Ruby,
}

/// Registry client identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryId {
    Npm,
    CratesIo,
    PyPI,
    GoProxy,
    RubyGems,
    /// Best-effort JSON endpoint for registries without a dedicated client
    Generic,
}

/// Static description of one ecosystem
#[derive(Debug, PartialEq, Eq)]
pub struct EcosystemDescriptor {
    /// Stable identifier
    pub id: Ecosystem,
    /// Candidate manifest filenames, in priority order
    pub manifest_files: &'static [&'static str],
    /// Human-readable label of the primary package manager family
    pub package_manager_name: &'static str,
    /// Registry client to query
    pub registry_id: RegistryId,
}

/// Descriptor table. Table order is the global detection priority.
pub static ECOSYSTEMS: [EcosystemDescriptor; 5] = [
    EcosystemDescriptor {
        id: Ecosystem::JavaScript,
        manifest_files: &["package.json"],
        package_manager_name: "npm/pnpm/yarn",
        registry_id: RegistryId::Npm,
    },
    EcosystemDescriptor {
        id: Ecosystem::Rust,
        manifest_files: &["Cargo.toml"],
        package_manager_name: "cargo",
        registry_id: RegistryId::CratesIo,
    },
    EcosystemDescriptor {
        id: Ecosystem::Python,
        manifest_files: &["requirements.txt", "pyproject.toml"],
        package_manager_name: "pip/poetry",
        registry_id: RegistryId::PyPI,
    },
    EcosystemDescriptor {
        id: Ecosystem::Go,
        manifest_files: &["go.mod"],
        package_manager_name: "go",
        registry_id: RegistryId::GoProxy,
    },
    EcosystemDescriptor {
        id: Ecosystem::Ruby,
        manifest_files: &["Gemfile"],
        package_manager_name: "bundler",
        registry_id: RegistryId::RubyGems,
    },
];

impl Ecosystem {
    /// Returns the static descriptor for this ecosystem
    pub fn descriptor(self) -> &'static EcosystemDescriptor {
        ECOSYSTEMS
            .iter()
            .find(|d| d.id == self)
            .unwrap_or(&ECOSYSTEMS[0])
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::JavaScript => "JavaScript/TypeScript",
            Ecosystem::Rust => "Rust",
            Ecosystem::Python => "Python",
            Ecosystem::Go => "Go",
            Ecosystem::Ruby => "Ruby",
        }
    }

    /// Returns all supported ecosystems in priority order
    pub fn all() -> impl Iterator<Item = Ecosystem> {
        ECOSYSTEMS.iter().map(|d| d.id)
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl EcosystemDescriptor {
    /// Find the descriptor owning a manifest filename
    pub fn for_manifest(filename: &str) -> Option<&'static EcosystemDescriptor> {
        ECOSYSTEMS
            .iter()
            .find(|d| d.manifest_files.contains(&filename))
    }
}

/// Global manifest priority: every descriptor's files, in table order
pub fn manifest_priority() -> impl Iterator<Item = (&'static str, &'static EcosystemDescriptor)> {
    ECOSYSTEMS
        .iter()
        .flat_map(|d| d.manifest_files.iter().map(move |f| (*f, d)))
}
