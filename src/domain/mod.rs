//! Core domain models for depscout
//!
//! This module contains the fundamental types used throughout the application:
//! - Ecosystem descriptors for supported package managers
//! - Declared dependency structures
//! - Normalized registry metadata
//! - Per-package update records
//! - Analysis and apply summaries

mod dependency;
mod ecosystem;
mod metadata;
mod report;
mod update_info;

pub use dependency::{DependencyDeclaration, DependencyMap, LATEST_CONSTRAINT};
pub use ecosystem::{manifest_priority, Ecosystem, EcosystemDescriptor, RegistryId, ECOSYSTEMS};
pub use metadata::{RegistryMetadata, UNKNOWN_VERSION};
pub use report::{AnalysisReport, ApplySummary, FailedUpdate, PackageLookup};
pub use update_info::{PackageUpdateInfo, UpdateType};
