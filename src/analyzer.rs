//! Update analyzer coordinating detection, parsing and registry lookups
//!
//! This module provides:
//! - Workflow coordination: detect → parse → fetch → classify
//! - Bounded parallel registry queries with per-lookup timeouts
//! - Package-manager CLI fallback when a registry cannot answer
//! - Single-package lookups outside any project

use crate::domain::{
    AnalysisReport, DependencyMap, Ecosystem, PackageLookup, PackageUpdateInfo, RegistryId,
    RegistryMetadata,
};
use crate::error::AnalyzerError;
use crate::manifest::{detect_project, parse_manifest, read_manifest, DetectedProject};
use crate::package_manager::{
    detect_tool, is_option_like, PackageManager, SystemPackageManager, Tool,
};
use crate::registry::{
    create_client, HttpClient, RegistryClient, RegistryEndpoints, DEFAULT_CRATES_IO_INTERVAL,
    DEFAULT_TIMEOUT,
};
use crate::update::UpdateJudge;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default number of concurrent registry lookups
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum number of registry lookups in flight
    pub concurrency: usize,
    /// Upper bound for a single registry lookup
    pub fetch_timeout: Duration,
    /// Registry base URLs
    pub endpoints: RegistryEndpoints,
    /// Minimum spacing between crates.io requests
    pub crates_io_interval: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_TIMEOUT,
            endpoints: RegistryEndpoints::default(),
            crates_io_interval: DEFAULT_CRATES_IO_INTERVAL,
        }
    }
}

impl AnalyzerConfig {
    /// Set the number of concurrent lookups (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-lookup timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the registry endpoints
    pub fn with_endpoints(mut self, endpoints: RegistryEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the crates.io request spacing
    pub fn with_crates_io_interval(mut self, interval: Duration) -> Self {
        self.crates_io_interval = interval;
        self
    }
}

/// Update analyzer
pub struct Analyzer {
    config: AnalyzerConfig,
    client: HttpClient,
    package_manager: Arc<dyn PackageManager>,
}

impl Analyzer {
    /// Create an analyzer using the system package managers for fallbacks
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let client = HttpClient::new().map_err(AnalyzerError::Client)?;
        Ok(Self {
            config,
            client,
            package_manager: Arc::new(SystemPackageManager::new()),
        })
    }

    /// Replace the package manager used for CLI fallbacks
    pub fn with_package_manager(mut self, package_manager: Arc<dyn PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    /// Package manager shared with the executor
    pub fn package_manager(&self) -> Arc<dyn PackageManager> {
        Arc::clone(&self.package_manager)
    }

    /// Analyze the project under `root`.
    ///
    /// With empty `targets` every declared dependency is checked; otherwise
    /// only the named ones, and names missing from the manifest are reported
    /// in `not_found`. Without a project, named packages are looked up on the
    /// npm registry and returned in `lookups`.
    pub async fn analyze(
        &self,
        root: &Path,
        targets: &[String],
    ) -> Result<AnalysisReport, AnalyzerError> {
        match detect_project(root) {
            Some(project) => self.analyze_project(&project, targets).await,
            None if targets.is_empty() => Ok(AnalysisReport::no_project()),
            None => {
                tracing::info!("no supported project found, looking up packages on npm");
                let (names, rejected): (Vec<String>, Vec<String>) =
                    dedup(targets).into_iter().partition(|n| !is_option_like(n));
                log_rejected(&rejected);
                Ok(AnalysisReport {
                    lookups: self.lookup_packages(root, &names).await,
                    not_found: rejected,
                    ..AnalysisReport::no_project()
                })
            }
        }
    }

    /// Analyze an already detected project
    pub async fn analyze_project(
        &self,
        project: &DetectedProject,
        targets: &[String],
    ) -> Result<AnalysisReport, AnalyzerError> {
        let ecosystem = project.ecosystem();
        let tool = detect_tool(ecosystem, &project.root);
        let declared = read_dependencies(project)?;

        let (candidates, not_found) = select_candidates(declared, targets);
        tracing::info!(
            ecosystem = %ecosystem,
            package_manager = %tool,
            packages = candidates.len(),
            "checking dependencies"
        );

        let registry = self.registry_client(project.descriptor.registry_id);
        let judge = UpdateJudge::new(ecosystem, tool.name());

        let mut updates: Vec<PackageUpdateInfo> = stream::iter(candidates)
            .map(|(name, constraint)| {
                let registry = registry.as_ref();
                let judge = &judge;
                async move {
                    match self
                        .resolve_latest(registry, tool, &name, &project.root)
                        .await
                    {
                        Ok(metadata) => judge.judge(&name, &constraint, metadata),
                        Err(reason) => Some(judge.lookup_failure(&name, &constraint, &reason)),
                    }
                }
            })
            .buffer_unordered(self.config.concurrency)
            .filter_map(|update| async move { update })
            .collect()
            .await;
        updates.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(AnalysisReport {
            ecosystem: Some(ecosystem),
            package_manager: Some(tool.name().to_string()),
            project_root: Some(project.root.clone()),
            updates,
            not_found,
            lookups: Vec::new(),
        })
    }

    /// Look up packages on the npm registry without a project
    async fn lookup_packages(&self, root: &Path, names: &[String]) -> Vec<PackageLookup> {
        let registry = self.registry_client(RegistryId::Npm);

        let mut lookups: Vec<PackageLookup> = stream::iter(dedup(names))
            .map(|name| {
                let registry = registry.as_ref();
                async move {
                    let metadata = self
                        .resolve_latest(registry, Tool::Npm, &name, root)
                        .await
                        .unwrap_or_else(|_| RegistryMetadata::unknown());
                    PackageLookup { name, metadata }
                }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;
        lookups.sort_by(|a, b| a.name.cmp(&b.name));
        lookups
    }

    fn registry_client(&self, registry: RegistryId) -> Box<dyn RegistryClient> {
        create_client(
            registry,
            self.client.clone(),
            &self.config.endpoints,
            self.config.crates_io_interval,
        )
    }

    /// Registry lookup, then CLI fallback; `Err` carries both failure reasons
    async fn resolve_latest(
        &self,
        registry: &dyn RegistryClient,
        tool: Tool,
        name: &str,
        working_dir: &Path,
    ) -> Result<RegistryMetadata, String> {
        let fetched = registry
            .fetch_latest_within(name, self.config.fetch_timeout)
            .await;

        let registry_error = match fetched {
            Ok(metadata) => return Ok(metadata),
            Err(e) => e,
        };
        tracing::warn!(package = name, error = %registry_error, "registry lookup failed, asking {}", tool);

        match self
            .package_manager
            .query_latest(tool, name, working_dir)
            .await
        {
            Ok(version) => {
                tracing::debug!(package = name, version = %version, "version from package manager");
                Ok(RegistryMetadata::with_version(version))
            }
            Err(pm_error) => {
                tracing::warn!(package = name, error = %pm_error, "package manager fallback failed");
                Err(format!("{}; {}", registry_error, pm_error))
            }
        }
    }
}

/// Read and merge every manifest of the project's ecosystem
fn read_dependencies(project: &DetectedProject) -> Result<DependencyMap, AnalyzerError> {
    let ecosystem: Ecosystem = project.ecosystem();
    let mut deps = DependencyMap::new();

    for path in project.manifest_paths() {
        let content = read_manifest(&path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let parsed = parse_manifest(ecosystem, &content, filename);
        tracing::debug!(manifest = %path.display(), dependencies = parsed.len(), "parsed manifest");
        deps.extend(parsed);
    }

    Ok(deps)
}

/// Split declared dependencies into lookup candidates and unknown targets.
///
/// Names that a package CLI would parse as options are never candidates.
fn select_candidates(
    declared: DependencyMap,
    targets: &[String],
) -> (Vec<(String, String)>, Vec<String>) {
    let mut candidates = Vec::new();
    let mut not_found = Vec::new();

    if targets.is_empty() {
        candidates.extend(declared);
    } else {
        for name in dedup(targets) {
            match declared.get(&name) {
                Some(constraint) => candidates.push((name, constraint.clone())),
                None => not_found.push(name),
            }
        }
    }

    let (candidates, rejected): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|(name, _)| !is_option_like(name));
    let rejected: Vec<String> = rejected.into_iter().map(|(name, _)| name).collect();
    log_rejected(&rejected);
    not_found.extend(rejected);

    (candidates, not_found)
}

fn log_rejected(names: &[String]) {
    for name in names {
        tracing::debug!(package = %name, "skipping package name that starts with '-'");
    }
}

/// Trimmed, non-empty names in first-seen order
fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}
