//! Integration tests for depscout
//!
//! These tests verify:
//! - Project detection across ecosystems
//! - Manifest parsing through the public parser API
//! - End-to-end analysis against mocked registries
//! - Applying updates through a recording package manager

use async_trait::async_trait;
use depscout::analyzer::{Analyzer, AnalyzerConfig};
use depscout::domain::{Ecosystem, UpdateType};
use depscout::error::PackageManagerError;
use depscout::package_manager::{InstallResult, PackageManager, Tool};
use depscout::registry::RegistryEndpoints;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Package manager answering from a fixed table and recording installs
#[derive(Default)]
struct RecordingPackageManager {
    versions: HashMap<String, String>,
    fail_installs: Vec<String>,
    installs: Mutex<Vec<String>>,
}

impl RecordingPackageManager {
    fn with_version(mut self, package: &str, version: &str) -> Self {
        self.versions.insert(package.to_string(), version.to_string());
        self
    }

    fn failing(mut self, package: &str) -> Self {
        self.fail_installs.push(package.to_string());
        self
    }

    fn installs(&self) -> Vec<String> {
        self.installs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageManager for RecordingPackageManager {
    async fn query_latest(
        &self,
        tool: Tool,
        package: &str,
        _working_dir: &Path,
    ) -> Result<String, PackageManagerError> {
        self.versions
            .get(package)
            .cloned()
            .ok_or_else(|| PackageManagerError::UnparsableOutput {
                command: tool.query_command(package).join(" "),
            })
    }

    async fn install(
        &self,
        tool: Tool,
        package: &str,
        version: &str,
        _working_dir: &Path,
    ) -> InstallResult {
        let command = tool.install_command(package, version).join(" ");
        self.installs.lock().unwrap().push(command.clone());
        if self.fail_installs.iter().any(|p| p == package) {
            InstallResult::failure(tool, command, String::new(), "E404 not found".to_string())
        } else {
            InstallResult::success(tool, command, String::new(), String::new())
        }
    }
}

fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

mod detection_tests {
    use super::*;
    use depscout::manifest::detect_project;

    #[test]
    fn test_priority_prefers_package_json() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("Cargo.toml"), "[dependencies]\n").unwrap();
        fs::write(temp_dir.path().join("go.mod"), "module x\n").unwrap();
        fs::write(temp_dir.path().join("package.json"), "{}").unwrap();

        let project = detect_project(temp_dir.path()).unwrap();
        assert_eq!(project.ecosystem(), Ecosystem::JavaScript);
        assert_eq!(project.root, temp_dir.path());
    }

    #[test]
    fn test_detects_in_subdirectory() {
        let temp_dir = create_test_dir();
        let sub = temp_dir.path().join("backend");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("Gemfile"), "gem 'rails'\n").unwrap();

        let project = detect_project(temp_dir.path()).unwrap();
        assert_eq!(project.ecosystem(), Ecosystem::Ruby);
        assert_eq!(project.root, sub);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = create_test_dir();
        assert!(detect_project(temp_dir.path()).is_none());
    }

    #[test]
    fn test_nonexistent_directory() {
        assert!(detect_project(Path::new("/nonexistent/depscout/test")).is_none());
    }
}

mod parsing_tests {
    use depscout::domain::Ecosystem;
    use depscout::manifest::{get_parser, parse_manifest};

    #[test]
    fn test_cargo_toml_plain_and_table_entries() {
        let content = r#"
[package]
name = "demo"

[dependencies]
serde = "1.0"
tokio = { version = "1.28", features = ["full"] }
"#;
        let deps = parse_manifest(Ecosystem::Rust, content, "Cargo.toml");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps["serde"], "1.0");
        assert_eq!(deps["tokio"], "1.28");
    }

    #[test]
    fn test_go_mod_single_line_block() {
        let deps = parse_manifest(
            Ecosystem::Go,
            "module example.com/app\n\nrequire ( github.com/x/y v1.2.3 )\n",
            "go.mod",
        );
        assert_eq!(deps["github.com/x/y"], "v1.2.3");
    }

    #[test]
    fn test_requirements_without_constraint_is_latest() {
        let deps = parse_manifest(
            Ecosystem::Python,
            "requests==2.31.0\nflask\n# comment\n",
            "requirements.txt",
        );
        assert_eq!(deps["requests"], "==2.31.0");
        assert_eq!(deps["flask"], "latest");
    }

    #[test]
    fn test_malformed_package_json_is_salvaged() {
        let parser = get_parser("package.json").unwrap();
        let deps = parser.parse(r#"{"dependencies": {"react": "^18.2.0", "vite": "5.0.0",}"#);
        assert_eq!(deps["react"], "^18.2.0");
        assert_eq!(deps["vite"], "5.0.0");
    }

    #[test]
    fn test_wrong_filename_for_ecosystem() {
        let deps = parse_manifest(Ecosystem::Rust, "[dependencies]\nserde = \"1\"\n", "go.mod");
        assert!(deps.is_empty());
    }
}

mod analysis_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer(server: &MockServer, pm: RecordingPackageManager) -> Analyzer {
        let config = AnalyzerConfig::default()
            .with_endpoints(RegistryEndpoints::with_base(&server.uri()))
            .with_crates_io_interval(Duration::ZERO);
        Analyzer::new(config)
            .unwrap()
            .with_package_manager(Arc::new(pm))
    }

    fn left_pad_project() -> TempDir {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"name": "app", "dependencies": {"left-pad": "1.0.0"}}"#,
        )
        .unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_minor_update_is_not_breaking() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/left-pad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dist-tags": { "latest": "1.3.0" },
                "description": "String left pad",
                "license": "WTFPL"
            })))
            .mount(&server)
            .await;

        let temp_dir = left_pad_project();
        let report = analyzer(&server, RecordingPackageManager::default())
            .analyze(temp_dir.path(), &[])
            .await
            .unwrap();

        assert_eq!(report.updates.len(), 1);
        let update = &report.updates[0];
        assert_eq!(update.name, "left-pad");
        assert_eq!(update.current_version, "1.0.0");
        assert_eq!(update.latest_version, "1.3.0");
        assert_eq!(update.update_type, UpdateType::Minor);
        assert!(!update.has_breaking_change);
        assert_eq!(update.metadata.license.as_deref(), Some("WTFPL"));
    }

    #[tokio::test]
    async fn test_deprecated_major_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/left-pad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dist-tags": { "latest": "2.0.0" },
                "versions": {
                    "2.0.0": { "deprecated": "use String.prototype.padStart()" }
                }
            })))
            .mount(&server)
            .await;

        let temp_dir = left_pad_project();
        let report = analyzer(&server, RecordingPackageManager::default())
            .analyze(temp_dir.path(), &[])
            .await
            .unwrap();

        let update = &report.updates[0];
        assert_eq!(update.update_type, UpdateType::Major);
        assert!(update.has_breaking_change);
        assert!(update.is_deprecated);
        assert_eq!(
            update.metadata.deprecation_message.as_deref(),
            Some("use String.prototype.padStart()")
        );
    }

    #[tokio::test]
    async fn test_registry_outage_degrades_to_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/zod"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "dist-tags": { "latest": "3.23.8" } })),
            )
            .mount(&server)
            .await;

        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"dependencies": {"broken": "^1.0.0", "zod": "^3.22.0"}}"#,
        )
        .unwrap();

        let report = analyzer(&server, RecordingPackageManager::default())
            .analyze(temp_dir.path(), &[])
            .await
            .unwrap();

        assert_eq!(report.updates.len(), 2);
        let broken = &report.updates[0];
        assert_eq!(broken.name, "broken");
        assert_eq!(broken.latest_version, "unknown");
        assert_eq!(broken.update_type, UpdateType::Unknown);
        assert_eq!(report.failed_lookups().count(), 1);

        let zod = &report.updates[1];
        assert_eq!(zod.latest_version, "3.23.8");
        assert_eq!(zod.update_type, UpdateType::Minor);
    }

    #[tokio::test]
    async fn test_go_module_through_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/github.com/!burnt!sushi/toml/@latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Version": "v1.4.0",
                "Time": "2024-06-01T12:00:00Z"
            })))
            .mount(&server)
            .await;

        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("go.mod"),
            "module example.com/app\n\ngo 1.22\n\nrequire (\n\tgithub.com/BurntSushi/toml v1.3.2\n)\n",
        )
        .unwrap();

        let report = analyzer(&server, RecordingPackageManager::default())
            .analyze(temp_dir.path(), &[])
            .await
            .unwrap();

        assert_eq!(report.ecosystem, Some(Ecosystem::Go));
        assert_eq!(report.package_manager.as_deref(), Some("go"));
        let update = &report.updates[0];
        assert_eq!(update.current_version, "v1.3.2");
        assert_eq!(update.latest_version, "v1.4.0");
        assert_eq!(update.update_type, UpdateType::Minor);
        assert!(update.metadata.last_published.is_some());
    }

    #[tokio::test]
    async fn test_generic_template_overrides_registry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mirror/serde"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.0.210" })))
            .mount(&server)
            .await;

        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("Cargo.toml"),
            "[dependencies]\nserde = \"1.0.200\"\n",
        )
        .unwrap();

        let endpoints = RegistryEndpoints::default()
            .with_generic_template(format!("{}/mirror/{{name}}", server.uri()));
        let report = Analyzer::new(AnalyzerConfig::default().with_endpoints(endpoints))
            .unwrap()
            .with_package_manager(Arc::new(RecordingPackageManager::default()))
            .analyze(temp_dir.path(), &[])
            .await
            .unwrap();

        assert_eq!(report.updates[0].latest_version, "1.0.210");
        assert_eq!(report.updates[0].update_type, UpdateType::Patch);
    }
}

mod apply_tests {
    use super::*;
    use depscout::error::ExecutorError;
    use depscout::executor::{ApplyOptions, Executor};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn analyzed_project(
        server: &MockServer,
        temp_dir: &TempDir,
    ) -> depscout::domain::AnalysisReport {
        for (name, latest) in [("react", "18.3.1"), ("zod", "3.23.8"), ("ghost", "")] {
            let response = if latest.is_empty() {
                ResponseTemplate::new(404)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({ "dist-tags": { "latest": latest } }))
            };
            Mock::given(method("GET"))
                .and(path(format!("/{}", name)))
                .respond_with(response)
                .mount(server)
                .await;
        }
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"dependencies": {"react": "^17.0.2", "zod": "^3.22.0", "ghost": "1.0.0"}}"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();

        Analyzer::new(
            AnalyzerConfig::default().with_endpoints(RegistryEndpoints::with_base(&server.uri())),
        )
        .unwrap()
        .with_package_manager(Arc::new(RecordingPackageManager::default()))
        .analyze(temp_dir.path(), &[])
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_apply_requires_confirmation_for_breaking() {
        let server = MockServer::start().await;
        let temp_dir = create_test_dir();
        let report = analyzed_project(&server, &temp_dir).await;

        let pm = Arc::new(RecordingPackageManager::default());
        let err = Executor::new(pm.clone())
            .apply(
                temp_dir.path(),
                Ecosystem::JavaScript.descriptor(),
                &report.updates,
                ApplyOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::ConfirmationRequired { .. }));
        assert!(pm.installs().is_empty());
    }

    #[tokio::test]
    async fn test_apply_confirmed_with_partial_failure() {
        let server = MockServer::start().await;
        let temp_dir = create_test_dir();
        let report = analyzed_project(&server, &temp_dir).await;

        let pm = Arc::new(RecordingPackageManager::default().failing("react"));
        let summary = Executor::new(pm.clone())
            .apply(
                temp_dir.path(),
                Ecosystem::JavaScript.descriptor(),
                &report.updates,
                ApplyOptions::confirmed(),
            )
            .await
            .unwrap();

        assert_eq!(
            pm.installs(),
            vec!["yarn add react@18.3.1", "yarn add zod@3.23.8"]
        );
        assert_eq!(summary.succeeded, vec!["zod".to_string()]);
        assert_eq!(summary.failed[0].name, "react");
        assert!(summary.failed[0].reason.contains("E404 not found"));
        assert_eq!(summary.skipped, vec!["ghost".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_version_from_package_manager() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("Gemfile"),
            "source 'https://rubygems.org'\ngem 'rails', '~> 7.0.8'\n",
        )
        .unwrap();

        let pm = RecordingPackageManager::default().with_version("rails", "7.1.3");
        let report = Analyzer::new(
            AnalyzerConfig::default().with_endpoints(RegistryEndpoints::with_base(&server.uri())),
        )
        .unwrap()
        .with_package_manager(Arc::new(pm))
        .analyze(temp_dir.path(), &[])
        .await
        .unwrap();

        assert_eq!(report.package_manager.as_deref(), Some("bundler"));
        assert_eq!(report.updates[0].latest_version, "7.1.3");
        assert_eq!(report.updates[0].update_type, UpdateType::Minor);
    }
}
