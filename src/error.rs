//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: a manifest exists but cannot be read
//! - RegistryError: package registry communication failures (recoverable)
//! - AnalyzerError: hard failures surfaced by the update analyzer
//! - PackageManagerError: a package-manager CLI invocation failed (recoverable)
//! - ExecutorError: the update executor refused to run
//!
//! Per-entry parse problems, registry outages and package-manager failures
//! are not errors at this level; they degrade into report fields.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::RegistryId;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Analyzer errors
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// Executor errors
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file exists but could not be read
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed or returned a non-success status
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Hard failures of the update analyzer
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A manifest of the detected ecosystem could not be read
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The shared HTTP client could not be constructed
    #[error("failed to initialize registry client: {0}")]
    Client(#[source] RegistryError),
}

/// Errors from invoking a package-manager CLI
#[derive(Error, Debug)]
pub enum PackageManagerError {
    /// The program could not be started (usually not installed)
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish in time
    #[error("'{command}' timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// The program exited with a non-zero status
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The program succeeded but printed no recognizable version
    #[error("could not find a version in the output of '{command}'")]
    UnparsableOutput { command: String },

    /// The package name would be parsed as a command-line option
    #[error("refusing to pass '{name}' to a package manager: names cannot start with '-'")]
    OptionLikeName { name: String },
}

/// Reasons the update executor refuses to start
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Breaking updates were selected without explicit confirmation
    #[error("breaking updates require confirmation: {}", packages.join(", "))]
    ConfirmationRequired { packages: Vec<String> },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns the display name of a registry
    pub fn registry_name(registry: RegistryId) -> &'static str {
        match registry {
            RegistryId::Npm => "npm",
            RegistryId::CratesIo => "crates.io",
            RegistryId::PyPI => "PyPI",
            RegistryId::GoProxy => "Go Proxy",
            RegistryId::RubyGems => "RubyGems",
            RegistryId::Generic => "generic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_read() {
        let err = ManifestError::read_error(
            "/path/to/package.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = format!("{}", err);
        assert!(msg.contains("failed to read manifest file"));
        assert!(msg.contains("package.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package", "npm");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
        assert!(msg.contains("npm"));
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("lodash", "npm", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_invalid_response() {
        let err = RegistryError::invalid_response("serde", "crates.io", "no versions");
        assert!(err.to_string().contains("invalid response from crates.io"));
    }

    #[test]
    fn test_registry_error_rate_limit() {
        let err = RegistryError::rate_limit_exceeded("crates.io");
        let msg = format!("{}", err);
        assert!(msg.contains("rate limit exceeded"));
        assert!(msg.contains("crates.io"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("serde", "crates.io");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("serde"));
    }

    #[test]
    fn test_registry_name() {
        assert_eq!(RegistryError::registry_name(RegistryId::Npm), "npm");
        assert_eq!(RegistryError::registry_name(RegistryId::PyPI), "PyPI");
        assert_eq!(RegistryError::registry_name(RegistryId::CratesIo), "crates.io");
        assert_eq!(RegistryError::registry_name(RegistryId::GoProxy), "Go Proxy");
        assert_eq!(RegistryError::registry_name(RegistryId::RubyGems), "RubyGems");
    }

    #[test]
    fn test_package_manager_error_messages() {
        let err = PackageManagerError::Timeout {
            command: "npm view left-pad version".to_string(),
            seconds: 30,
        };
        assert_eq!(err.to_string(), "'npm view left-pad version' timed out after 30s");

        let err = PackageManagerError::Failed {
            command: "cargo add serde@1.0.200".to_string(),
            status: "exit status: 101".to_string(),
            stderr: "error: no matching package".to_string(),
        };
        assert!(err.to_string().contains("exit status: 101"));
    }

    #[test]
    fn test_executor_error_lists_packages() {
        let err = ExecutorError::ConfirmationRequired {
            packages: vec!["react".to_string(), "vite".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "breaking updates require confirmation: react, vite"
        );
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let registry_err = RegistryError::package_not_found("pkg", "npm");
        let app_err: AppError = registry_err.into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("package 'pkg' not found"));
    }

    #[test]
    fn test_analyzer_error_from_manifest_error() {
        let err: AnalyzerError = ManifestError::read_error(
            "Cargo.toml",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        )
        .into();
        assert!(err.to_string().contains("Cargo.toml"));
    }
}
