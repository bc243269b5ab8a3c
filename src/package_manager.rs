//! Package manager integration
//!
//! This module provides:
//! - Detection of the concrete package-manager tool for a project
//! - Latest-version queries through package-manager CLIs (registry fallback)
//! - Execution of pinned install commands for the update executor
//!
//! Every command is spawned directly with discrete arguments (no shell) and
//! is bounded by a timeout. A command that runs past its timeout is killed
//! and reaped before the call returns, so two invocations never overlap.

use crate::domain::Ecosystem;
use crate::error::PackageManagerError;
use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Default timeout for version queries
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for installs
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

// `name = "1.2.3"    # description` from cargo search
static CARGO_SEARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\S+)\s*=\s*"([^"]+)""#).unwrap());

// `name (1.2.3)` from pip index versions and gem search
static PAREN_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+\(([^)]+)\)").unwrap());

/// Returns true if a package CLI would read `name` as an option
pub fn is_option_like(name: &str) -> bool {
    name.trim_start().starts_with('-')
}

/// Concrete package-manager program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Npm,
    Pnpm,
    Yarn,
    Bun,
    Cargo,
    Pip,
    Poetry,
    Go,
    Bundler,
}

impl Tool {
    /// Name reported in update records
    pub fn name(self) -> &'static str {
        match self {
            Tool::Npm => "npm",
            Tool::Pnpm => "pnpm",
            Tool::Yarn => "yarn",
            Tool::Bun => "bun",
            Tool::Cargo => "cargo",
            Tool::Pip => "pip",
            Tool::Poetry => "poetry",
            Tool::Go => "go",
            Tool::Bundler => "bundler",
        }
    }

    /// Ecosystem the tool belongs to
    pub fn ecosystem(self) -> Ecosystem {
        match self {
            Tool::Npm | Tool::Pnpm | Tool::Yarn | Tool::Bun => Ecosystem::JavaScript,
            Tool::Cargo => Ecosystem::Rust,
            Tool::Pip | Tool::Poetry => Ecosystem::Python,
            Tool::Go => Ecosystem::Go,
            Tool::Bundler => Ecosystem::Ruby,
        }
    }

    /// Command asking for the latest published version of `package`
    pub fn query_command(self, package: &str) -> Vec<String> {
        let parts: Vec<&str> = match self {
            Tool::Npm | Tool::Bun => vec!["npm", "view", package, "version"],
            Tool::Pnpm => vec!["pnpm", "view", package, "version"],
            Tool::Yarn => vec!["yarn", "info", package, "version", "--silent"],
            Tool::Cargo => vec!["cargo", "search", "--limit", "1", "--", package],
            Tool::Pip | Tool::Poetry => vec!["pip", "index", "versions", "--", package],
            Tool::Go => vec!["go", "list", "-m", "-versions", "--", package],
            Tool::Bundler => vec!["gem", "search", "--remote", "--exact", package],
        };
        parts.into_iter().map(str::to_string).collect()
    }

    /// Command installing `package` pinned at `version`
    pub fn install_command(self, package: &str, version: &str) -> Vec<String> {
        let at = format!("{}@{}", package, version);
        match self {
            Tool::Npm => vec!["npm".into(), "install".into(), at],
            Tool::Pnpm => vec!["pnpm".into(), "add".into(), at],
            Tool::Yarn => vec!["yarn".into(), "add".into(), at],
            Tool::Bun => vec!["bun".into(), "add".into(), at],
            Tool::Cargo => vec!["cargo".into(), "add".into(), "--".into(), at],
            Tool::Pip => vec![
                "pip".into(),
                "install".into(),
                "--".into(),
                format!("{}=={}", package, version),
            ],
            Tool::Poetry => vec!["poetry".into(), "add".into(), "--".into(), at],
            Tool::Go => vec![
                "go".into(),
                "get".into(),
                "--".into(),
                format!("{}@v{}", package, version.trim_start_matches('v')),
            ],
            Tool::Bundler => vec![
                "bundle".into(),
                "add".into(),
                package.into(),
                "--version".into(),
                version.into(),
            ],
        }
    }

    /// Extract the latest version from the output of [`Tool::query_command`]
    pub fn parse_query_output(self, package: &str, stdout: &str) -> Option<String> {
        let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());

        match self {
            // Prints the bare version; multi-version output ends with the newest
            Tool::Npm | Tool::Pnpm | Tool::Yarn | Tool::Bun => lines
                .last()
                .map(|l| l.trim_matches(|c| c == '"' || c == '\'').to_string())
                .filter(|v| !v.contains(char::is_whitespace)),
            Tool::Cargo => lines.find_map(|line| {
                let caps = CARGO_SEARCH_RE.captures(line)?;
                (&caps[1] == package).then(|| caps[2].to_string())
            }),
            Tool::Pip | Tool::Poetry | Tool::Bundler => lines.find_map(|line| {
                let caps = PAREN_VERSION_RE.captures(line)?;
                if !caps[1].eq_ignore_ascii_case(package) {
                    return None;
                }
                // gem search may print "1.2.3 ruby x86_64-linux" or "1.2.3, 1.2.2"
                caps[2]
                    .split([',', ' '])
                    .next()
                    .map(str::to_string)
                    .filter(|v| !v.is_empty())
            }),
            // "<module> v1.0.0 v1.1.0 ..." lists versions in ascending order
            Tool::Go => {
                let tokens: Vec<&str> = lines.next()?.split_whitespace().collect();
                (tokens.len() > 1).then(|| tokens[tokens.len() - 1].to_string())
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the package-manager tool for a project directory
pub fn detect_tool(ecosystem: Ecosystem, working_dir: &Path) -> Tool {
    match ecosystem {
        Ecosystem::JavaScript => detect_node_pm(working_dir),
        Ecosystem::Python => detect_python_pm(working_dir),
        Ecosystem::Rust => Tool::Cargo,
        Ecosystem::Go => Tool::Go,
        Ecosystem::Ruby => Tool::Bundler,
    }
}

/// Detect the Node.js package manager from lockfiles
fn detect_node_pm(working_dir: &Path) -> Tool {
    if working_dir.join("pnpm-lock.yaml").exists() {
        return Tool::Pnpm;
    }
    if working_dir.join("yarn.lock").exists() {
        return Tool::Yarn;
    }
    if working_dir.join("bun.lockb").exists() || working_dir.join("bun.lock").exists() {
        return Tool::Bun;
    }
    Tool::Npm
}

/// Detect the Python package manager from lockfiles and pyproject.toml
fn detect_python_pm(working_dir: &Path) -> Tool {
    if working_dir.join("poetry.lock").exists() {
        return Tool::Poetry;
    }
    let uses_poetry = std::fs::read_to_string(working_dir.join("pyproject.toml"))
        .map(|content| content.contains("[tool.poetry"))
        .unwrap_or(false);
    if uses_poetry {
        Tool::Poetry
    } else {
        Tool::Pip
    }
}

/// Result of a package manager installation
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// The tool that was used
    pub tool: Tool,
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(tool: Tool, command: String, stdout: String, stderr: String) -> Self {
        Self {
            tool,
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed install result
    pub fn failure(tool: Tool, command: String, stdout: String, stderr: String) -> Self {
        Self {
            tool,
            command,
            success: false,
            stdout,
            stderr,
        }
    }

    /// Short human-readable failure reason
    pub fn reason(&self) -> String {
        let last_line = self
            .stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty());
        match last_line {
            Some(line) => format!("{}: {}", self.command, line),
            None => format!("{} failed", self.command),
        }
    }
}

/// Package-manager operations used by the analyzer and the executor
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Ask the tool's CLI for the latest published version of a package
    async fn query_latest(
        &self,
        tool: Tool,
        package: &str,
        working_dir: &Path,
    ) -> Result<String, PackageManagerError>;

    /// Install a package pinned at a version
    async fn install(
        &self,
        tool: Tool,
        package: &str,
        version: &str,
        working_dir: &Path,
    ) -> InstallResult;
}

/// Package manager that executes real commands
#[derive(Debug, Clone)]
pub struct SystemPackageManager {
    query_timeout: Duration,
    install_timeout: Duration,
}

impl Default for SystemPackageManager {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
        }
    }
}

impl SystemPackageManager {
    /// Create a new system package manager with default timeouts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for version queries
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the timeout for installs
    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }

    /// Run a command and capture output
    async fn run_command(
        &self,
        command: &[String],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<Output, PackageManagerError> {
        let command_str = command.join(" ");
        let Some((program, args)) = command.split_first() else {
            return Err(PackageManagerError::Spawn {
                command: command_str,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        tracing::debug!(command = %command_str, dir = %working_dir.display(), "running package manager");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| PackageManagerError::Spawn {
            command: command_str.clone(),
            source,
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = tokio::time::timeout(timeout, async {
            tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => Ok(Output {
                status,
                stdout,
                stderr,
            }),
            Ok(Err(source)) => Err(PackageManagerError::Spawn {
                command: command_str,
                source,
            }),
            Err(_) => {
                // kill() also waits for the process to exit
                if let Err(e) = child.kill().await {
                    tracing::warn!(command = %command_str, error = %e, "failed to stop timed out command");
                }
                Err(PackageManagerError::Timeout {
                    command: command_str,
                    seconds: timeout.as_secs(),
                })
            }
        }
    }
}

/// Drain a child's output pipe
async fn read_pipe(pipe: Option<impl AsyncRead + Unpin>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[async_trait]
impl PackageManager for SystemPackageManager {
    async fn query_latest(
        &self,
        tool: Tool,
        package: &str,
        working_dir: &Path,
    ) -> Result<String, PackageManagerError> {
        if is_option_like(package) {
            return Err(PackageManagerError::OptionLikeName {
                name: package.to_string(),
            });
        }

        let command = tool.query_command(package);
        let output = self
            .run_command(&command, working_dir, self.query_timeout)
            .await?;
        let command_str = command.join(" ");

        if !output.status.success() {
            return Err(PackageManagerError::Failed {
                command: command_str,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        tool.parse_query_output(package, &stdout)
            .ok_or(PackageManagerError::UnparsableOutput {
                command: command_str,
            })
    }

    async fn install(
        &self,
        tool: Tool,
        package: &str,
        version: &str,
        working_dir: &Path,
    ) -> InstallResult {
        let command = tool.install_command(package, version);
        let command_str = command.join(" ");

        if is_option_like(package) {
            let error = PackageManagerError::OptionLikeName {
                name: package.to_string(),
            };
            return InstallResult::failure(tool, command_str, String::new(), error.to_string());
        }

        match self
            .run_command(&command, working_dir, self.install_timeout)
            .await
        {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    InstallResult::success(tool, command_str, stdout, stderr)
                } else {
                    InstallResult::failure(tool, command_str, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(tool, command_str, String::new(), e.to_string()),
        }
    }
}
