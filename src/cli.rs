//! CLI argument parsing module for depscout

use crate::analyzer::{AnalyzerConfig, DEFAULT_CONCURRENCY};
use crate::registry::RegistryEndpoints;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Parse a positive number of seconds
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a worker count of at least one
fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("concurrency must be a positive integer: {}", s)),
        Ok(n) => Ok(n),
    }
}

/// Multi-ecosystem dependency update checker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depscout",
    version,
    about = "Find outdated dependencies and apply updates"
)]
pub struct CliArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Check only these packages (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub packages: Vec<String>,

    /// Install the available updates after the report
    #[arg(long)]
    pub apply: bool,

    /// Confirm breaking updates without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of concurrent registry lookups
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Per-package lookup timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "10", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Query this URL template for every package instead of the public
    /// registries (`{name}` is replaced with the package name)
    #[arg(long, value_name = "TEMPLATE")]
    pub registry_url: Option<String>,
}

impl CliArgs {
    /// Requested package names, trimmed and without empties
    pub fn targets(&self) -> Vec<String> {
        self.packages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Analyzer configuration derived from the flags
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let mut endpoints = RegistryEndpoints::default();
        if let Some(template) = &self.registry_url {
            endpoints = endpoints.with_generic_template(template.clone());
        }

        AnalyzerConfig::default()
            .with_concurrency(self.concurrency)
            .with_fetch_timeout(self.timeout)
            .with_endpoints(endpoints)
    }
}
