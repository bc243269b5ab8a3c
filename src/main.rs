//! depscout - Multi-ecosystem dependency update checker CLI tool
//!
//! Detects the project's ecosystem, reports outdated dependencies and
//! optionally installs the updates:
//! - JavaScript/TypeScript (package.json)
//! - Rust (Cargo.toml)
//! - Python (requirements.txt, pyproject.toml)
//! - Go (go.mod)
//! - Ruby (Gemfile)

use anyhow::Context;
use clap::Parser;
use depscout::analyzer::Analyzer;
use depscout::cli::CliArgs;
use depscout::domain::{AnalysisReport, ApplySummary};
use depscout::error::ExecutorError;
use depscout::executor::{ApplyOptions, Executor};
use depscout::output::{create_formatter, OutputConfig};
use depscout::progress::Progress;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

/// Exit code when some lookups or installs failed
const PARTIAL_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(io::stderr)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    tracing::debug!(path = %args.path.display(), "depscout v{}", env!("CARGO_PKG_VERSION"));

    let analyzer = Analyzer::new(args.analyzer_config())?;
    let targets = args.targets();

    let mut progress = Progress::new(!args.json && io::stdout().is_terminal());
    progress.spinner("Checking dependencies...");

    let report = tokio::select! {
        report = analyzer.analyze(&args.path, &targets) => report?,
        _ = tokio::signal::ctrl_c() => {
            progress.finish_and_clear();
            anyhow::bail!("interrupted");
        }
    };
    progress.finish_and_clear();

    let applied = if args.apply {
        apply_updates(&analyzer, &report, args.yes).await?
    } else {
        None
    };

    let formatter = create_formatter(OutputConfig::from_cli(
        args.json,
        io::stdout().is_terminal(),
    ));
    let mut stdout = io::stdout().lock();
    formatter.format(&report, applied.as_ref(), &mut stdout)?;
    stdout.flush()?;

    Ok(exit_code(&report, applied.as_ref()))
}

/// Apply the report's updates, asking before breaking ones unless `--yes`
async fn apply_updates(
    analyzer: &Analyzer,
    report: &AnalysisReport,
    assume_yes: bool,
) -> anyhow::Result<Option<ApplySummary>> {
    let (Some(ecosystem), Some(root)) = (report.ecosystem, report.project_root.as_ref()) else {
        tracing::warn!("--apply ignored: no supported project");
        return Ok(None);
    };
    if report.updates.is_empty() {
        return Ok(None);
    }

    let breaking: Vec<String> = report
        .updates
        .iter()
        .filter(|u| u.has_breaking_change)
        .map(|u| u.to_string())
        .collect();
    let confirm_breaking = assume_yes || breaking.is_empty() || confirm(&breaking)?;

    let executor = Executor::new(analyzer.package_manager());
    let result = executor
        .apply(
            root,
            ecosystem.descriptor(),
            &report.updates,
            ApplyOptions { confirm_breaking },
        )
        .await;

    match result {
        Ok(summary) => Ok(Some(summary)),
        Err(e @ ExecutorError::ConfirmationRequired { .. }) => {
            tracing::warn!("{}; nothing was applied (pass --yes to confirm)", e);
            Ok(Some(ApplySummary::declined(&report.updates)))
        }
    }
}

/// Ask on stderr whether breaking updates may be applied
fn confirm(breaking: &[String]) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "Breaking updates:")?;
    for line in breaking {
        writeln!(stderr, "  {}", line)?;
    }
    write!(stderr, "Apply them? [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// 0 on success, 2 when a lookup or an install failed or the batch was declined
fn exit_code(report: &AnalysisReport, applied: Option<&ApplySummary>) -> ExitCode {
    let lookup_failed = report.failed_lookups().next().is_some()
        || report.lookups.iter().any(|l| l.metadata.is_unknown());
    let apply_failed = applied.is_some_and(|s| !s.is_success() || s.confirmation_declined);

    if lookup_failed || apply_failed {
        ExitCode::from(PARTIAL_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}
