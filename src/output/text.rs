//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Update lines with colored severity labels (major/minor/patch)
//! - Breaking-change notes and deprecation markers
//! - Failed lookups and packages missing from the manifest
//! - Registry lookups outside a project
//! - Apply results

use crate::domain::{
    manifest_priority, AnalysisReport, ApplySummary, PackageLookup, PackageUpdateInfo, UpdateType,
};
use crate::output::OutputFormatter;
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Minimum width of the package name column
const MIN_NAME_WIDTH: usize = 20;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Create a new text formatter with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn update_label(&self, update_type: UpdateType) -> String {
        let label = update_type.to_string();
        match update_type {
            UpdateType::Major => self.paint(&label, |s| s.red().bold()),
            UpdateType::Minor => self.paint(&label, |s| s.yellow()),
            UpdateType::Patch => self.paint(&label, |s| s.green()),
            UpdateType::Unknown => self.paint(&label, |s| s.magenta()),
        }
    }

    fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
        names.map(str::len).max().unwrap_or(0).max(MIN_NAME_WIDTH)
    }

    fn format_no_project(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        let candidates: Vec<&str> = manifest_priority().map(|(file, _)| file).collect();
        writeln!(
            writer,
            "{} (looked for {})",
            self.paint("No supported project found", |s| s.yellow()),
            candidates.join(", ")
        )
    }

    fn format_lookups(
        &self,
        lookups: &[PackageLookup],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", self.paint("Latest versions (npm):", |s| s.bold()))?;
        let width = Self::name_width(lookups.iter().map(|l| l.name.as_str()));

        for lookup in lookups {
            let version = if lookup.metadata.is_unknown() {
                self.paint(&lookup.metadata.latest_version, |s| s.dimmed())
            } else {
                self.paint(&lookup.metadata.latest_version, |s| s.bright_white().bold())
            };
            let description = lookup
                .metadata
                .description
                .as_deref()
                .map(|d| format!("  {}", self.paint(d, |s| s.dimmed())))
                .unwrap_or_default();
            writeln!(
                writer,
                "  {:width$} {}{}",
                lookup.name,
                version,
                description,
                width = width
            )?;
        }
        Ok(())
    }

    fn format_update_line(
        &self,
        update: &PackageUpdateInfo,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let date = update
            .metadata
            .last_published
            .map(|d| {
                let text = format!(" ({})", d.format("%Y/%m/%d %H:%M"));
                self.paint(&text, |s| s.dimmed())
            })
            .unwrap_or_default();
        let deprecated = if update.is_deprecated {
            format!(" {}", self.paint("deprecated", |s| s.red()))
        } else {
            String::new()
        };
        let arrow = if self.color { "→" } else { "->" };

        writeln!(
            writer,
            "  {:width$} {} {} {} [{}]{}{}",
            update.name,
            self.paint(&update.current_version, |s| s.dimmed()),
            arrow,
            self.paint(&update.latest_version, |s| s.bright_white().bold()),
            self.update_label(update.update_type),
            date,
            deprecated,
            width = width
        )?;

        for note in &update.breaking_change_notes {
            writeln!(
                writer,
                "  {:width$}   {}",
                "",
                self.paint(note, |s| s.dimmed()),
                width = width
            )?;
        }
        Ok(())
    }

    fn format_project(
        &self,
        report: &AnalysisReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let root = report
            .project_root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let ecosystem = report
            .ecosystem
            .map(|e| e.display_name())
            .unwrap_or_default();
        let manager = report.package_manager.as_deref().unwrap_or_default();

        let actionable: Vec<&PackageUpdateInfo> = report.actionable().collect();
        let failed: Vec<&PackageUpdateInfo> = report.failed_lookups().collect();
        let count = actionable.len();

        writeln!(
            writer,
            "{} {} — {} {}",
            self.paint(&root, |s| s.bold()),
            self.paint(&format!("({}, {})", ecosystem, manager), |s| s.dimmed()),
            self.paint(&count.to_string(), |s| s.green()),
            if count == 1 { "update" } else { "updates" }
        )?;

        let width = Self::name_width(report.updates.iter().map(|u| u.name.as_str()));

        if actionable.is_empty() && failed.is_empty() {
            writeln!(
                writer,
                "  {}",
                self.paint("All dependencies are up to date", |s| s.green())
            )?;
        }
        for update in &actionable {
            self.format_update_line(update, width, writer)?;
        }

        if !failed.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "  {}", self.paint("Lookup failed:", |s| s.yellow()))?;
            for update in &failed {
                let reason = update
                    .breaking_change_notes
                    .first()
                    .map(String::as_str)
                    .unwrap_or("latest version unknown");
                writeln!(
                    writer,
                    "  {:width$} {}",
                    update.name,
                    self.paint(&format!("({})", reason), |s| s.dimmed()),
                    width = width
                )?;
            }
        }

        if !report.not_found.is_empty() {
            writeln!(writer)?;
            writeln!(
                writer,
                "  {} {}",
                self.paint("Not in manifest:", |s| s.yellow()),
                report.not_found.join(", ")
            )?;
        }

        self.format_summary_line(&actionable, writer)
    }

    fn format_summary_line(
        &self,
        actionable: &[&PackageUpdateInfo],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if actionable.is_empty() {
            return Ok(());
        }

        let count = |t: UpdateType| actionable.iter().filter(|u| u.update_type == t).count();
        let mut parts = vec![
            format!("{} major", count(UpdateType::Major)),
            format!("{} minor", count(UpdateType::Minor)),
            format!("{} patch", count(UpdateType::Patch)),
        ];
        let unknown = count(UpdateType::Unknown);
        if unknown > 0 {
            parts.push(format!("{} unknown", unknown));
        }

        let breaking = actionable.iter().filter(|u| u.has_breaking_change).count();
        let deprecated = actionable.iter().filter(|u| u.is_deprecated).count();

        writeln!(writer)?;
        write!(
            writer,
            "{} {} ({})",
            self.paint("Summary:", |s| s.bold()),
            actionable.len(),
            parts.join(", ")
        )?;
        if breaking > 0 {
            write!(
                writer,
                ", {}",
                self.paint(&format!("{} breaking", breaking), |s| s.red())
            )?;
        }
        if deprecated > 0 {
            write!(writer, ", {} deprecated", deprecated)?;
        }
        writeln!(writer)
    }

    fn format_apply(&self, summary: &ApplySummary, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} {} succeeded, {} failed, {} skipped",
            self.paint("Applied:", |s| s.bold()),
            summary.succeeded.len(),
            summary.failed.len(),
            summary.skipped.len()
        )?;

        for name in &summary.succeeded {
            writeln!(writer, "  {} {}", self.paint("✓", |s| s.green()), name)?;
        }
        for failure in &summary.failed {
            writeln!(
                writer,
                "  {} {}: {}",
                self.paint("✗", |s| s.red()),
                failure.name,
                failure.reason
            )?;
        }
        let skip_reason = if summary.confirmation_declined {
            "(breaking updates not confirmed, rerun with --yes)"
        } else {
            "(latest version unknown)"
        };
        for name in &summary.skipped {
            writeln!(
                writer,
                "  {} {} {}",
                self.paint("-", |s| s.dimmed()),
                name,
                self.paint(skip_reason, |s| s.dimmed())
            )?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(
        &self,
        report: &AnalysisReport,
        applied: Option<&ApplySummary>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if report.has_project() {
            self.format_project(report, writer)?;
        } else if !report.lookups.is_empty() {
            self.format_lookups(&report.lookups, writer)?;
        } else {
            self.format_no_project(writer)?;
        }
        if !report.has_project() && !report.not_found.is_empty() {
            writeln!(
                writer,
                "  {} {}",
                self.paint("Not looked up:", |s| s.yellow()),
                report.not_found.join(", ")
            )?;
        }

        if let Some(summary) = applied {
            self.format_apply(summary, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ecosystem, FailedUpdate, RegistryMetadata};
    use crate::update::UpdateJudge;
    use std::path::PathBuf;

    fn render(report: &AnalysisReport, applied: Option<&ApplySummary>) -> String {
        let mut out = Vec::new();
        TextFormatter::with_color(false)
            .format(report, applied, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn project(updates: Vec<PackageUpdateInfo>) -> AnalysisReport {
        AnalysisReport {
            ecosystem: Some(Ecosystem::Rust),
            package_manager: Some("cargo".to_string()),
            project_root: Some(PathBuf::from("/work/app")),
            updates,
            not_found: Vec::new(),
            lookups: Vec::new(),
        }
    }

    fn judge() -> UpdateJudge {
        UpdateJudge::new(Ecosystem::Rust, "cargo")
    }

    #[test]
    fn test_no_project() {
        let output = render(&AnalysisReport::no_project(), None);
        assert!(output.contains("No supported project found"));
        assert!(output.contains("package.json, Cargo.toml"));
    }

    #[test]
    fn test_up_to_date() {
        let output = render(&project(Vec::new()), None);
        assert!(output.contains("/work/app (Rust, cargo) — 0 updates"));
        assert!(output.contains("All dependencies are up to date"));
        assert!(!output.contains("Summary:"));
    }

    #[test]
    fn test_update_lines_and_summary() {
        let updates = vec![
            judge()
                .judge("serde", "1.0", RegistryMetadata::with_version("2.0.0"))
                .unwrap(),
            judge()
                .judge("tokio", "1.28", RegistryMetadata::with_version("1.38.0"))
                .unwrap(),
        ];
        let output = render(&project(updates), None);

        assert!(output.contains("2 updates"));
        assert!(output.contains("1.0 -> 2.0.0 [major]"));
        assert!(output.contains("major version change from 1.0 to 2.0.0"));
        assert!(output.contains("1.28 -> 1.38.0 [minor]"));
        assert!(output.contains("Summary: 2 (1 major, 1 minor, 0 patch), 1 breaking"));
    }

    #[test]
    fn test_deprecated_marker() {
        let metadata = RegistryMetadata::with_version("1.0.1").deprecated(Some("unmaintained".into()));
        let updates = vec![judge().judge("old", "1.0.0", metadata).unwrap()];
        let output = render(&project(updates), None);
        assert!(output.contains("[patch] deprecated"));
        assert!(output.contains("deprecated: unmaintained"));
        assert!(output.contains("1 deprecated"));
    }

    #[test]
    fn test_failed_lookups_and_not_found() {
        let mut report = project(vec![judge().lookup_failure("ghost", "0.1", "HTTP 503")]);
        report.not_found = vec!["missing".to_string(), "gone".to_string()];
        let output = render(&report, None);

        assert!(output.contains("Lookup failed:"));
        assert!(output.contains("ghost"));
        assert!(output.contains("HTTP 503"));
        assert!(output.contains("Not in manifest: missing, gone"));
        assert!(!output.contains("up to date"));
    }

    #[test]
    fn test_lookups_without_project() {
        let report = AnalysisReport {
            lookups: vec![
                PackageLookup {
                    name: "left-pad".to_string(),
                    metadata: RegistryMetadata {
                        description: Some("String left pad".to_string()),
                        ..RegistryMetadata::with_version("1.3.0")
                    },
                },
                PackageLookup {
                    name: "nope".to_string(),
                    metadata: RegistryMetadata::unknown(),
                },
            ],
            not_found: vec!["--registry=x".to_string()],
            ..AnalysisReport::no_project()
        };
        let output = render(&report, None);
        assert!(output.contains("Latest versions (npm):"));
        assert!(output.contains("1.3.0  String left pad"));
        assert!(output.contains("unknown"));
        assert!(output.contains("Not looked up: --registry=x"));
        assert!(!output.contains("No supported project"));
    }

    #[test]
    fn test_apply_summary() {
        let applied = ApplySummary {
            succeeded: vec!["tokio".to_string()],
            failed: vec![FailedUpdate {
                name: "serde".to_string(),
                reason: "cargo add serde@2.0.0: error: not found".to_string(),
            }],
            skipped: vec!["ghost".to_string()],
            ..ApplySummary::default()
        };
        let output = render(&project(Vec::new()), Some(&applied));
        assert!(output.contains("Applied: 1 succeeded, 1 failed, 1 skipped"));
        assert!(output.contains("✓ tokio"));
        assert!(output.contains("✗ serde: cargo add serde@2.0.0"));
        assert!(output.contains("- ghost (latest version unknown)"));
    }

    #[test]
    fn test_declined_apply_summary() {
        let applied = ApplySummary {
            skipped: vec!["react".to_string()],
            confirmation_declined: true,
            ..ApplySummary::default()
        };
        let output = render(&project(Vec::new()), Some(&applied));
        assert!(output.contains("Applied: 0 succeeded, 0 failed, 1 skipped"));
        assert!(output.contains("- react (breaking updates not confirmed, rerun with --yes)"));
    }
}
