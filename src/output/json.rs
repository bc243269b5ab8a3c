//! JSON output formatter for machine processing
//!
//! The report is emitted as-is with a small summary block; the apply
//! summary is attached under `apply` when updates were applied.

use crate::domain::{AnalysisReport, ApplySummary, UpdateType};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a AnalysisReport,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply: Option<&'a ApplySummary>,
}

/// Counts derived from the report
#[derive(Serialize)]
struct JsonSummary {
    updates: usize,
    major: usize,
    minor: usize,
    patch: usize,
    unknown: usize,
    breaking: usize,
    deprecated: usize,
    failed_lookups: usize,
}

impl JsonSummary {
    fn from_report(report: &AnalysisReport) -> Self {
        let count = |t: UpdateType| {
            report
                .actionable()
                .filter(|u| u.update_type == t)
                .count()
        };

        Self {
            updates: report.actionable().count(),
            major: count(UpdateType::Major),
            minor: count(UpdateType::Minor),
            patch: count(UpdateType::Patch),
            unknown: count(UpdateType::Unknown),
            breaking: report.updates.iter().filter(|u| u.has_breaking_change).count(),
            deprecated: report.updates.iter().filter(|u| u.is_deprecated).count(),
            failed_lookups: report.failed_lookups().count(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(
        &self,
        report: &AnalysisReport,
        applied: Option<&ApplySummary>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonOutput {
            report,
            summary: JsonSummary::from_report(report),
            apply: applied,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
