//! requirements.txt parser for Python projects
//!
//! One requirement per line, `name[comparator]version`. Option lines, extras,
//! environment markers and comments are ignored.

use crate::domain::{DependencyMap, LATEST_CONSTRAINT};
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

// name, optional [extras], optional constraint
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*((?:===|==|~=|!=|>=|<=|>|<).*)?$")
        .unwrap()
});

/// Parser for requirements.txt files
pub struct RequirementsTxtParser;

impl ManifestParser for RequirementsTxtParser {
    fn parse(&self, content: &str) -> DependencyMap {
        let mut deps = DependencyMap::new();

        for line in content.lines() {
            let line = strip_line(line);
            if line.is_empty() || line.starts_with('-') {
                continue;
            }

            match parse_requirement(line) {
                Some((name, constraint)) => {
                    deps.insert(name, constraint);
                }
                None => tracing::debug!(line, "skipping unrecognized requirement"),
            }
        }

        deps
    }

    fn filename(&self) -> &'static str {
        "requirements.txt"
    }
}

/// Split a PEP 508 requirement into name and constraint.
///
/// The line must already be stripped of comments and markers.
pub(super) fn parse_requirement(line: &str) -> Option<(String, String)> {
    let caps = REQUIREMENT_RE.captures(line)?;
    let constraint = caps
        .get(2)
        .map(|m| m.as_str().replace(' ', ""))
        .unwrap_or_else(|| LATEST_CONSTRAINT.to_string());
    Some((caps[1].to_string(), constraint))
}

/// Drop the trailing comment and environment marker
pub(super) fn strip_line(line: &str) -> &str {
    let line = line.split('#').next().unwrap_or_default();
    let line = line.split(';').next().unwrap_or_default();
    line.trim()
}
