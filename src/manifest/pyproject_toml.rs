//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - [tool.poetry.dependencies] (the `python` entry is skipped)
//! - [tool.poetry.dev-dependencies] and poetry dependency groups
//! - PEP 621 [project] dependencies
//! - Malformed documents, via the line-oriented [`toml_lite`](super::toml_lite) reader

use super::requirements_txt::{parse_requirement, strip_line};
use super::toml_lite::{LiteDocument, LiteValue};
use super::{collect_lite_section, collect_toml_table};
use crate::domain::DependencyMap;
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

/// Interpreter constraint, not a package
const EXCLUDED: [&str; 1] = ["python"];

const POETRY_SECTIONS: [&str; 2] = ["tool.poetry.dependencies", "tool.poetry.dev-dependencies"];

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).unwrap());

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

impl ManifestParser for PyprojectTomlParser {
    fn parse(&self, content: &str) -> DependencyMap {
        match toml::from_str::<toml::Table>(content) {
            Ok(doc) => parse_document(&doc),
            Err(e) => {
                tracing::debug!(error = %e, "pyproject.toml is malformed, salvaging dependency tables");
                parse_lite(&LiteDocument::parse(content))
            }
        }
    }

    fn filename(&self) -> &'static str {
        "pyproject.toml"
    }
}

fn parse_document(doc: &toml::Table) -> DependencyMap {
    let mut deps = DependencyMap::new();

    if let Some(requirements) = doc
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        for requirement in requirements.iter().filter_map(|r| r.as_str()) {
            insert_requirement(requirement, &mut deps);
        }
    }

    let Some(poetry) = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.as_table())
    else {
        return deps;
    };

    for key in ["dependencies", "dev-dependencies"] {
        if let Some(table) = poetry.get(key).and_then(|v| v.as_table()) {
            collect_toml_table(table, &EXCLUDED, &mut deps);
        }
    }

    if let Some(groups) = poetry.get("group").and_then(|g| g.as_table()) {
        for group in groups.values() {
            if let Some(table) = group.get("dependencies").and_then(|d| d.as_table()) {
                collect_toml_table(table, &EXCLUDED, &mut deps);
            }
        }
    }

    deps
}

fn parse_lite(doc: &LiteDocument) -> DependencyMap {
    let mut deps = DependencyMap::new();

    // Only single-line arrays survive the line reader
    for (key, value) in doc.section("project") {
        if let (true, LiteValue::Other(array)) = (key == "dependencies", value) {
            for caps in QUOTED_RE.captures_iter(array) {
                if let Some(requirement) = caps.get(1).or_else(|| caps.get(2)) {
                    insert_requirement(requirement.as_str(), &mut deps);
                }
            }
        }
    }

    for section in POETRY_SECTIONS {
        collect_lite_section(doc.section(section), &EXCLUDED, &mut deps);
    }

    deps
}

fn insert_requirement(requirement: &str, deps: &mut DependencyMap) {
    match parse_requirement(strip_line(requirement)) {
        Some((name, constraint)) => {
            deps.insert(name, constraint);
        }
        None => tracing::debug!(requirement, "skipping unrecognized requirement"),
    }
}
