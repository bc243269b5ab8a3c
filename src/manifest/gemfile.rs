//! Gemfile parser for Ruby projects
//!
//! Handles:
//! - gem declarations with single or double quotes
//! - Pessimistic version constraints (~>)
//! - Gems without a version (treated as "latest")

use crate::domain::{DependencyMap, LATEST_CONSTRAINT};
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

// gem "name"[, "constraint"]; further arguments are ignored
static GEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^gem\s*\(?\s*["']([^"']+)["']\s*(?:,\s*["']([^"']+)["'])?"#).unwrap()
});

/// Parser for Gemfile files
pub struct GemfileParser;

impl ManifestParser for GemfileParser {
    fn parse(&self, content: &str) -> DependencyMap {
        let mut deps = DependencyMap::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if !trimmed.starts_with("gem") {
                continue;
            }

            let Some(caps) = GEM_RE.captures(trimmed) else {
                tracing::debug!(line = trimmed, "skipping unrecognized gem declaration");
                continue;
            };

            let constraint = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| LATEST_CONSTRAINT.to_string());
            deps.insert(caps[1].to_string(), constraint);
        }

        deps
    }

    fn filename(&self) -> &'static str {
        "Gemfile"
    }
}
