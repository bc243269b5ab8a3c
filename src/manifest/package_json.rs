//! package.json parser for JavaScript/TypeScript projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - Malformed JSON, by scanning the dependency objects textually

use crate::domain::DependencyMap;
use crate::manifest::ManifestParser;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Dependency sections read from package.json, later ones overwrite earlier ones
const SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

// Body of a `"section": { ... }` object, without nested braces
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(dependencies|devDependencies)"\s*:\s*\{([^{}]*)\}?"#).unwrap()
});

// A `"name": "version"` pair inside a section body
static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*:\s*"([^"]*)""#).unwrap());

/// Parser for package.json files
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str) -> DependencyMap {
        match serde_json::from_str::<Value>(content) {
            Ok(json) => parse_json(&json),
            Err(e) => {
                tracing::debug!(error = %e, "package.json is not valid JSON, scanning leniently");
                scan_lenient(content)
            }
        }
    }

    fn filename(&self) -> &'static str {
        "package.json"
    }
}

fn parse_json(json: &Value) -> DependencyMap {
    let mut deps = DependencyMap::new();

    for section in SECTIONS {
        let Some(object) = json.get(section).and_then(|v| v.as_object()) else {
            continue;
        };
        for (name, value) in object {
            match value.as_str() {
                Some(version) => {
                    deps.insert(name.clone(), version.to_string());
                }
                None => tracing::debug!(name = %name, "skipping non-string dependency value"),
            }
        }
    }

    deps
}

fn scan_lenient(content: &str) -> DependencyMap {
    let mut sections: Vec<(&str, &str)> = SECTION_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let body = caps.get(2)?.as_str();
            Some((name, body))
        })
        .collect();
    // Keep devDependencies last so they win, as in the structured path
    sections.sort_by_key(|(name, _)| SECTIONS.iter().position(|s| s == name));

    let mut deps = DependencyMap::new();
    for (_, body) in sections {
        for caps in PAIR_RE.captures_iter(body) {
            deps.insert(caps[1].to_string(), caps[2].to_string());
        }
    }
    deps
}
