//! go.mod parser for Go projects
//!
//! Handles:
//! - require statements (single and block)
//! - `// indirect` comments
//! - replace and exclude directives (skipped)

use crate::domain::DependencyMap;
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

/// Parser for go.mod files
pub struct GoModParser;

// Regex for single require: require module/path v1.2.3
static SINGLE_REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^require\s+(\S+)\s+(v\S+)\s*(//.*)?$").unwrap());

// Regex for require block entry: module/path v1.2.3
static BLOCK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(v\S+)\s*(//.*)?$").unwrap());

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Skipped,
}

impl ManifestParser for GoModParser {
    fn parse(&self, content: &str) -> DependencyMap {
        let mut deps = DependencyMap::new();
        let mut block = Block::None;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            if trimmed == ")" {
                block = Block::None;
                continue;
            }

            if let Some(directive) = trimmed.strip_suffix('(') {
                block = match directive.trim() {
                    "require" => Block::Require,
                    _ => Block::Skipped,
                };
                continue;
            }

            let caps = match block {
                Block::Skipped => continue,
                Block::Require => BLOCK_ENTRY_RE.captures(trimmed),
                Block::None => SINGLE_REQUIRE_RE.captures(trimmed),
            };

            match caps {
                Some(caps) => {
                    deps.insert(caps[1].to_string(), caps[2].to_string());
                }
                None if block == Block::Require => {
                    tracing::debug!(line = trimmed, "skipping unrecognized require entry")
                }
                None => {}
            }
        }

        deps
    }

    fn filename(&self) -> &'static str {
        "go.mod"
    }
}
