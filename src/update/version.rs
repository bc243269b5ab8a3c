//! Version string normalization
//!
//! Registries and manifests use loosely formatted versions (`v1.2`, `^1.0`,
//! `>= 2.0, < 3`). These helpers reduce them to something `semver` accepts.

use semver::Version;

/// Reduce a raw constraint to a plain version string.
///
/// Compound ranges keep their first clause; range operators
/// (`^ ~ >= <= > < = == === ~= ~> !=`) are stripped.
pub fn current_version_from_constraint(constraint: &str) -> String {
    let first_clause = constraint
        .split("||")
        .next()
        .and_then(|c| c.split(',').next())
        .unwrap_or_default();

    let stripped = first_clause
        .trim()
        .trim_start_matches(|c| matches!(c, '^' | '~' | '>' | '<' | '=' | '!'))
        .trim();

    stripped
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Parse a version leniently: a leading `v` is ignored and missing minor or
/// patch components are padded with zeros (`1.2` becomes `1.2.0`).
pub fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('v')
        .or_else(|| raw.strip_prefix('V'))
        .unwrap_or(raw);

    let split_at = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(split_at);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty()
        || parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let padding = ".0".repeat(3 - parts.len());
    Version::parse(&format!("{}{}{}", core, padding, suffix)).ok()
}

/// Semver precedence key: build metadata is ignored
pub(crate) fn precedence(v: &Version) -> (u64, u64, u64, &semver::Prerelease) {
    (v.major, v.minor, v.patch, &v.pre)
}
