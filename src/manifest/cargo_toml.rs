//! Cargo.toml parser for Rust projects
//!
//! Handles:
//! - dependencies
//! - dev-dependencies
//! - Inline table format: { version = "1.0" }
//! - Malformed documents, via the line-oriented [`toml_lite`](super::toml_lite) reader

use super::toml_lite::LiteDocument;
use super::{collect_lite_section, collect_toml_table};
use crate::domain::DependencyMap;
use crate::manifest::ManifestParser;

const SECTIONS: [&str; 2] = ["dependencies", "dev-dependencies"];

/// Parser for Cargo.toml files
pub struct CargoTomlParser;

impl ManifestParser for CargoTomlParser {
    fn parse(&self, content: &str) -> DependencyMap {
        let mut deps = DependencyMap::new();

        match toml::from_str::<toml::Table>(content) {
            Ok(doc) => {
                for section in SECTIONS {
                    if let Some(table) = doc.get(section).and_then(|v| v.as_table()) {
                        collect_toml_table(table, &[], &mut deps);
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Cargo.toml is malformed, salvaging dependency tables");
                let doc = LiteDocument::parse(content);
                for section in SECTIONS {
                    collect_lite_section(doc.section(section), &[], &mut deps);
                }
            }
        }

        deps
    }

    fn filename(&self) -> &'static str {
        "Cargo.toml"
    }
}
