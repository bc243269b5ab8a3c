//! Declared dependency structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Constraint recorded when a manifest names a package without a version
pub const LATEST_CONSTRAINT: &str = "latest";

/// Declared dependencies of a manifest: name -> raw constraint.
///
/// Inserting an existing name overwrites the earlier constraint.
pub type DependencyMap = BTreeMap<String, String>;

/// A single dependency as written in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    /// Package name
    pub name: String,
    /// Raw version specifier (range, pin, or "latest")
    pub constraint: String,
}

impl DependencyDeclaration {
    /// Creates a new declaration
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// Returns true if no version was specified
    pub fn is_unconstrained(&self) -> bool {
        self.constraint == LATEST_CONSTRAINT
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.constraint)
    }
}

impl From<(String, String)> for DependencyDeclaration {
    fn from((name, constraint): (String, String)) -> Self {
        Self { name, constraint }
    }
}
