//! depscout - Multi-ecosystem dependency analysis and update library
//!
//! This library provides the core functionality for finding outdated
//! dependencies and applying updates across package ecosystems:
//! - JavaScript/TypeScript (package.json)
//! - Rust (Cargo.toml)
//! - Python (requirements.txt, pyproject.toml)
//! - Go (go.mod)
//! - Ruby (Gemfile)

pub mod analyzer;
pub mod cli;
pub mod domain;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod output;
pub mod package_manager;
pub mod progress;
pub mod registry;
pub mod update;
