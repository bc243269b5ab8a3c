//! npm Registry client
//!
//! Fetches package metadata from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use super::{non_empty, parse_timestamp};
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// npm Registry client
pub struct NpmClient {
    client: HttpClient,
    base_url: String,
}

/// npm package document (packument)
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Per-version manifests
    #[serde(default)]
    versions: HashMap<String, Value>,
    /// Publish times; `unpublished` entries are objects
    #[serde(default)]
    time: HashMap<String, Value>,
    description: Option<String>,
    homepage: Option<String>,
    repository: Option<Value>,
    license: Option<Value>,
    #[serde(default)]
    maintainers: Vec<Value>,
    deprecated: Option<Value>,
}

impl NpmClient {
    /// Create a new npm client
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package; the scope separator is percent-encoded
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, package.replace('/', "%2f"))
    }
}

#[async_trait]
impl RegistryClient for NpmClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::Npm
    }

    async fn fetch_latest(&self, package: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        normalize(package, response)
    }
}

fn normalize(package: &str, response: NpmPackageResponse) -> Result<RegistryMetadata, RegistryError> {
    let latest = response.dist_tags.get("latest").cloned().ok_or_else(|| {
        RegistryError::invalid_response(package, "npm", "missing dist-tags.latest")
    })?;
    let version_doc = response.versions.get(&latest);

    let mut metadata = RegistryMetadata {
        description: non_empty(response.description),
        homepage: non_empty(response.homepage)
            .or_else(|| string_field(version_doc, "homepage")),
        repository_url: response.repository.as_ref().and_then(repository_url),
        license: response
            .license
            .as_ref()
            .and_then(license_name)
            .or_else(|| version_doc.and_then(|v| v.get("license")).and_then(license_name)),
        last_published: response
            .time
            .get(&latest)
            .and_then(|t| t.as_str())
            .and_then(parse_timestamp),
        maintainers: response
            .maintainers
            .iter()
            .filter_map(|m| m.get("name").and_then(|n| n.as_str()).map(str::to_string))
            .collect(),
        ..RegistryMetadata::with_version(latest.as_str())
    };

    let deprecation = response
        .deprecated
        .as_ref()
        .or_else(|| version_doc.and_then(|v| v.get("deprecated")));
    if let Some(deprecation) = deprecation {
        match deprecation {
            Value::String(message) => metadata = metadata.deprecated(Some(message.clone())),
            Value::Bool(false) | Value::Null => {}
            _ => metadata = metadata.deprecated(None),
        }
    }

    Ok(metadata)
}

fn string_field(doc: Option<&Value>, key: &str) -> Option<String> {
    non_empty(doc?.get(key)?.as_str().map(str::to_string))
}

/// `repository` is either a URL string or `{ "type": "git", "url": "..." }`
fn repository_url(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("url")?.as_str()?,
        _ => return None,
    };
    non_empty(Some(url.trim_start_matches("git+").to_string()))
}

/// `license` is either an SPDX string or a legacy `{ "type": "MIT" }` object
fn license_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("type")?.as_str()?,
        _ => return None,
    };
    non_empty(Some(name.to_string()))
}
