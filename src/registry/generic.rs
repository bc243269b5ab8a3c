//! Generic JSON registry client
//!
//! Best-effort GET of a URL template (`{name}` is replaced with the package
//! name). The body is searched for a `version` or `latest` string and an
//! optional `description`.

use super::non_empty;
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde_json::Value;

/// Placeholder replaced by the package name
const NAME_PLACEHOLDER: &str = "{name}";

/// Generic client
pub struct GenericClient {
    client: HttpClient,
    template: String,
}

impl GenericClient {
    /// Create a new generic client from a URL template
    pub fn new(client: HttpClient, template: impl Into<String>) -> Self {
        Self {
            client,
            template: template.into(),
        }
    }

    fn build_url(&self, package: &str) -> String {
        if self.template.contains(NAME_PLACEHOLDER) {
            self.template.replace(NAME_PLACEHOLDER, package)
        } else {
            format!("{}/{}", self.template.trim_end_matches('/'), package)
        }
    }
}

#[async_trait]
impl RegistryClient for GenericClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::Generic
    }

    async fn fetch_latest(&self, package: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_url(package);
        let body: Value = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let version = ["version", "latest"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .ok_or_else(|| {
                RegistryError::invalid_response(package, "generic", "no version field in response")
            })?;

        Ok(RegistryMetadata {
            description: non_empty(
                body.get("description")
                    .and_then(|d| d.as_str())
                    .map(str::to_string),
            ),
            ..RegistryMetadata::with_version(version)
        })
    }
}
