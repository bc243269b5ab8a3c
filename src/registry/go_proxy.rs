//! Go Module Proxy client
//!
//! Fetches the latest module version from the Go Module Proxy.
//! API endpoint: https://proxy.golang.org/{module}/@latest

use super::parse_timestamp;
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;

/// Go Module Proxy client
pub struct GoProxyClient {
    client: HttpClient,
    base_url: String,
}

/// `@latest` response
#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Time")]
    time: Option<String>,
}

impl GoProxyClient {
    /// Create a new Go Proxy client
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for the latest version
    fn build_latest_url(&self, module: &str) -> String {
        format!("{}/{}/@latest", self.base_url, encode_module_path(module))
    }
}

/// Encode a module path for the Go Proxy URL.
///
/// Uppercase letters become `!` followed by the lowercase letter.
fn encode_module_path(module: &str) -> String {
    let mut encoded = String::with_capacity(module.len() + 4);

    for ch in module.chars() {
        if ch.is_uppercase() {
            encoded.push('!');
            encoded.extend(ch.to_lowercase());
        } else {
            encoded.push(ch);
        }
    }

    encoded
}

#[async_trait]
impl RegistryClient for GoProxyClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::GoProxy
    }

    async fn fetch_latest(&self, module: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_latest_url(module);
        let response: LatestResponse = self
            .client
            .get_json(&url, module, self.registry_name())
            .await?;

        Ok(RegistryMetadata {
            last_published: response.time.as_deref().and_then(parse_timestamp),
            ..RegistryMetadata::with_version(response.version)
        })
    }
}
