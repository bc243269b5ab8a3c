//! RubyGems API client
//!
//! API endpoint: https://rubygems.org/api/v1/gems/{gem}.json

use super::{non_empty, parse_timestamp};
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;

/// RubyGems client
pub struct RubyGemsClient {
    client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GemResponse {
    version: String,
    info: Option<String>,
    homepage_uri: Option<String>,
    source_code_uri: Option<String>,
    #[serde(default)]
    licenses: Option<Vec<String>>,
    downloads: Option<u64>,
    version_created_at: Option<String>,
    /// Comma-separated author list
    authors: Option<String>,
}

impl RubyGemsClient {
    /// Create a new RubyGems client
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, gem: &str) -> String {
        format!("{}/api/v1/gems/{}.json", self.base_url, gem)
    }
}

#[async_trait]
impl RegistryClient for RubyGemsClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::RubyGems
    }

    async fn fetch_latest(&self, gem: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_url(gem);
        let response: GemResponse = self
            .client
            .get_json(&url, gem, self.registry_name())
            .await?;

        Ok(RegistryMetadata {
            description: non_empty(response.info),
            homepage: non_empty(response.homepage_uri),
            repository_url: non_empty(response.source_code_uri),
            license: response
                .licenses
                .filter(|l| !l.is_empty())
                .map(|l| l.join(" OR ")),
            download_count: response.downloads,
            last_published: response
                .version_created_at
                .as_deref()
                .and_then(parse_timestamp),
            maintainers: response
                .authors
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            ..RegistryMetadata::with_version(response.version)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base: &str) -> RubyGemsClient {
        RubyGemsClient::new(HttpClient::new().unwrap(), base)
    }

    #[test]
    fn test_rubygems_client_registry() {
        let client = adapter("https://rubygems.org");
        assert_eq!(client.registry_id(), RegistryId::RubyGems);
        assert_eq!(client.registry_name(), "RubyGems");
        assert_eq!(
            client.build_url("rails"),
            "https://rubygems.org/api/v1/gems/rails.json"
        );
    }

    #[tokio::test]
    async fn test_fetch_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/gems/rails.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "rails",
                "version": "7.1.3",
                "info": "Full-stack web application framework.",
                "homepage_uri": "https://rubyonrails.org",
                "source_code_uri": "https://github.com/rails/rails/tree/v7.1.3",
                "licenses": ["MIT"],
                "downloads": 500000000u64,
                "version_created_at": "2024-01-16T22:00:00.000Z",
                "authors": "David Heinemeier Hansson, Rails Core"
            })))
            .mount(&server)
            .await;

        let meta = adapter(&server.uri()).fetch_latest("rails").await.unwrap();
        assert_eq!(meta.latest_version, "7.1.3");
        assert_eq!(meta.license.as_deref(), Some("MIT"));
        assert_eq!(meta.download_count, Some(500_000_000));
        assert_eq!(meta.maintainers.len(), 2);
        assert!(meta.last_published.is_some());
    }

    #[tokio::test]
    async fn test_fetch_latest_minimal_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/gems/tiny.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.0.1" })))
            .mount(&server)
            .await;

        let meta = adapter(&server.uri()).fetch_latest("tiny").await.unwrap();
        assert_eq!(meta.latest_version, "0.0.1");
        assert!(meta.maintainers.is_empty());
        assert!(meta.license.is_none());
    }
}
