//! crates.io API client
//!
//! Fetches crate metadata from crates.io.
//! API endpoint: https://crates.io/api/v1/crates/{crate}
//!
//! Note: crates.io requires a User-Agent header (handled by HttpClient)
//! and asks crawlers to stay at 1 request/second.

use super::{non_empty, parse_timestamp};
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Default spacing between requests
pub const DEFAULT_CRATES_IO_INTERVAL: Duration = Duration::from_secs(1);

/// crates.io client with rate limiting
pub struct CratesIoClient {
    client: HttpClient,
    base_url: String,
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

/// crates.io crate response
#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
    /// Versions, newest first
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    description: Option<String>,
    homepage: Option<String>,
    repository: Option<String>,
    downloads: Option<u64>,
}

/// Crate version information
#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    #[serde(default)]
    yanked: bool,
    license: Option<String>,
    created_at: Option<String>,
}

impl CratesIoClient {
    /// Create a new crates.io client
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: DEFAULT_CRATES_IO_INTERVAL,
            last_request: Mutex::new(None),
        }
    }

    /// Set the minimum spacing between requests
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Build the URL for a crate
    fn build_url(&self, crate_name: &str) -> String {
        format!("{}/api/v1/crates/{}", self.base_url, crate_name)
    }

    /// Wait until `interval` has passed since the previous request.
    ///
    /// The lock is held across the sleep so concurrent callers queue up.
    async fn apply_rate_limit(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    /// Single request without rate limiting
    async fn request(&self, crate_name: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_url(crate_name);
        let response: CratesIoResponse = self
            .client
            .get_json(&url, crate_name, self.registry_name())
            .await?;

        let version = select_latest(&response.versions).ok_or_else(|| {
            RegistryError::invalid_response(crate_name, "crates.io", "no non-yanked versions")
        })?;

        Ok(RegistryMetadata {
            description: non_empty(response.krate.description),
            homepage: non_empty(response.krate.homepage),
            repository_url: non_empty(response.krate.repository),
            download_count: response.krate.downloads,
            license: non_empty(version.license.clone()),
            last_published: version.created_at.as_deref().and_then(parse_timestamp),
            ..RegistryMetadata::with_version(version.num.as_str())
        })
    }
}

#[async_trait]
impl RegistryClient for CratesIoClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::CratesIo
    }

    async fn fetch_latest(&self, crate_name: &str) -> Result<RegistryMetadata, RegistryError> {
        self.apply_rate_limit().await;
        self.request(crate_name).await
    }

    async fn fetch_latest_within(
        &self,
        crate_name: &str,
        timeout: Duration,
    ) -> Result<RegistryMetadata, RegistryError> {
        // Queueing for the rate limit is not part of the lookup's budget
        self.apply_rate_limit().await;
        tokio::time::timeout(timeout, self.request(crate_name))
            .await
            .unwrap_or_else(|_| Err(RegistryError::timeout(crate_name, self.registry_name())))
    }
}

/// Newest non-yanked version by semver precedence, pre-releases included.
///
/// Versions that are not valid semver only win when nothing else is left.
fn select_latest(versions: &[CrateVersion]) -> Option<&CrateVersion> {
    let available: Vec<&CrateVersion> = versions.iter().filter(|v| !v.yanked).collect();

    available
        .iter()
        .filter_map(|v| semver::Version::parse(&v.num).ok().map(|s| (s, *v)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, v)| v)
        .or_else(|| available.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base: &str) -> CratesIoClient {
        CratesIoClient::new(HttpClient::new().unwrap(), base).with_interval(Duration::ZERO)
    }

    fn version(num: &str, yanked: bool) -> CrateVersion {
        CrateVersion {
            num: num.to_string(),
            yanked,
            license: None,
            created_at: None,
        }
    }

    #[test]
    fn test_crates_io_client_registry() {
        let client = adapter("https://crates.io");
        assert_eq!(client.registry_id(), RegistryId::CratesIo);
        assert_eq!(client.registry_name(), "crates.io");
    }

    #[test]
    fn test_build_url() {
        let client = adapter("https://crates.io");
        assert_eq!(
            client.build_url("serde_json"),
            "https://crates.io/api/v1/crates/serde_json"
        );
    }

    #[test]
    fn test_select_latest_skips_yanked() {
        let versions = vec![version("1.2.0", true), version("1.1.0", false), version("1.0.0", false)];
        assert_eq!(select_latest(&versions).unwrap().num, "1.1.0");
    }

    #[test]
    fn test_select_latest_newer_prerelease_wins() {
        let versions = vec![version("2.0.0-rc.1", false), version("1.5.0", false)];
        assert_eq!(select_latest(&versions).unwrap().num, "2.0.0-rc.1");
    }

    #[test]
    fn test_select_latest_yanked_prerelease_skipped() {
        let versions = vec![version("2.0.0-rc.1", true), version("1.5.0", false)];
        assert_eq!(select_latest(&versions).unwrap().num, "1.5.0");
    }

    #[test]
    fn test_select_latest_release_beats_its_prerelease() {
        let versions = vec![version("2.0.0-rc.1", false), version("2.0.0", false)];
        assert_eq!(select_latest(&versions).unwrap().num, "2.0.0");
    }

    #[test]
    fn test_select_latest_prerelease_only() {
        let versions = vec![version("0.1.0-alpha.2", false), version("0.1.0-alpha.1", false)];
        assert_eq!(select_latest(&versions).unwrap().num, "0.1.0-alpha.2");
    }

    #[test]
    fn test_select_latest_all_yanked() {
        assert!(select_latest(&[version("1.0.0", true)]).is_none());
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(DEFAULT_CRATES_IO_INTERVAL, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fetch_latest_first_entry_yanked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/crates/demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "crate": {
                    "name": "demo",
                    "description": "A demo crate",
                    "repository": "https://github.com/example/demo",
                    "downloads": 12345
                },
                "versions": [
                    { "num": "2.0.0", "yanked": true, "license": "MIT", "created_at": "2024-05-01T00:00:00Z" },
                    { "num": "1.5.0", "yanked": false, "license": "MIT OR Apache-2.0", "created_at": "2024-03-01T12:00:00.123456+00:00" }
                ]
            })))
            .mount(&server)
            .await;

        let meta = adapter(&server.uri()).fetch_latest("demo").await.unwrap();
        assert_eq!(meta.latest_version, "1.5.0");
        assert!(!meta.is_deprecated);
        assert_eq!(meta.license.as_deref(), Some("MIT OR Apache-2.0"));
        assert_eq!(meta.download_count, Some(12345));
        assert_eq!(meta.description.as_deref(), Some("A demo crate"));
        assert!(meta.last_published.is_some());
    }

    #[tokio::test]
    async fn test_queued_lookups_do_not_use_up_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "crate": {},
                "versions": [{ "num": "1.0.0" }]
            })))
            .mount(&server)
            .await;

        let client = CratesIoClient::new(HttpClient::new().unwrap(), &server.uri())
            .with_interval(Duration::from_millis(150));
        let timeout = Duration::from_millis(400);
        let names = ["c0", "c1", "c2", "c3", "c4", "c5"];

        let results = futures::future::join_all(
            names
                .iter()
                .map(|name| client.fetch_latest_within(name, timeout)),
        )
        .await;

        for result in results {
            assert_eq!(result.unwrap().latest_version, "1.0.0");
        }
    }

    #[tokio::test]
    async fn test_rate_limit_spacing() {
        let client = CratesIoClient::new(HttpClient::new().unwrap(), "http://unused")
            .with_interval(Duration::from_millis(50));
        let start = Instant::now();
        client.apply_rate_limit().await;
        client.apply_rate_limit().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
