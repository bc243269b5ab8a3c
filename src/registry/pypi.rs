//! PyPI JSON API client
//!
//! Fetches package metadata from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json

use super::{non_empty, parse_timestamp};
use crate::domain::{RegistryId, RegistryMetadata};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI client
pub struct PyPIClient {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    info: PackageInfo,
    /// Release files keyed by version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
    /// Files of the latest release
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct PackageInfo {
    version: String,
    summary: Option<String>,
    home_page: Option<String>,
    #[serde(default)]
    project_urls: Option<HashMap<String, String>>,
    license: Option<String>,
    author: Option<String>,
    maintainer: Option<String>,
    #[serde(default)]
    yanked: bool,
    yanked_reason: Option<String>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: Option<String>,
}

impl PyPIClient {
    /// Create a new PyPI client
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package)
    }
}

#[async_trait]
impl RegistryClient for PyPIClient {
    fn registry_id(&self) -> RegistryId {
        RegistryId::PyPI
    }

    async fn fetch_latest(&self, package: &str) -> Result<RegistryMetadata, RegistryError> {
        let url = self.build_url(package);
        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(normalize(response))
    }
}

fn normalize(response: PyPIResponse) -> RegistryMetadata {
    let info = response.info;

    let files = response
        .releases
        .get(&info.version)
        .filter(|files| !files.is_empty())
        .unwrap_or(&response.urls);
    let last_published = files
        .iter()
        .filter_map(|f| f.upload_time_iso_8601.as_deref())
        .filter_map(parse_timestamp)
        .min();

    let project_urls = info.project_urls.unwrap_or_default();
    let repository_url = ["Source", "Repository", "Source Code", "Code"]
        .iter()
        .find_map(|key| project_urls.get(*key).cloned());
    let homepage =
        non_empty(info.home_page).or_else(|| project_urls.get("Homepage").cloned());

    let metadata = RegistryMetadata {
        description: non_empty(info.summary),
        homepage,
        repository_url,
        license: non_empty(info.license),
        last_published,
        maintainers: [info.maintainer, info.author]
            .into_iter()
            .filter_map(non_empty)
            .collect(),
        ..RegistryMetadata::with_version(info.version)
    };

    if info.yanked {
        metadata.deprecated(info.yanked_reason)
    } else {
        metadata
    }
}
