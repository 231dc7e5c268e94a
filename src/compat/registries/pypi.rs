//! PyPI registry client for fetching Python package releases

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::compat::error::RegistryError;
use crate::compat::registry::Registry;
use crate::compat::types::{PackageReleases, Releases};

/// PyPI registry client
pub struct PypiRegistry {
    client: Client,
    base_url: String,
}

impl PypiRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .user_agent("python-compat")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn package_url(&self, package_name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package_name)
    }

    fn release_url(&self, package_name: &str, version: &str) -> String {
        format!("{}/pypi/{}/{}/json", self.base_url, package_name, version)
    }

    async fn get(&self, url: &str, package_name: &str) -> Result<Response, RegistryError> {
        debug!("Fetching PyPI metadata: {}", url);

        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RegistryError::NotFound(package_name.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                Err(RegistryError::RateLimited { retry_after_secs })
            }
            status if !status.is_success() => Err(RegistryError::InvalidResponse(format!(
                "PyPI API returned status {}",
                status
            ))),
            _ => Ok(response),
        }
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    #[serde(default)]
    releases: Releases,
}

/// Extract the `releases` table from a PyPI JSON API document
pub fn parse_releases(body: &str) -> Result<Releases, RegistryError> {
    serde_json::from_str::<PypiResponse>(body)
        .map(|response| response.releases)
        .map_err(|e| RegistryError::InvalidResponse(e.to_string()))
}

/// Per-release JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiReleaseResponse {
    info: PypiReleaseInfo,
}

#[derive(Debug, Deserialize)]
struct PypiReleaseInfo {
    #[serde(default)]
    requires_python: Option<String>,
}

#[async_trait]
impl Registry for PypiRegistry {
    async fn fetch_releases(&self, package_name: &str) -> Result<PackageReleases, RegistryError> {
        let url = self.package_url(package_name);

        let body = self.get(&url, package_name).await?.text().await?;
        let releases = parse_releases(&body)?;

        debug!(
            "Found {} releases for package {}",
            releases.len(),
            package_name
        );

        Ok(PackageReleases {
            source: url,
            releases,
        })
    }

    async fn fetch_release_requires_python(
        &self,
        package_name: &str,
        version: &str,
    ) -> Result<Option<String>, RegistryError> {
        let url = self.release_url(package_name, version);

        let release: PypiReleaseResponse = self
            .get(&url, package_name)
            .await?
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        Ok(release
            .info
            .requires_python
            .filter(|spec| !spec.trim().is_empty()))
    }
}
