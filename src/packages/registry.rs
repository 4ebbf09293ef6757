//! Latest-version lookup against a PyPI-compatible index.
//!
//! The lookup is best-effort: every failure (no network, timeout, HTTP
//! error status, unexpected body) yields `None` and is only logged at
//! debug level.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Something that can report the latest published version of a package.
pub trait VersionSource {
    /// Latest version of `package`, or `None` if it cannot be determined.
    fn latest_version(&self, package: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    version: String,
}

/// Client for the `GET /pypi/<package>/json` endpoint.
pub struct PypiRegistry {
    index_url: String,
    client: Option<reqwest::blocking::Client>,
}

impl PypiRegistry {
    /// Registry at `index_url` with a per-request `timeout`.
    pub fn new(index_url: &str, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("basecamp/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| tracing::debug!("Cannot build HTTP client: {}", e))
            .ok();

        Self {
            index_url: index_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// JSON endpoint for `package`.
    pub fn package_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.index_url, package)
    }

    fn fetch(&self, package: &str) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("HTTP client unavailable"))?;
        let url = self.package_url(package);

        let response = client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let body: PypiResponse = response
            .json()
            .with_context(|| format!("Unexpected response from {}", url))?;

        let version = body.info.version.trim().to_string();
        if version.is_empty() {
            bail!("Empty version in response from {}", url);
        }
        Ok(version)
    }
}

impl VersionSource for PypiRegistry {
    fn latest_version(&self, package: &str) -> Option<String> {
        match self.fetch(package) {
            Ok(version) => {
                tracing::debug!("Latest {} is {}", package, version);
                Some(version)
            }
            Err(e) => {
                tracing::debug!("Version lookup for {} failed: {:#}", package, e);
                None
            }
        }
    }
}
