//! Gerrit change queries over REST.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};
use tryhub_core::ports::{ChangeTracker, QueryOptions};
use tryhub_core::{ChangeInfo, Error, Result};
use url::Url;

/// Gerrit prefixes JSON bodies with this line to defeat XSSI.
const XSSI_PREFIX: &str = ")]}'";

/// Gerrit client configuration.
#[derive(Debug, Clone)]
pub struct GerritConfig {
    /// Review server base URL, e.g. `https://go-review.googlesource.com`.
    pub base_url: String,
    /// Transport-level timeout for one request.
    pub request_timeout: Duration,
}

impl Default for GerritConfig {
    fn default() -> Self {
        Self {
            base_url: "https://go-review.googlesource.com".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GerritConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Anonymous Gerrit REST client.
pub struct GerritClient {
    changes_url: Url,
    client: reqwest::Client,
}

impl GerritClient {
    pub fn new(config: GerritConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid Gerrit URL {:?}: {e}", config.base_url)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let changes_url = base
            .join("changes/")
            .map_err(|e| Error::Config(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            changes_url,
            client,
        })
    }
}

#[async_trait]
impl ChangeTracker for GerritClient {
    async fn query_changes(&self, query: &str, options: &QueryOptions) -> Result<Vec<ChangeInfo>> {
        let mut params: Vec<(&str, &str)> = vec![("q", query)];
        params.extend(options.fields.iter().map(|f| ("o", f.as_str())));

        debug!(query, "Querying Gerrit changes");
        let response = self
            .client
            .get(self.changes_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Gerrit request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("reading Gerrit response: {e}")))?;
        if !status.is_success() {
            error!(status = %status, "Gerrit query failed");
            return Err(Error::Upstream(format!(
                "Gerrit returned {status}: {}",
                body.trim()
            )));
        }

        let json = body.strip_prefix(XSSI_PREFIX).unwrap_or(&body);
        let changes: Vec<ChangeInfo> = serde_json::from_str(json)
            .map_err(|e| Error::Upstream(format!("decoding Gerrit response: {e}")))?;
        debug!(count = changes.len(), "Gerrit query returned");
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_url() {
        assert!(matches!(
            GerritClient::new(GerritConfig::new("not a url")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_changes_url_keeps_path() {
        let client = GerritClient::new(GerritConfig::new("https://review.example.com/r")).unwrap();
        assert_eq!(
            client.changes_url.as_str(),
            "https://review.example.com/r/changes/"
        );
    }
}
