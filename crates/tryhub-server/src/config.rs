//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tryhub_cache::CacheConfig;

/// Server configuration, loaded from YAML. An empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Gerrit review server queried for pending try work.
    #[serde(default = "default_gerrit_url")]
    pub gerrit_url: String,
    /// Git server whose corpus projects are counted and looked up.
    #[serde(default = "default_gerrit_server")]
    pub gerrit_server: String,
    #[serde(default = "default_go_project")]
    pub go_project: String,
    /// Minimum seconds between two change queries while labels keep moving.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    /// Builder catalog to load instead of the compiled-in one.
    #[serde(default)]
    pub builders_file: Option<PathBuf>,
    /// Corpus snapshot to start from; the corpus starts empty without one.
    #[serde(default)]
    pub corpus_file: Option<PathBuf>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_gerrit_url() -> String {
    "https://go-review.googlesource.com".to_string()
}

fn default_gerrit_server() -> String {
    "go.googlesource.com".to_string()
}

fn default_go_project() -> String {
    "go".to_string()
}

fn default_poll_interval() -> u64 {
    15
}

fn default_query_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            gerrit_url: default_gerrit_url(),
            gerrit_server: default_gerrit_server(),
            go_project: default_go_project(),
            poll_interval_secs: default_poll_interval(),
            query_timeout_secs: default_query_timeout(),
            builders_file: None,
            corpus_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> anyhow::Result<Self> {
        // serde_yaml reads an empty document as null.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_server(&self.gerrit_server)
            .with_go_project(&self.go_project)
            .with_max_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_query_timeout(Duration::from_secs(self.query_timeout_secs))
    }
}
