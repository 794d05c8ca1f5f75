//! Try-work cache configuration.

use std::time::Duration;

/// Polling knobs for [`crate::TryWorkCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Review server whose projects are counted and searched.
    pub server: String,
    /// The root language repository on `server`.
    pub go_project: String,
    /// Minimum time between remote polls while changes keep arriving.
    pub max_poll_interval: Duration,
    /// Deadline for one remote query.
    pub query_timeout: Duration,
    /// Remote filter for pending try-bot requests.
    pub query: String,
    /// Extra fields requested with each change.
    pub query_fields: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            server: "go.googlesource.com".to_string(),
            go_project: "go".to_string(),
            max_poll_interval: Duration::from_secs(15),
            query_timeout: Duration::from_secs(10),
            query: "label:Run-TryBot=1 label:TryBot-Result=0 status:open".to_string(),
            query_fields: vec!["CURRENT_REVISION".to_string(), "CURRENT_COMMIT".to_string()],
        }
    }
}

impl CacheConfig {
    /// Set the review server scope.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the root repository name.
    pub fn with_go_project(mut self, project: impl Into<String>) -> Self {
        self.go_project = project.into();
        self
    }

    pub fn with_max_poll_interval(mut self, interval: Duration) -> Self {
        self.max_poll_interval = interval;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}
