//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the core domain and external adapters.

use crate::corpus::GitHash;
use crate::{ChangeInfo, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Something that can enumerate the git refs of a project that are not
/// code-review refs. Implemented by `GerritProject`, or a fake in tests.
pub trait NonChangeRefLister {
    /// Every non-change ref with its hash, sorted by ref name.
    fn non_change_refs(&self) -> Result<Box<dyn Iterator<Item = (&str, &GitHash)> + '_>>;
}

/// Options for a change query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Extra fields to request, e.g. `CURRENT_REVISION`.
    pub fields: Vec<String>,
}

/// Query surface of the remote change-tracking service.
#[async_trait]
pub trait ChangeTracker: Send + Sync {
    /// Returns the changes matching `query`.
    async fn query_changes(&self, query: &str, options: &QueryOptions) -> Result<Vec<ChangeInfo>>;
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
