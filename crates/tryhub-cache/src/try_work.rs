//! Aggregated pending try-bot work.
//!
//! One process-wide entry, refreshed by polling the change tracker. All
//! callers go through a single mutex held for the whole poll, so at most
//! one remote query is in flight and late arrivals wait for its result.

use crate::config::CacheConfig;
use crate::releases::supported_go_releases;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use tryhub_core::corpus::{Corpus, CorpusData, GerritCl};
use tryhub_core::ports::{ChangeTracker, Clock, QueryOptions};
use tryhub_core::version::parse_release_branch;
use tryhub_core::{ChangeInfo, Error, GoRelease, MajorMinor, Result, TryWorkItem};

const MASTER: &str = "master";
const MASTER_REF: &str = "refs/heads/master";

#[derive(Debug, Default)]
struct CacheState {
    /// Label change count `value` was computed for.
    for_num_changes: usize,
    last_poll: Option<DateTime<Utc>>,
    value: Option<Vec<TryWorkItem>>,
}

struct Inner {
    corpus: Arc<Corpus>,
    tracker: Arc<dyn ChangeTracker>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

/// Cheaply cloneable handle to the shared try-work cache.
#[derive(Clone)]
pub struct TryWorkCache {
    inner: Arc<Inner>,
}

impl TryWorkCache {
    pub fn new(
        corpus: Arc<Corpus>,
        tracker: Arc<dyn ChangeTracker>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                corpus,
                tracker,
                clock,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns the pending try-bot work, sorted by commit.
    ///
    /// The poll runs on its own task: a caller that goes away does not
    /// cancel a poll other callers are waiting on.
    pub async fn get_try_work(&self) -> Result<Vec<TryWorkItem>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.get_try_work().await })
            .await
            .map_err(|e| Error::Internal(format!("try-work poll failed: {e}")))?
    }

    /// The currently supported releases, newest first.
    pub async fn list_go_releases(&self) -> Result<Vec<GoRelease>> {
        let config = &self.inner.config;
        let corpus = self.inner.corpus.read().await;
        let go_project = corpus
            .project(&config.server, &config.go_project)
            .ok_or_else(|| Error::UnknownProject {
                server: config.server.clone(),
                project: config.go_project.clone(),
            })?;
        supported_go_releases(go_project)
    }
}

impl Inner {
    #[instrument(skip(self), fields(server = %self.config.server))]
    async fn get_try_work(&self) -> Result<Vec<TryWorkItem>> {
        let mut state = self.state.lock().await;

        let sum_changes = self
            .corpus
            .read()
            .await
            .num_label_changes(&self.config.server);
        let now = self.clock.now();

        if let Some(value) = &state.value {
            let recent = state.last_poll.is_some_and(|last| self.polled_recently(last, now));
            if state.for_num_changes == sum_changes || recent {
                debug!(sum_changes, "Serving cached try work");
                return Ok(value.clone());
            }
        }

        let changes = self.query_pending().await?;
        let work = {
            let corpus = self.corpus.read().await;
            self.assemble(&corpus, &changes)?
        };

        info!(
            sum_changes,
            items = work.len(),
            "Cached try work for label changes"
        );
        *state = CacheState {
            for_num_changes: sum_changes,
            last_poll: Some(now),
            value: Some(work.clone()),
        };
        Ok(work)
    }

    fn polled_recently(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - last).to_std() {
            Ok(elapsed) => elapsed < self.config.max_poll_interval,
            // The clock went backwards.
            Err(_) => true,
        }
    }

    async fn query_pending(&self) -> Result<Vec<ChangeInfo>> {
        let options = QueryOptions {
            fields: self.config.query_fields.clone(),
        };
        let timeout = self.config.query_timeout;
        match tokio::time::timeout(
            timeout,
            self.tracker.query_changes(&self.config.query, &options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(?timeout, "Try-bot query timed out");
                Err(Error::UpstreamTimeout {
                    seconds: timeout.as_secs(),
                })
            }
        }
    }

    fn assemble(&self, corpus: &CorpusData, changes: &[ChangeInfo]) -> Result<Vec<TryWorkItem>> {
        let server = &self.config.server;
        let go_project = corpus
            .project(server, &self.config.go_project)
            .ok_or_else(|| Error::UnknownProject {
                server: server.clone(),
                project: self.config.go_project.clone(),
            })?;
        let releases = supported_go_releases(go_project)?;
        let latest = releases[0].major_minor();
        let go_master = match go_project.ref_hash(MASTER_REF) {
            Some(hash) => hash.to_string(),
            None => {
                warn!(project = %self.config.go_project, "No master ref in corpus");
                String::new()
            }
        };

        let mut work = Vec::with_capacity(changes.len());
        for change in changes {
            let Some(cl) = corpus
                .project(server, &change.project)
                .and_then(|p| p.cl(change.change_number))
            else {
                warn!(
                    project = %change.project,
                    change = change.change_number,
                    "Change not in corpus, skipping"
                );
                continue;
            };
            let Some(mut item) = try_work_item(&change.project, cl, change) else {
                warn!(change = change.change_number, "Change has no known commit, skipping");
                continue;
            };

            if item.project == self.config.go_project {
                let version = match item.branch.as_str() {
                    MASTER => latest,
                    branch => parse_release_branch(branch)
                        .map_or(latest, |(major, minor)| MajorMinor::new(major, minor)),
                };
                item.go_version = vec![version];
            } else {
                item.go_commit = std::iter::once(go_master.clone())
                    .chain(releases.iter().map(|r| r.branch_commit.clone()))
                    .collect();
                item.go_branch = std::iter::once(MASTER.to_string())
                    .chain(releases.iter().map(|r| r.branch_name.clone()))
                    .collect();
                item.go_version = std::iter::once(latest)
                    .chain(releases.iter().map(GoRelease::major_minor))
                    .collect();
            }
            work.push(item);
        }

        work.sort_by(|a, b| a.commit.cmp(&b.commit));
        Ok(work)
    }
}

/// The work item for a change, preferring the tracker's current revision
/// over the corpus commit since the corpus may lag behind.
fn try_work_item(project: &str, cl: &GerritCl, change: &ChangeInfo) -> Option<TryWorkItem> {
    let commit = change
        .current_revision
        .clone()
        .filter(|rev| !rev.is_empty())
        .or_else(|| cl.commit.as_ref().map(|c| c.hash.to_string()))?;
    Some(TryWorkItem {
        project: project.to_string(),
        branch: cl.branch_name().to_string(),
        change_id: cl.change_id.clone(),
        commit,
        go_version: vec![],
        go_commit: vec![],
        go_branch: vec![],
    })
}
