//! In-memory view of the git and code-review corpus.
//!
//! The corpus is written by an ingestion process elsewhere and read here.
//! Every read goes through [`Corpus::read`], which hands out a shared
//! guard; keep the guard for a handful of lookups only so the writer
//! does not starve.

use crate::ports::NonChangeRefLister;
use crate::{AncestorCheck, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::Path;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

const CHANGE_REF_PREFIX: &str = "refs/changes/";
const HEADS_PREFIX: &str = "refs/heads/";

/// A full 40 character hex commit hash, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GitHash(String);

impl GitHash {
    pub const LEN: usize = 40;

    /// Validates `value` as a commit hash; `field` names the input in the error.
    pub fn parse(field: &'static str, value: &str) -> Result<Self> {
        if value.len() != Self::LEN || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidCommit {
                field,
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GitHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse("hash", &value)
    }
}

impl From<GitHash> for String {
    fn from(h: GitHash) -> Self {
        h.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    pub hash: GitHash,
    #[serde(default)]
    pub parents: Vec<GitHash>,
    #[serde(default)]
    pub msg: String,
}

/// A review message, tagged with the patch set version it was posted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerritMessage {
    pub version: i32,
    pub message: String,
}

/// Try-bot vote state derived from a change's messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryBotStatus {
    pub try_requested: bool,
    pub done: bool,
}

/// A change request (CL) as known to the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerritCl {
    pub number: i32,
    pub change_id: String,
    /// Full ref name of the target branch, e.g. `refs/heads/master`.
    pub branch: String,
    pub commit: Option<GitCommit>,
    /// Current patch set number.
    pub version: i32,
    #[serde(default)]
    pub messages: Vec<GerritMessage>,
}

impl GerritCl {
    /// Target branch without the `refs/heads/` prefix.
    pub fn branch_name(&self) -> &str {
        self.branch.strip_prefix(HEADS_PREFIX).unwrap_or(&self.branch)
    }

    pub fn is_staging(&self) -> bool {
        self.commit.as_ref().is_some_and(|c| {
            c.msg.contains("DO NOT SUBMIT") && c.msg.contains("STAGING")
        })
    }

    /// Reads the try-bot votes posted on the current patch set.
    ///
    /// Staging changes are only reported when `for_staging` is set, and
    /// regular changes only when it is not.
    pub fn try_bot_status(&self, for_staging: bool) -> TryBotStatus {
        let mut status = TryBotStatus::default();
        if self.commit.is_none() || for_staging != self.is_staging() {
            return status;
        }
        for msg in self.messages.iter().filter(|m| m.version == self.version) {
            let first_line = msg.message.lines().next().unwrap_or_default();
            if !first_line.contains("TryBot") {
                continue;
            }
            if first_line.contains("Run-TryBot+1") {
                status.try_requested = true;
            }
            if first_line.contains("-Run-TryBot") {
                status.try_requested = false;
            }
            if first_line.contains("TryBot-Result") {
                status.done = true;
            }
        }
        status
    }
}

/// One project on one review server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerritProject {
    pub server: String,
    pub project: String,
    /// All refs, sorted by name.
    #[serde(default)]
    pub refs: BTreeMap<String, GitHash>,
    #[serde(default)]
    pub cls: HashMap<i32, GerritCl>,
    /// Number of label votes changed over the life of the project.
    #[serde(default)]
    pub num_label_changes: usize,
}

impl GerritProject {
    pub fn new(server: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn ref_hash(&self, name: &str) -> Option<&GitHash> {
        self.refs.get(name)
    }

    pub fn cl(&self, number: i32) -> Option<&GerritCl> {
        self.cls.get(&number)
    }
}

impl NonChangeRefLister for GerritProject {
    fn non_change_refs(&self) -> Result<Box<dyn Iterator<Item = (&str, &GitHash)> + '_>> {
        Ok(Box::new(
            self.refs
                .iter()
                .filter(|(name, _)| !name.starts_with(CHANGE_REF_PREFIX))
                .map(|(name, hash)| (name.as_str(), hash)),
        ))
    }
}

/// Corpus contents as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub commits: Vec<GitCommit>,
    #[serde(default)]
    pub projects: Vec<GerritProject>,
}

/// The data guarded by [`Corpus`].
#[derive(Debug, Clone, Default)]
pub struct CorpusData {
    commits: HashMap<GitHash, GitCommit>,
    projects: BTreeMap<(String, String), GerritProject>,
}

impl CorpusData {
    pub fn git_commit(&self, hash: &GitHash) -> Option<&GitCommit> {
        self.commits.get(hash)
    }

    /// Reports whether `ancestor` is reachable from `commit` through one or
    /// more parent links. A commit is not its own ancestor.
    pub fn has_ancestor(&self, commit: &GitCommit, ancestor: &GitCommit) -> bool {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&GitHash> = commit.parents.iter().collect();
        while let Some(hash) = queue.pop_front() {
            if *hash == ancestor.hash {
                return true;
            }
            if !seen.insert(hash) {
                continue;
            }
            if let Some(c) = self.commits.get(hash) {
                queue.extend(c.parents.iter());
            }
        }
        false
    }

    /// Answers an ancestry query for two already validated hashes.
    pub fn check_ancestor(&self, commit: &GitHash, ancestor: &GitHash) -> AncestorCheck {
        let Some(commit) = self.git_commit(commit) else {
            return AncestorCheck {
                unknown_commit: true,
                has_ancestor: false,
            };
        };
        let has_ancestor = self
            .git_commit(ancestor)
            .is_some_and(|a| self.has_ancestor(commit, a));
        AncestorCheck {
            unknown_commit: false,
            has_ancestor,
        }
    }

    pub fn project(&self, server: &str, project: &str) -> Option<&GerritProject> {
        self.projects
            .get(&(server.to_string(), project.to_string()))
    }

    pub fn projects(&self) -> impl Iterator<Item = &GerritProject> {
        self.projects.values()
    }

    /// Sum of label changes across every project on `server`.
    pub fn num_label_changes(&self, server: &str) -> usize {
        self.projects()
            .filter(|p| p.server == server)
            .map(|p| p.num_label_changes)
            .sum()
    }

    pub fn insert_commit(&mut self, commit: GitCommit) {
        self.commits.insert(commit.hash.clone(), commit);
    }

    pub fn insert_project(&mut self, project: GerritProject) {
        self.projects
            .insert((project.server.clone(), project.project.clone()), project);
    }

    pub fn project_mut(&mut self, server: &str, project: &str) -> &mut GerritProject {
        self.projects
            .entry((server.to_string(), project.to_string()))
            .or_insert_with(|| GerritProject::new(server, project))
    }

    /// Loads a snapshot, rejecting changes filed under the wrong number.
    pub fn from_snapshot(snapshot: CorpusSnapshot) -> Result<Self> {
        let mut data = Self::default();
        for commit in snapshot.commits {
            data.insert_commit(commit);
        }
        for project in snapshot.projects {
            if let Some((key, cl)) = project.cls.iter().find(|(key, cl)| **key != cl.number) {
                return Err(Error::Serialization(format!(
                    "{}/{}: change {} is filed under {}",
                    project.server, project.project, cl.number, key
                )));
            }
            data.insert_project(project);
        }
        Ok(data)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let snapshot: CorpusSnapshot = serde_yaml::from_str(content)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

/// Shared, lock-protected corpus.
#[derive(Debug, Default)]
pub struct Corpus {
    data: RwLock<CorpusData>,
}

impl Corpus {
    pub fn new(data: CorpusData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, CorpusData> {
        self.data.read().await
    }

    /// Write access for the ingestion side.
    pub async fn write(&self) -> RwLockWriteGuard<'_, CorpusData> {
        self.data.write().await
    }
}
