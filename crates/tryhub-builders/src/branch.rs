//! Branch canonicalization.
//!
//! Callers may name release branches by shorthand (`go1.12`, `1.12`).
//! Every input goes through [`canonical_branch`] before it is compared.

use tryhub_core::version::{GoVersion, RELEASE_BRANCH_PREFIX, parse_release_branch};

pub const GO_REPO: &str = "go";
pub const MASTER: &str = "master";

/// Expands `goN[.M]` and `N.M` to `release-branch.goN[.M]`.
/// Any other name is returned unchanged.
pub fn canonical_branch(name: &str) -> String {
    let shorthand = match name.strip_prefix("go") {
        Some(rest) => rest,
        None if name.contains('.') => name,
        None => return name.to_string(),
    };
    match parse_release_branch(&format!("{RELEASE_BRANCH_PREFIX}{shorthand}")) {
        Some((major, minor)) => GoVersion::new(major, minor).release_branch(),
        None => name.to_string(),
    }
}

/// A canonicalized branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Master,
    Release(GoVersion),
    /// Development branches and anything else that is not a release.
    Other(String),
}

impl Branch {
    pub fn parse(name: &str) -> Self {
        let name = canonical_branch(name);
        if name == MASTER {
            return Branch::Master;
        }
        match parse_release_branch(&name) {
            Some((major, minor)) => Branch::Release(GoVersion::new(major, minor)),
            None => Branch::Other(name),
        }
    }

    pub fn release(&self) -> Option<GoVersion> {
        match self {
            Branch::Release(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, Branch::Master)
    }
}

/// What a builder is asked to build: a repository at a branch, tested
/// against a Go branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub repo: String,
    pub branch: Branch,
    pub go_branch: Branch,
}

impl Target {
    /// Canonicalizes the inputs. For the Go repository the Go branch is the
    /// branch itself; for subrepos an empty Go branch means master.
    pub fn new(repo: &str, branch: &str, go_branch: &str) -> Self {
        let branch = Branch::parse(branch);
        let go_branch = if repo == GO_REPO {
            branch.clone()
        } else if go_branch.is_empty() {
            Branch::Master
        } else {
            Branch::parse(go_branch)
        };
        Self {
            repo: repo.to_string(),
            branch,
            go_branch,
        }
    }

    pub fn is_go(&self) -> bool {
        self.repo == GO_REPO
    }
}
