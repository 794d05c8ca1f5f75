//! Wire types shared by the cache, the change-tracker adapter and the API.

use serde::{Deserialize, Serialize};

/// A Go major.minor pair as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorMinor {
    pub major: u32,
    pub minor: u32,
}

impl MajorMinor {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// A supported Go release: a tag plus its release branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoRelease {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub tag_name: String,
    pub tag_commit: String,
    pub branch_name: String,
    pub branch_commit: String,
}

impl GoRelease {
    pub fn major_minor(&self) -> MajorMinor {
        MajorMinor::new(self.major, self.minor)
    }
}

/// One pending pre-submit request.
///
/// For changes to the Go repository `go_version` holds the single version
/// implied by the change's branch and `go_commit`/`go_branch` are empty.
/// For subrepo changes the three vectors are parallel: master first, then
/// each supported release branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryWorkItem {
    pub project: String,
    pub branch: String,
    pub change_id: String,
    pub commit: String,
    #[serde(default)]
    pub go_version: Vec<MajorMinor>,
    #[serde(default)]
    pub go_commit: Vec<String>,
    #[serde(default)]
    pub go_branch: Vec<String>,
}

/// An open change as reported by the remote change-tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub project: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub change_id: String,
    #[serde(rename = "_number")]
    pub change_number: i32,
    #[serde(default)]
    pub current_revision: Option<String>,
}

/// Response of a commit ancestry query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorCheck {
    pub unknown_commit: bool,
    pub has_ancestor: bool,
}
