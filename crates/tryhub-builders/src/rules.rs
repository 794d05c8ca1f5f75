//! Declarative eligibility rules.
//!
//! A builder's eligibility is the conjunction of an ordered list of [`Rule`]
//! records. Each rule names the repositories it covers and a
//! [`Requirement`] the target must satisfy; targets outside the rule's
//! scope are unaffected by it.

use crate::branch::{Branch, Target};
use serde::{Deserialize, Serialize};
use tryhub_core::version::GoVersion;

/// Which decision a rule constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Post-submit, and therefore try-bot too.
    #[default]
    Both,
    /// Try-bot only; post-submit is unaffected.
    TryBot,
}

/// Coarse repository selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applies {
    #[default]
    All,
    Go,
    Subrepos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "require", rename_all = "snake_case")]
pub enum Requirement {
    /// Never eligible.
    Never,
    /// Every release branch involved is at least `version`.
    MinGo { version: GoVersion },
    /// The Go branch is a release no newer than `version`. Master fails:
    /// the platform was retired after `version`.
    MaxGo { version: GoVersion },
    /// Both the branch and the Go branch are master.
    MasterOnly,
}

impl Requirement {
    pub fn holds(&self, target: &Target) -> bool {
        match self {
            Requirement::Never => false,
            Requirement::MinGo { version } => [&target.branch, &target.go_branch]
                .into_iter()
                .filter_map(Branch::release)
                .all(|v| v >= *version),
            Requirement::MaxGo { version } => target
                .go_branch
                .release()
                .is_some_and(|v| v <= *version),
            Requirement::MasterOnly => target.branch.is_master() && target.go_branch.is_master(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub applies: Applies,
    /// When non-empty, narrows the rule to these repositories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<String>,
    /// Repositories the rule never covers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
    #[serde(flatten)]
    pub require: Requirement,
}

impl Rule {
    fn with(require: Requirement) -> Self {
        Self {
            axis: Axis::Both,
            applies: Applies::All,
            repos: vec![],
            except: vec![],
            require,
        }
    }

    pub fn never() -> Self {
        Self::with(Requirement::Never)
    }

    pub fn min_go(major: u32, minor: u32) -> Self {
        Self::with(Requirement::MinGo {
            version: GoVersion::new(major, minor),
        })
    }

    pub fn max_go(major: u32, minor: u32) -> Self {
        Self::with(Requirement::MaxGo {
            version: GoVersion::new(major, minor),
        })
    }

    pub fn master_only() -> Self {
        Self::with(Requirement::MasterOnly)
    }

    pub fn for_go(mut self) -> Self {
        self.applies = Applies::Go;
        self
    }

    pub fn for_subrepos(mut self) -> Self {
        self.applies = Applies::Subrepos;
        self
    }

    pub fn for_repos(mut self, repos: &[&str]) -> Self {
        self.repos = repos.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn except(mut self, repos: &[&str]) -> Self {
        self.except = repos.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn on_try_bot(mut self) -> Self {
        self.axis = Axis::TryBot;
        self
    }

    pub fn covers(&self, repo: &str) -> bool {
        let applies = match self.applies {
            Applies::All => true,
            Applies::Go => repo == crate::branch::GO_REPO,
            Applies::Subrepos => repo != crate::branch::GO_REPO,
        };
        applies
            && (self.repos.is_empty() || self.repos.iter().any(|r| r == repo))
            && !self.except.iter().any(|r| r == repo)
    }

    /// True when the target is outside the rule's scope or meets its requirement.
    pub fn allows(&self, target: &Target) -> bool {
        !self.covers(&target.repo) || self.require.holds(target)
    }
}

/// When a dist test rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Both,
    TryBot,
    PostSubmit,
}

impl RunMode {
    fn includes(&self, is_try: bool) -> bool {
        match self {
            RunMode::Both => true,
            RunMode::TryBot => is_try,
            RunMode::PostSubmit => !is_try,
        }
    }
}

/// Skips the named dist test groups in the given mode.
///
/// A pattern matches a test name exactly, or by prefix when it ends in `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistTestSkip {
    pub tests: Vec<String>,
    #[serde(default)]
    pub mode: RunMode,
}

impl DistTestSkip {
    pub fn new(tests: &[&str], mode: RunMode) -> Self {
        Self {
            tests: tests.iter().map(|t| t.to_string()).collect(),
            mode,
        }
    }

    pub fn skips(&self, test: &str, is_try: bool) -> bool {
        self.mode.includes(is_try)
            && self.tests.iter().any(|pattern| match pattern.strip_suffix('*') {
                Some(prefix) => test.starts_with(prefix),
                None => pattern == test,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_go_checks_both_branches() {
        let rule = Rule::min_go(1, 13).for_repos(&["mobile"]);
        assert!(rule.allows(&Target::new("mobile", "master", "master")));
        assert!(rule.allows(&Target::new("mobile", "1.13", "master")));
        assert!(!rule.allows(&Target::new("mobile", "1.11", "master")));
        assert!(!rule.allows(&Target::new("mobile", "master", "go1.12")));
        // Out of scope.
        assert!(rule.allows(&Target::new("net", "1.11", "go1.11")));
    }

    #[test]
    fn test_max_go_retires_at_master() {
        let rule = Rule::max_go(1, 12);
        assert!(!rule.allows(&Target::new("go", "master", "")));
        assert!(rule.allows(&Target::new("go", "release-branch.go1.12", "")));
        assert!(!rule.allows(&Target::new("go", "go1.13", "")));
        assert!(!rule.allows(&Target::new("go", "dev.link", "")));
    }

    #[test]
    fn test_master_only() {
        let rule = Rule::master_only().for_subrepos();
        assert!(rule.allows(&Target::new("net", "master", "master")));
        assert!(!rule.allows(&Target::new("net", "master", "go1.12")));
        assert!(!rule.allows(&Target::new("net", "1.12", "master")));
        assert!(rule.allows(&Target::new("go", "go1.12", "")));
    }

    #[test]
    fn test_scope() {
        let rule = Rule::never().for_subrepos().except(&["sys"]);
        assert!(rule.covers("net"));
        assert!(!rule.covers("sys"));
        assert!(!rule.covers("go"));
        assert!(Rule::never().for_go().covers("go"));
        assert!(!Rule::never().for_go().covers("net"));
    }

    #[test]
    fn test_dist_test_skip() {
        let skip = DistTestSkip::new(&["reboot", "test:*"], RunMode::TryBot);
        assert!(skip.skips("reboot", true));
        assert!(!skip.skips("reboot", false));
        assert!(skip.skips("test:cmd/go", true));
        assert!(!skip.skips("api", true));
    }
}
