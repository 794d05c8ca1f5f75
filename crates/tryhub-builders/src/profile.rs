//! Builder and host profiles, and the eligibility decisions made from them.

use crate::branch::{GO_REPO, Target};
use crate::rules::{Axis, DistTestSkip, Rule};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tryhub_core::{Error, Result};

/// Base execution timeout for `go tool dist test` before scaling.
pub const DIST_TESTS_BASE_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Environment key holding the timeout multiplier.
pub const TIMEOUT_SCALE_KEY: &str = "GO_TEST_TIMEOUT_SCALE";

/// Machine-class defaults shared by builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `KEY=VALUE` pairs.
    #[serde(default)]
    pub env: Vec<String>,
    /// Dist test groups this machine class cannot run.
    #[serde(default)]
    pub skip_dist_tests: Vec<DistTestSkip>,
}

impl HostProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
            env: vec![],
            skip_dist_tests: vec![],
        }
    }

    pub fn with_env(mut self, kv: &str) -> Self {
        self.env.push(kv.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn skip_dist_tests(mut self, skip: DistTestSkip) -> Self {
        self.skip_dist_tests.push(skip);
        self
    }
}

/// Declarative description of one kind of build machine.
///
/// `name` is `{os}-{arch}` optionally followed by `-{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderProfile {
    pub name: String,
    pub host_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `KEY=VALUE` pairs; take precedence over the host's.
    #[serde(default)]
    pub env: Vec<String>,
    /// Whether the builder runs pre-submit at all.
    #[serde(default)]
    pub try_bot: bool,
    /// Experimental repositories this builder opts into.
    #[serde(default)]
    pub opt_in_repos: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub skip_dist_tests: Vec<DistTestSkip>,
}

impl BuilderProfile {
    pub fn new(name: impl Into<String>, host_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_type: host_type.into(),
            notes: None,
            env: vec![],
            try_bot: false,
            opt_in_repos: vec![],
            rules: vec![],
            skip_dist_tests: vec![],
        }
    }

    pub fn try_bot(mut self) -> Self {
        self.try_bot = true;
        self
    }

    pub fn opt_in(mut self, repos: &[&str]) -> Self {
        self.opt_in_repos = repos.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_env(mut self, kv: &str) -> Self {
        self.env.push(kv.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn skip_dist_tests(mut self, skip: DistTestSkip) -> Self {
        self.skip_dist_tests.push(skip);
        self
    }

    /// Splits the name into `(os, arch)`.
    fn os_arch(&self) -> Option<(&str, &str)> {
        let (os, rest) = self.name.split_once('-')?;
        let arch = rest.split_once('-').map_or(rest, |(arch, _)| arch);
        (!os.is_empty() && !arch.is_empty()).then_some((os, arch))
    }

    pub fn goos(&self) -> &str {
        self.os_arch().map_or("", |(os, _)| os)
    }

    pub fn goarch(&self) -> &str {
        self.os_arch().map_or("", |(_, arch)| arch)
    }

    pub fn is_race(&self) -> bool {
        self.name.ends_with("-race")
    }

    pub fn is_long_test(&self) -> bool {
        self.name.ends_with("-longtest")
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.os_arch().is_none() {
            return Err(Error::InvalidBuilder(format!(
                "{:?} does not have the form os-arch[-suffix]",
                self.name
            )));
        }
        Ok(())
    }
}

/// Rules and repository restrictions shared by every builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Repositories built only by builders that list them in `opt_in_repos`.
    #[serde(default)]
    pub experimental_repos: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            rules: vec![
                // Release branches before go1.11 are no longer supported.
                Rule::min_go(1, 11),
                Rule::min_go(1, 13).for_repos(&["mobile"]),
                Rule::master_only().for_repos(&["exp"]),
            ],
            experimental_repos: vec!["mobile".to_string(), "exp".to_string()],
        }
    }
}

/// A builder resolved against its host profile and the shared policy.
#[derive(Debug, Clone, Copy)]
pub struct Builder<'a> {
    pub profile: &'a BuilderProfile,
    pub host: &'a HostProfile,
    pub policy: &'a Policy,
}

impl<'a> Builder<'a> {
    pub fn new(profile: &'a BuilderProfile, host: &'a HostProfile, policy: &'a Policy) -> Self {
        Self {
            profile,
            host,
            policy,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.profile.name
    }

    pub fn goos(&self) -> &'a str {
        self.profile.goos()
    }

    pub fn goarch(&self) -> &'a str {
        self.profile.goarch()
    }

    /// Host environment overlaid by the builder's own.
    pub fn env(&self) -> Vec<&'a str> {
        self.host
            .env
            .iter()
            .chain(self.profile.env.iter())
            .map(String::as_str)
            .collect()
    }

    /// Timeout for the dist test run, scaled by `GO_TEST_TIMEOUT_SCALE`.
    ///
    /// The builder's value is used when set, otherwise the host's; the two
    /// are never multiplied together.
    pub fn dist_tests_exec_timeout(&self) -> Duration {
        let scale = timeout_scale(&self.profile.env)
            .or_else(|| timeout_scale(&self.host.env))
            .unwrap_or(1);
        DIST_TESTS_BASE_TIMEOUT * scale
    }

    /// Whether the builder builds `repo` at `branch` against `go_branch`
    /// after changes land.
    pub fn builds_repo_post_submit(&self, repo: &str, branch: &str, go_branch: &str) -> bool {
        self.builds_target(&Target::new(repo, branch, go_branch))
    }

    /// Whether the builder runs as a try-bot for `repo` at `branch` against
    /// `go_branch`. Always implies [`Self::builds_repo_post_submit`].
    pub fn builds_repo_try_bot(&self, repo: &str, branch: &str, go_branch: &str) -> bool {
        self.try_bot_target(&Target::new(repo, branch, go_branch))
    }

    pub(crate) fn builds_target(&self, target: &Target) -> bool {
        if self
            .policy
            .experimental_repos
            .iter()
            .any(|r| *r == target.repo)
            && !self.profile.opt_in_repos.iter().any(|r| *r == target.repo)
        {
            return false;
        }
        self.policy
            .rules
            .iter()
            .chain(self.profile.rules.iter().filter(|r| r.axis == Axis::Both))
            .all(|r| r.allows(target))
    }

    pub(crate) fn try_bot_target(&self, target: &Target) -> bool {
        self.profile.try_bot
            && self.builds_target(target)
            && self
                .profile
                .rules
                .iter()
                .filter(|r| r.axis == Axis::TryBot)
                .all(|r| r.allows(target))
    }

    /// Whether the named dist test group runs in the given mode. Only
    /// meaningful once the builder is known to build the Go repository.
    pub fn should_run_dist_test(&self, test: &str, is_try: bool) -> bool {
        !self
            .host
            .skip_dist_tests
            .iter()
            .chain(self.profile.skip_dist_tests.iter())
            .any(|skip| skip.skips(test, is_try))
    }

    /// Whether the builder builds the Go repository at all at `branch`.
    pub fn builds_go(&self, branch: &str) -> bool {
        self.builds_repo_post_submit(GO_REPO, branch, "")
    }
}

fn timeout_scale(env: &[String]) -> Option<u32> {
    let value = env
        .iter()
        .rev()
        .find_map(|kv| kv.strip_prefix(TIMEOUT_SCALE_KEY)?.strip_prefix('='))?;
    match value.parse::<u32>() {
        Ok(scale) if scale > 0 => Some(scale),
        _ => {
            tracing::warn!(value, "ignoring invalid {}", TIMEOUT_SCALE_KEY);
            None
        }
    }
}
