//! Go release version parsing.
//!
//! Tags look like `go1`, `go1.2` or `go1.2.3`; release branches look like
//! `release-branch.go1` or `release-branch.go1.2`. Anything else, including
//! pre-release tags such as `go1.2beta3`, is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TAG_PREFIX: &str = "go";
pub const RELEASE_BRANCH_PREFIX: &str = "release-branch.go";

/// A Go major.minor pair, ordered by major then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GoVersion {
    pub major: u32,
    pub minor: u32,
}

impl GoVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The canonical release branch for this version.
    pub fn release_branch(&self) -> String {
        if self.minor == 0 {
            format!("{}{}", RELEASE_BRANCH_PREFIX, self.major)
        } else {
            format!("{}{}.{}", RELEASE_BRANCH_PREFIX, self.major, self.minor)
        }
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for GoVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix(TAG_PREFIX).unwrap_or(s);
        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (parse_component(major), parse_component(minor)),
            None => (parse_component(trimmed), Some(0)),
        };
        match (major, minor) {
            (Some(major), Some(minor)) if major > 0 => Ok(Self { major, minor }),
            _ => Err(crate::Error::InvalidVersion(s.to_string())),
        }
    }
}

impl TryFrom<String> for GoVersion {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GoVersion> for String {
    fn from(v: GoVersion) -> Self {
        v.to_string()
    }
}

/// Parses the major-minor-patch triplet from a `goX`, `goX.Y` or `goX.Y.Z`
/// tag name. Missing components default to zero.
pub fn parse_tag(name: &str) -> Option<(u32, u32, u32)> {
    let rest = name.strip_prefix(TAG_PREFIX)?;
    let parts: Vec<&str> = rest.splitn(4, '.').collect();
    if parts.len() > 3 {
        return None;
    }
    let major = parse_component(parts[0])?;
    if major == 0 {
        return None;
    }
    let minor = match parts.get(1) {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    let patch = match parts.get(2) {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    Some((major, minor, patch))
}

/// Parses the major-minor pair from a `release-branch.goX` or
/// `release-branch.goX.Y` branch name.
pub fn parse_release_branch(name: &str) -> Option<(u32, u32)> {
    let rest = name.strip_prefix(RELEASE_BRANCH_PREFIX)?;
    let parts: Vec<&str> = rest.splitn(3, '.').collect();
    if parts.len() > 2 {
        return None;
    }
    let major = parse_component(parts[0])?;
    if major == 0 {
        return None;
    }
    let minor = match parts.get(1) {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    Some((major, minor))
}

/// Canonical decimal in [0, 999]: no sign, no leading zeros.
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 3 {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("go1"), Some((1, 0, 0)));
        assert_eq!(parse_tag("go1.2"), Some((1, 2, 0)));
        assert_eq!(parse_tag("go1.2.3"), Some((1, 2, 3)));
        assert_eq!(parse_tag("go1.12.17"), Some((1, 12, 17)));
    }

    #[test]
    fn test_parse_tag_rejects_suffixes() {
        for name in [
            "go1.2beta3",
            "go1.2rc1",
            "go1.2.3.4",
            "go1.",
            "go",
            "go0",
            "go01.2",
            "go1.02",
            "go1.2 ",
            "weekly.2012-03-27",
            "release.r60",
            "1.2",
        ] {
            assert_eq!(parse_tag(name), None, "{name}");
        }
    }

    #[test]
    fn test_parse_release_branch() {
        assert_eq!(parse_release_branch("release-branch.go1"), Some((1, 0)));
        assert_eq!(parse_release_branch("release-branch.go1.2"), Some((1, 2)));
        assert_eq!(parse_release_branch("release-branch.go1.12"), Some((1, 12)));
    }

    #[test]
    fn test_parse_release_branch_rejects() {
        for name in [
            "release-branch.go1.2.3",
            "release-branch.go1.2-security",
            "release-branch.r60",
            "release-branch.go",
            "dev.boringcrypto.go1.12",
            "master",
        ] {
            assert_eq!(parse_release_branch(name), None, "{name}");
        }
    }

    #[test]
    fn test_go_version_from_str() {
        assert_eq!("1.13".parse::<GoVersion>().unwrap(), GoVersion::new(1, 13));
        assert_eq!("go1.11".parse::<GoVersion>().unwrap(), GoVersion::new(1, 11));
        assert_eq!("1".parse::<GoVersion>().unwrap(), GoVersion::new(1, 0));
        assert!("1.x".parse::<GoVersion>().is_err());
        assert!("0.1".parse::<GoVersion>().is_err());
    }

    #[test]
    fn test_go_version_ordering_and_branch() {
        assert!(GoVersion::new(1, 12) < GoVersion::new(1, 13));
        assert!(GoVersion::new(1, 13) < GoVersion::new(2, 0));
        assert_eq!(GoVersion::new(1, 12).release_branch(), "release-branch.go1.12");
        assert_eq!(GoVersion::new(1, 0).release_branch(), "release-branch.go1");
    }
}
