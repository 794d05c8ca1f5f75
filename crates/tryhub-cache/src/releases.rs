//! Supported Go release resolution.

use std::collections::BTreeMap;
use tracing::debug;
use tryhub_core::corpus::GitHash;
use tryhub_core::ports::NonChangeRefLister;
use tryhub_core::version::{parse_release_branch, parse_tag};
use tryhub_core::{Error, GoRelease, Result};

const TAGS_PREFIX: &str = "refs/tags/";
const HEADS_PREFIX: &str = "refs/heads/";

/// Number of releases supported at any time.
pub const SUPPORTED_RELEASES: usize = 2;

struct Tag<'a> {
    patch: u32,
    name: &'a str,
    commit: &'a GitHash,
}

struct ReleaseBranch<'a> {
    name: &'a str,
    commit: &'a GitHash,
}

/// Returns the latest patch of each supported release, newest first.
///
/// A release exists for every `goX[.Y[.Z]]` tag that has a matching
/// `release-branch.goX[.Y]` branch. Fails unless at least two releases are
/// found, so the result always has a latest and a previous release.
pub fn supported_go_releases(go_project: &dyn NonChangeRefLister) -> Result<Vec<GoRelease>> {
    let mut tags: BTreeMap<(u32, u32), Tag<'_>> = BTreeMap::new();
    let mut branches: BTreeMap<(u32, u32), ReleaseBranch<'_>> = BTreeMap::new();

    for (name, commit) in go_project.non_change_refs()? {
        if let Some(tag) = name.strip_prefix(TAGS_PREFIX) {
            let Some((major, minor, patch)) = parse_tag(tag) else {
                continue;
            };
            match tags.get(&(major, minor)) {
                Some(seen) if patch <= seen.patch => {}
                _ => {
                    tags.insert(
                        (major, minor),
                        Tag {
                            patch,
                            name: tag,
                            commit,
                        },
                    );
                }
            }
        } else if let Some(branch) = name.strip_prefix(HEADS_PREFIX) {
            if let Some(version) = parse_release_branch(branch) {
                branches.insert(
                    version,
                    ReleaseBranch {
                        name: branch,
                        commit,
                    },
                );
            }
        }
    }

    let mut releases: Vec<GoRelease> = tags
        .iter()
        .filter_map(|(&(major, minor), tag)| {
            let branch = branches.get(&(major, minor))?;
            Some(GoRelease {
                major,
                minor,
                patch: tag.patch,
                tag_name: tag.name.to_string(),
                tag_commit: tag.commit.to_string(),
                branch_name: branch.name.to_string(),
                branch_commit: branch.commit.to_string(),
            })
        })
        .collect();

    releases.sort_by(|a, b| (b.major, b.minor, b.patch).cmp(&(a.major, a.minor, a.patch)));

    if releases.len() < SUPPORTED_RELEASES {
        return Err(Error::ReleasesUnavailable {
            found: releases.len(),
        });
    }
    releases.truncate(SUPPORTED_RELEASES);
    debug!(
        latest = %releases[0].tag_name,
        previous = %releases[1].tag_name,
        "Resolved supported Go releases"
    );
    Ok(releases)
}
