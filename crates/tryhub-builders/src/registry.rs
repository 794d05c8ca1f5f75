//! The set of known builders and host types.

use crate::branch::Target;
use crate::catalog;
use crate::profile::{Builder, BuilderProfile, HostProfile, Policy};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tryhub_core::{Error, Result};

/// On-disk form of a registry.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    policy: Policy,
    #[serde(default)]
    hosts: Vec<HostProfile>,
    #[serde(default)]
    builders: Vec<BuilderProfile>,
}

/// Validated, immutable collection of builders.
///
/// Builders keep their declaration order, which is also the order
/// [`BuilderRegistry::try_builders_for_project`] reports them in.
#[derive(Debug, Clone)]
pub struct BuilderRegistry {
    policy: Policy,
    hosts: HashMap<String, HostProfile>,
    builders: Vec<BuilderProfile>,
    index: HashMap<String, usize>,
}

impl BuilderRegistry {
    pub fn new(
        policy: Policy,
        hosts: Vec<HostProfile>,
        builders: Vec<BuilderProfile>,
    ) -> Result<Self> {
        let mut host_map = HashMap::with_capacity(hosts.len());
        for host in hosts {
            if host_map.contains_key(&host.name) {
                return Err(Error::InvalidBuilder(format!(
                    "duplicate host type {:?}",
                    host.name
                )));
            }
            host_map.insert(host.name.clone(), host);
        }

        let mut index = HashMap::with_capacity(builders.len());
        for (i, builder) in builders.iter().enumerate() {
            builder.validate()?;
            if !host_map.contains_key(&builder.host_type) {
                return Err(Error::UnknownHost(format!(
                    "{} (used by {})",
                    builder.host_type, builder.name
                )));
            }
            if index.insert(builder.name.clone(), i).is_some() {
                return Err(Error::InvalidBuilder(format!(
                    "duplicate builder {:?}",
                    builder.name
                )));
            }
        }

        tracing::debug!(
            builders = builders.len(),
            hosts = host_map.len(),
            "Loaded builder registry"
        );

        Ok(Self {
            policy,
            hosts: host_map,
            builders,
            index,
        })
    }

    /// The builtin catalog of builders.
    pub fn builtin() -> Result<Self> {
        Self::new(Policy::default(), catalog::hosts(), catalog::builders())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml::from_str(content)?;
        Self::new(file.policy, file.hosts, file.builders)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    fn view<'a>(&'a self, profile: &'a BuilderProfile) -> Option<Builder<'a>> {
        let host = self.hosts.get(&profile.host_type)?;
        Some(Builder::new(profile, host, &self.policy))
    }

    pub fn builder(&self, name: &str) -> Option<Builder<'_>> {
        let profile = &self.builders[*self.index.get(name)?];
        self.view(profile)
    }

    pub fn get(&self, name: &str) -> Result<Builder<'_>> {
        self.builder(name)
            .ok_or_else(|| Error::UnknownBuilder(name.to_string()))
    }

    /// Every builder, in declaration order.
    pub fn builders(&self) -> impl Iterator<Item = Builder<'_>> {
        self.builders.iter().filter_map(|p| self.view(p))
    }

    /// Builders that run as try-bots for a change to `repo` on `branch`,
    /// tested against `go_branch`.
    pub fn try_builders_for_project(
        &self,
        repo: &str,
        branch: &str,
        go_branch: &str,
    ) -> Vec<Builder<'_>> {
        let target = Target::new(repo, branch, go_branch);
        self.builders()
            .filter(|b| b.try_bot_target(&target))
            .collect()
    }

    /// Host types no builder references.
    pub fn unused_hosts(&self) -> BTreeSet<&str> {
        let used: HashSet<&str> = self.builders.iter().map(|b| b.host_type.as_str()).collect();
        self.hosts
            .keys()
            .map(String::as_str)
            .filter(|h| !used.contains(h))
            .collect()
    }
}
