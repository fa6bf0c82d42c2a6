//! Application configuration (desired state)
//!
//! An AppConfig describes what should be running: process groups, the
//! volumes they mount, and how a deploy should roll out. Only the fields the
//! preflight pipeline consumes are modelled here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group name used when an app declares no process groups
pub const DEFAULT_PROCESS_GROUP: &str = "app";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    #[serde(default)]
    pub app_name: String,

    /// Region new machines are placed in by default
    #[serde(default)]
    pub primary_region: String,

    /// Environment variables passed to every machine
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Process groups keyed by name, valued by command
    #[serde(default)]
    pub processes: BTreeMap<String, String>,

    /// Volume mounts
    #[serde(default)]
    pub mounts: Vec<MountSpec>,

    /// Deploy section
    #[serde(default)]
    pub deploy: Option<DeploySection>,
}

/// A volume-to-path binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    /// Volume name
    pub source: String,

    /// Mount path inside the machine
    pub destination: String,

    /// Groups this mount applies to; empty means every group
    #[serde(default)]
    pub processes: Vec<String>,
}

impl MountSpec {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            processes: Vec::new(),
        }
    }

    /// Restrict the mount to the given groups
    pub fn for_processes<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.processes = groups.into_iter().map(Into::into).collect();
        self
    }

    fn applies_to(&self, group: &str) -> bool {
        self.processes.is_empty() || self.processes.iter().any(|p| p == group)
    }
}

/// Deploy section of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySection {
    /// Default rollout strategy
    #[serde(default)]
    pub strategy: Option<String>,

    /// Command run on a one-off machine before the rollout
    #[serde(default)]
    pub release_command: Option<String>,
}

/// Configuration of a single process group after flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    pub name: String,
    pub command: Option<String>,
    pub mounts: Vec<MountSpec>,
}

impl GroupConfig {
    /// First mount of the group; multiple mounts per group are unsupported
    pub fn primary_mount(&self) -> Option<&MountSpec> {
        self.mounts.first()
    }
}

/// Identity of the application being deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppHandle {
    /// Application name
    pub name: String,

    /// Whether the application ever had a release deployed
    #[serde(default)]
    pub deployed: bool,
}

impl AppHandle {
    pub fn new(name: impl Into<String>, deployed: bool) -> Self {
        Self {
            name: name.into(),
            deployed,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("app name cannot be empty")]
    EmptyAppName,

    #[error("mount #{index} has an empty source")]
    EmptyMountSource { index: usize },

    #[error("mount '{source_name}' destination '{destination}' must be an absolute path")]
    RelativeMountDestination {
        source_name: String,
        destination: String,
    },

    #[error("mount '{source_name}' references undeclared process group '{group}'")]
    UnknownMountGroup { source_name: String, group: String },

    #[error("process group '{0}' is not declared in the configuration")]
    UnknownProcessGroup(String),
}

impl AppConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Declared process group names in sorted order
    pub fn process_names(&self) -> Vec<String> {
        if self.processes.is_empty() {
            return vec![DEFAULT_PROCESS_GROUP.to_string()];
        }
        self.processes.keys().cloned().collect()
    }

    /// Group assigned to machines whose metadata carries no group
    pub fn default_process_name(&self) -> String {
        if self.processes.is_empty() || self.processes.contains_key(DEFAULT_PROCESS_GROUP) {
            return DEFAULT_PROCESS_GROUP.to_string();
        }
        self.processes
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| DEFAULT_PROCESS_GROUP.to_string())
    }

    pub fn has_group(&self, group: &str) -> bool {
        if self.processes.is_empty() {
            return group == DEFAULT_PROCESS_GROUP;
        }
        self.processes.contains_key(group)
    }

    /// Whether any group mounts a volume
    pub fn has_mounts(&self) -> bool {
        !self.mounts.is_empty()
    }

    /// Merge environment variables, overriding existing keys
    pub fn set_env_variables(&mut self, vars: BTreeMap<String, String>) {
        self.env.extend(vars);
    }

    /// Strategy declared in the deploy section, if any
    pub fn deploy_strategy(&self) -> Option<&str> {
        self.deploy
            .as_ref()
            .and_then(|d| d.strategy.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Release command declared in the deploy section, if any
    pub fn release_command(&self) -> Option<&str> {
        self.deploy
            .as_ref()
            .and_then(|d| d.release_command.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// View of one process group with only the mounts that apply to it
    pub fn flatten(&self, group: &str) -> Result<GroupConfig, ConfigError> {
        if !self.has_group(group) {
            return Err(ConfigError::UnknownProcessGroup(group.to_string()));
        }

        Ok(GroupConfig {
            name: group.to_string(),
            command: self.processes.get(group).cloned(),
            mounts: self
                .mounts
                .iter()
                .filter(|m| m.applies_to(group))
                .cloned()
                .collect(),
        })
    }

    /// Validate the fields the preflight consumes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.is_empty() {
            return Err(ConfigError::EmptyAppName);
        }

        for (index, mount) in self.mounts.iter().enumerate() {
            if mount.source.is_empty() {
                return Err(ConfigError::EmptyMountSource { index });
            }
            if !mount.destination.starts_with('/') {
                return Err(ConfigError::RelativeMountDestination {
                    source_name: mount.source.clone(),
                    destination: mount.destination.clone(),
                });
            }
            if let Some(group) = mount.processes.iter().find(|g| !self.has_group(g)) {
                return Err(ConfigError::UnknownMountGroup {
                    source_name: mount.source.clone(),
                    group: group.clone(),
                });
            }
        }

        Ok(())
    }
}
