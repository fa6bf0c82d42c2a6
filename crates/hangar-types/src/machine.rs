//! Machine types for observed fleet state
//!
//! A Machine is owned by the platform. Hangar only ever reads a snapshot.

use crate::{MachineId, VolumeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key marking machines managed by this deployment path
pub const METADATA_KEY_PLATFORM_VERSION: &str = "hangar_platform_version";

/// Metadata key holding the machine's process group
pub const METADATA_KEY_PROCESS_GROUP: &str = "hangar_process_group";

/// Platform version value carried by managed machines
pub const PLATFORM_VERSION_V2: &str = "v2";

/// Process group of the one-off machine that runs the release command
pub const RELEASE_COMMAND_GROUP: &str = "hangar_release_command";

/// A platform-managed virtual machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier
    pub id: MachineId,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Region the machine runs in
    #[serde(default)]
    pub region: String,

    /// Lifecycle state reported by the platform (started, stopped, ...)
    #[serde(default)]
    pub state: String,

    /// Image reference the machine runs
    pub image: String,

    /// Free-form metadata tags
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Mounted volumes
    #[serde(default)]
    pub mounts: Vec<MachineMount>,
}

/// A volume bound to a machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineMount {
    /// Attached volume
    pub volume: VolumeId,

    /// Name of the attached volume
    #[serde(default)]
    pub name: String,

    /// Mount path inside the machine
    #[serde(default)]
    pub path: String,
}

impl Machine {
    pub fn new(id: impl Into<MachineId>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            region: String::new(),
            state: "started".to_string(),
            image: image.into(),
            metadata: BTreeMap::new(),
            mounts: Vec::new(),
        }
    }

    /// Mark the machine as managed and assign it to a group
    pub fn managed(mut self, group: impl Into<String>) -> Self {
        self.metadata.insert(
            METADATA_KEY_PLATFORM_VERSION.to_string(),
            PLATFORM_VERSION_V2.to_string(),
        );
        self.metadata
            .insert(METADATA_KEY_PROCESS_GROUP.to_string(), group.into());
        self
    }

    pub fn with_mount(
        mut self,
        volume: impl Into<VolumeId>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.mounts.push(MachineMount {
            volume: volume.into(),
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Process group tag; empty when the metadata carries none
    pub fn process_group(&self) -> &str {
        self.metadata
            .get(METADATA_KEY_PROCESS_GROUP)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Whether the machine belongs to this deployment path
    pub fn is_managed(&self) -> bool {
        self.metadata
            .get(METADATA_KEY_PLATFORM_VERSION)
            .is_some_and(|v| v == PLATFORM_VERSION_V2)
    }

    pub fn is_release_command(&self) -> bool {
        self.process_group() == RELEASE_COMMAND_GROUP
    }

    /// Whether the platform still counts the machine as running or runnable
    pub fn is_active(&self) -> bool {
        !matches!(self.state.as_str(), "destroyed" | "destroying" | "replacing")
    }

    pub fn has_mounts(&self) -> bool {
        !self.mounts.is_empty()
    }

    pub fn primary_mount(&self) -> Option<&MachineMount> {
        self.mounts.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_machine_carries_group() {
        let machine = Machine::new("m1", "registry/app:v1").managed("web");
        assert!(machine.is_managed());
        assert_eq!(machine.process_group(), "web");
        assert!(!machine.is_release_command());
    }

    #[test]
    fn test_unmanaged_machine_has_blank_group() {
        let machine = Machine::new("m1", "registry/app:v1");
        assert!(!machine.is_managed());
        assert_eq!(machine.process_group(), "");
    }

    #[test]
    fn test_destroyed_machine_is_not_active() {
        let mut machine = Machine::new("m1", "registry/app:v1");
        assert!(machine.is_active());
        machine.state = "destroyed".into();
        assert!(!machine.is_active());
    }
}
