//! Machine inventory
//!
//! Snapshot of the application's managed machines, with the process group of
//! every machine resolved. Machines whose metadata carries no group are
//! assigned the configuration's default group through a derived map; the
//! snapshot itself is never rewritten, since the platform stays the source
//! of truth.

use crate::error::{PreflightError, Result};
use hangar_control::{ControlPlaneSession, MachineListing};
use hangar_types::{AppConfig, Machine, MachineId};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};

/// Managed machines of an application
#[derive(Debug, Clone, Default)]
pub struct MachineInventory {
    machines: Vec<Machine>,
    release_command: Vec<Machine>,
    groups: HashMap<MachineId, String>,
}

impl MachineInventory {
    /// Fetch the inventory, refusing to adopt unmanaged machines
    #[instrument(skip_all, fields(app = %session.app_name()))]
    pub async fn build(session: &ControlPlaneSession, config: &AppConfig) -> Result<Self> {
        let listing = session.list_machines().await?;

        if listing.machines.is_empty() {
            let active = session.list_active_machines().await?;
            if !active.is_empty() {
                warn!(count = active.len(), "Refusing to deploy over unmanaged machines");
                return Err(PreflightError::UnmanagedMachines {
                    count: active.len(),
                });
            }
        }

        let inventory = Self::from_listing(listing, &config.default_process_name());
        debug!(
            machines = inventory.machines.len(),
            release_command = inventory.release_command.len(),
            "Machine inventory built"
        );
        Ok(inventory)
    }

    /// Build from a listing, resolving blank groups to `default_group`
    pub fn from_listing(listing: MachineListing, default_group: &str) -> Self {
        let release_command: Vec<Machine> = listing.release_command.into_iter().collect();

        let groups = listing
            .machines
            .iter()
            .chain(release_command.iter())
            .map(|machine| {
                let group = match machine.process_group() {
                    "" => default_group,
                    group => group,
                };
                (machine.id.clone(), group.to_string())
            })
            .collect();

        Self {
            machines: listing.machines,
            release_command,
            groups,
        }
    }

    /// Ordinary machines in snapshot order
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// The release-command machine, if one exists
    pub fn release_command_machines(&self) -> &[Machine] {
        &self.release_command
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Resolved process group of a machine in this inventory
    pub fn group_of(&self, machine: &Machine) -> Option<&str> {
        self.groups.get(&machine.id).map(String::as_str)
    }

    /// Ordinary machines of one group, in snapshot order
    pub fn in_group(&self, group: &str) -> Vec<&Machine> {
        self.machines
            .iter()
            .filter(|m| self.group_of(m) == Some(group))
            .collect()
    }

    /// Ordinary machines keyed by resolved group
    pub fn by_group(&self) -> BTreeMap<&str, Vec<&Machine>> {
        let mut grouped: BTreeMap<&str, Vec<&Machine>> = BTreeMap::new();
        for machine in &self.machines {
            if let Some(group) = self.group_of(machine) {
                grouped.entry(group).or_default().push(machine);
            }
        }
        grouped
    }

    /// Image of the first ordinary machine that has one
    pub fn first_image(&self) -> Option<&str> {
        self.machines
            .iter()
            .map(|m| m.image.as_str())
            .find(|image| !image.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_control::{ControlPlaneError, InMemoryControlPlane, Operation};
    use hangar_types::{AppHandle, RELEASE_COMMAND_GROUP};
    use std::sync::Arc;

    fn session(plane: Arc<InMemoryControlPlane>) -> ControlPlaneSession {
        ControlPlaneSession::open(plane, AppHandle::new("demo", true)).unwrap()
    }

    #[tokio::test]
    async fn test_unmanaged_machines_block_deploy() {
        let plane = Arc::new(InMemoryControlPlane::new());
        plane.add_machine("demo", Machine::new("m1", "img:1"));
        plane.add_machine("demo", Machine::new("m2", "img:1"));

        let err = MachineInventory::build(&session(plane), &AppConfig::new("demo"))
            .await
            .unwrap_err();
        assert!(matches!(err, PreflightError::UnmanagedMachines { count: 2 }));
        assert!(err.to_string().contains("hangar_platform_version=v2"));
    }

    #[tokio::test]
    async fn test_unmanaged_check_skipped_when_managed_exist() {
        let plane = Arc::new(InMemoryControlPlane::new());
        plane.add_machine("demo", Machine::new("m1", "img:1").managed("app"));
        plane.add_machine("demo", Machine::new("legacy", "img:0"));

        let inventory = MachineInventory::build(&session(plane.clone()), &AppConfig::new("demo"))
            .await
            .unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(plane.call_counts().list_active_machines, 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_backend_error() {
        let plane = Arc::new(InMemoryControlPlane::new());
        plane.fail_operation(
            Operation::ListMachines,
            ControlPlaneError::Unavailable("503".into()),
        );

        let err = MachineInventory::build(&session(plane), &AppConfig::new("demo"))
            .await
            .unwrap_err();
        assert!(matches!(err, PreflightError::Backend(_)));
    }

    #[test]
    fn test_blank_group_resolves_without_mutating_snapshot() {
        let mut untagged = Machine::new("m1", "img:1").managed("");
        untagged.metadata.remove(hangar_types::METADATA_KEY_PROCESS_GROUP);
        let listing = MachineListing {
            machines: vec![untagged, Machine::new("m2", "img:1").managed("worker")],
            release_command: Some(Machine::new("rc", "img:1").managed(RELEASE_COMMAND_GROUP)),
        };

        let inventory = MachineInventory::from_listing(listing, "web");

        let first = &inventory.machines()[0];
        assert_eq!(inventory.group_of(first), Some("web"));
        assert_eq!(first.process_group(), "");
        assert_eq!(inventory.in_group("worker").len(), 1);
        assert_eq!(inventory.release_command_machines().len(), 1);

        let grouped = inventory.by_group();
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec!["web", "worker"]);
    }
}
