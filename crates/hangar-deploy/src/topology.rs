//! Topology validation
//!
//! The single consistency gate before any mutation. For each declared group,
//! existing machines must carry exactly the mount the configuration expects;
//! a group without machines needs a reservable volume for each of its mounts.
//! Only the first mount of a group is considered.

use crate::error::{PreflightError, Result};
use crate::inventory::MachineInventory;
use crate::volumes::VolumeReservations;
use hangar_types::{AppConfig, GroupConfig, Machine};
use tracing::debug;

/// Validate every declared process group
pub fn validate_topology(
    config: &AppConfig,
    inventory: &MachineInventory,
    volumes: &VolumeReservations,
) -> Result<()> {
    for group in config.process_names() {
        let group_config = config
            .flatten(&group)
            .map_err(|e| PreflightError::ConfigValidation(e.to_string()))?;
        let machines = inventory.in_group(&group);

        if machines.is_empty() {
            check_reservable(&group_config, volumes)?;
        } else {
            for machine in machines {
                check_machine_mount(&group_config, machine)?;
            }
        }
        debug!(group = %group, "Group topology valid");
    }
    Ok(())
}

fn check_machine_mount(group: &GroupConfig, machine: &Machine) -> Result<()> {
    match (group.primary_mount(), machine.primary_mount()) {
        (None, Some(found)) => Err(PreflightError::MountOrphaned {
            machine: machine.id.clone(),
            group: group.name.clone(),
            volume: found.name.clone(),
        }),
        (Some(expected), None) => Err(PreflightError::MountMissing {
            machine: machine.id.clone(),
            group: group.name.clone(),
            expected: expected.source.clone(),
        }),
        (Some(expected), Some(found))
            if !expected.source.is_empty()
                && !found.name.is_empty()
                && expected.source != found.name =>
        {
            Err(PreflightError::MountMismatch {
                machine: machine.id.clone(),
                group: group.name.clone(),
                expected: expected.source.clone(),
                found: found.name.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_reservable(group: &GroupConfig, volumes: &VolumeReservations) -> Result<()> {
    for mount in &group.mounts {
        if !volumes.has_reservable(&mount.source) {
            return Err(PreflightError::VolumeUnavailable {
                group: group.name.clone(),
                volume: mount.source.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_control::MachineListing;
    use hangar_types::{MountSpec, Volume};

    fn web_config(mount: Option<&str>) -> AppConfig {
        let mut config = AppConfig::new("demo");
        config.processes.insert("web".into(), "bin/web".into());
        if let Some(source) = mount {
            config.mounts.push(MountSpec::new(source, "/data"));
        }
        config
    }

    fn check(config: &AppConfig, machines: Vec<Machine>) -> Result<()> {
        validate_topology(config, &inventory(machines), &VolumeReservations::default())
    }

    fn inventory(machines: Vec<Machine>) -> MachineInventory {
        MachineInventory::from_listing(
            MachineListing {
                machines,
                release_command: None,
            },
            "web",
        )
    }

    #[test]
    fn test_orphaned_mount_names_machine_and_group() {
        let machine = Machine::new("m1", "img")
            .managed("web")
            .with_mount("vol_1", "data", "/data");
        let err = check(&web_config(None), vec![machine]).unwrap_err();

        match err {
            PreflightError::MountOrphaned { machine, group, volume } => {
                assert_eq!(machine.as_str(), "m1");
                assert_eq!(group, "web");
                assert_eq!(volume, "data");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_mount() {
        let machine = Machine::new("m1", "img").managed("web");
        let err = check(&web_config(Some("data")), vec![machine]).unwrap_err();
        assert!(matches!(err, PreflightError::MountMissing { .. }));
    }

    #[test]
    fn test_mismatched_mount() {
        let machine = Machine::new("m1", "img")
            .managed("web")
            .with_mount("vol_1", "logs", "/data");
        let err = check(&web_config(Some("data")), vec![machine]).unwrap_err();
        assert!(matches!(err, PreflightError::MountMismatch { ref found, .. } if found == "logs"));
    }

    #[test]
    fn test_unnamed_machine_mount_is_not_a_mismatch() {
        let machine = Machine::new("m1", "img")
            .managed("web")
            .with_mount("vol_1", "", "/data");
        assert!(check(&web_config(Some("data")), vec![machine]).is_ok());
    }

    #[test]
    fn test_empty_group_needs_reservable_volume() {
        let config = web_config(Some("data"));

        let err = check(&config, vec![]).unwrap_err();
        assert!(matches!(
            err,
            PreflightError::VolumeUnavailable { ref group, ref volume }
                if group == "web" && volume == "data"
        ));

        let volumes = VolumeReservations::from_volumes([Volume::new("v1", "data")]);
        assert!(validate_topology(&config, &inventory(vec![]), &volumes).is_ok());
        assert_eq!(volumes.queue_len("data"), 1);
    }

    #[test]
    fn test_mount_scoped_to_other_group_is_ignored() {
        let mut config = web_config(None);
        config.processes.insert("db".into(), "bin/db".into());
        config.mounts.push(MountSpec::new("pgdata", "/var/lib/pg").for_processes(["db"]));

        let machine = Machine::new("m1", "img").managed("web");
        let volumes = VolumeReservations::from_volumes([Volume::new("v1", "pgdata")]);
        assert!(validate_topology(&config, &inventory(vec![machine]), &volumes).is_ok());
    }
}
