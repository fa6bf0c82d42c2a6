//! First-deploy detection

use crate::inventory::MachineInventory;
use hangar_types::AppHandle;

/// True only for an app never deployed that has no machines
///
/// An app scaled to zero after a deploy is not a first deploy, so
/// first-deploy provisioning never runs against a live application.
pub fn is_first_deploy(app: &AppHandle, inventory: &MachineInventory) -> bool {
    !app.deployed && inventory.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_control::MachineListing;
    use hangar_types::Machine;

    #[test]
    fn test_first_deploy_matrix() {
        let empty = MachineInventory::default();
        let populated = MachineInventory::from_listing(
            MachineListing {
                machines: vec![Machine::new("m1", "img").managed("app")],
                release_command: None,
            },
            "app",
        );

        assert!(is_first_deploy(&AppHandle::new("demo", false), &empty));
        assert!(!is_first_deploy(&AppHandle::new("demo", true), &empty));
        assert!(!is_first_deploy(&AppHandle::new("demo", false), &populated));
        assert!(!is_first_deploy(&AppHandle::new("demo", true), &populated));
    }
}
