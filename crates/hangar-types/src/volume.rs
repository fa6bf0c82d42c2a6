//! Volume types

use crate::{MachineId, VolumeId};
use serde::{Deserialize, Serialize};

/// Named durable storage unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Unique volume identifier
    pub id: VolumeId,

    /// Volume name; several volumes may share one
    pub name: String,

    /// Region the volume lives in
    #[serde(default)]
    pub region: String,

    /// Size in gigabytes
    #[serde(default)]
    pub size_gb: u32,

    /// Machine the volume is attached to
    #[serde(default)]
    pub attached_machine: Option<MachineId>,

    /// Allocation the volume is attached to
    #[serde(default)]
    pub attached_allocation: Option<String>,
}

impl Volume {
    pub fn new(id: impl Into<VolumeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: String::new(),
            size_gb: 1,
            attached_machine: None,
            attached_allocation: None,
        }
    }

    pub fn attached_to(mut self, machine: impl Into<MachineId>) -> Self {
        self.attached_machine = Some(machine.into());
        self
    }

    pub fn is_unattached(&self) -> bool {
        self.attached_machine.is_none() && self.attached_allocation.is_none()
    }
}
