//! Serializable plan summary

use crate::image::ImageSource;
use hangar_types::{GuestSpec, MachineId, ReleaseId, RolloutStrategy};
use serde::{Deserialize, Serialize};

/// What a plan will do, for printing or handing to another tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub app: String,
    pub release_id: ReleaseId,
    pub release_version: u64,
    pub image: String,
    pub image_source: ImageSource,
    pub strategy: RolloutStrategy,
    pub guest: Option<GuestSpec>,
    /// Humantime-formatted durations
    pub wait_timeout: String,
    pub lease_timeout: String,
    pub lease_delay_between: String,
    pub first_deploy: bool,
    pub skip_health_checks: bool,
    pub restart_only: bool,
    pub groups: Vec<GroupSummary>,
    pub release_command_machine: Option<MachineId>,
}

/// Per-group view of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    /// Existing machines in the group
    pub machines: usize,
    /// Volume the group mounts, if any
    pub mount: Option<String>,
    /// Unattached volumes left for the mount
    pub reservable: usize,
}
