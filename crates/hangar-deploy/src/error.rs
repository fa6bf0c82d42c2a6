//! Preflight error types

use hangar_control::ControlPlaneError;
use hangar_types::{
    GuestSizeError, MachineId, ReleaseId, UnsupportedStrategy, METADATA_KEY_PLATFORM_VERSION,
    PLATFORM_VERSION_V2,
};
use thiserror::Error;

/// Preflight errors
///
/// Every variant carries enough context (machine, group, volume) to act on
/// without querying the platform again.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    #[error(transparent)]
    UnsupportedStrategy(#[from] UnsupportedStrategy),

    #[error(transparent)]
    InvalidSize(#[from] GuestSizeError),

    #[error(
        "found {count} unmanaged machine(s); deploys only update machines whose metadata carries \
         {}={}. Tag each machine with that metadata and its process group, then deploy again",
        METADATA_KEY_PLATFORM_VERSION,
        PLATFORM_VERSION_V2
    )]
    UnmanagedMachines { count: usize },

    #[error(
        "machine {machine} in group '{group}' has volume '{volume}' mounted but the configuration \
         declares no mount for the group; detach the volume or declare the mount"
    )]
    MountOrphaned {
        machine: MachineId,
        group: String,
        volume: String,
    },

    #[error(
        "machine {machine} in group '{group}' has no volume but the configuration mounts \
         '{expected}'; volumes cannot be attached to existing machines, recreate the machine"
    )]
    MountMissing {
        machine: MachineId,
        group: String,
        expected: String,
    },

    #[error(
        "machine {machine} in group '{group}' has volume '{found}' mounted but the configuration \
         mounts '{expected}'"
    )]
    MountMismatch {
        machine: MachineId,
        group: String,
        expected: String,
        found: String,
    },

    #[error("group '{group}' needs an unattached volume named '{volume}' but none is available")]
    VolumeUnavailable { group: String, volume: String },

    #[error("could not determine the image to deploy: {0}")]
    ImageResolution(String),

    #[error("control plane error: {0}")]
    Backend(#[from] ControlPlaneError),

    #[error("provisioning hook '{hook}' failed: {reason}")]
    Provision { hook: String, reason: String },

    #[error("release {release} was left unfinalized: {source}")]
    ReleaseNotFinalized {
        release: ReleaseId,
        source: ControlPlaneError,
    },
}

/// Result type for preflight operations
pub type Result<T> = std::result::Result<T, PreflightError>;
