//! Hangar Types - Core types for machine deployment preflight
//!
//! Hangar prepares a validated plan for rolling a new application version
//! onto a fleet of platform-managed machines. This crate holds the shared
//! data model; the pipeline itself lives in `hangar-deploy` and the
//! control-plane seam in `hangar-control`.
//!
//! ## Key Concepts
//!
//! - **AppConfig**: Desired state - process groups, mounts, deploy section
//! - **Machine**: Observed unit running part of an application
//! - **Volume**: Named durable storage, attached or free
//! - **GuestSpec**: Normalized compute/memory sizing
//! - **Release**: Backend ledger entry for a deployment attempt
//! - **RolloutStrategy**: How the execution engine replaces machines

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod app;
pub mod guest;
pub mod ids;
pub mod machine;
pub mod release;
pub mod strategy;
pub mod volume;

// Re-export main types
pub use app::{
    AppConfig, AppHandle, ConfigError, DeploySection, GroupConfig, MountSpec,
    DEFAULT_PROCESS_GROUP,
};
pub use guest::{CpuKind, GuestSizeError, GuestSpec};
pub use ids::{MachineId, ReleaseId, VolumeId};
pub use machine::{
    Machine, MachineMount, METADATA_KEY_PLATFORM_VERSION, METADATA_KEY_PROCESS_GROUP,
    PLATFORM_VERSION_V2, RELEASE_COMMAND_GROUP,
};
pub use release::{Release, ReleaseInput, ReleaseStatus, PLATFORM_MARKER};
pub use strategy::{RolloutStrategy, UnsupportedStrategy};
pub use volume::Volume;
