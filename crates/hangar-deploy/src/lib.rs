//! Hangar Deploy - Deployment preflight and reconciliation
//!
//! Reconciles the desired state of an application (its configuration)
//! against the observed state of its fleet (machines, metadata, unattached
//! volumes) and produces a validated [`DeploymentPlan`], or fails fast with
//! a precise diagnostic before anything destructive happens.
//!
//! ## Architectural Boundaries
//!
//! - `hangar-deploy` owns: config resolution, inventory, volume matching,
//!   image and strategy resolution, topology validation, release recording
//! - `hangar-control` owns: every remote call, behind `ControlPlaneClient`
//! - The execution engine (not in this workspace) owns: the per-machine
//!   rollout loop, health waiting, lease renewal
//!
//! ## Usage
//!
//! ```no_run
//! use hangar_control::InMemoryControlPlane;
//! use hangar_deploy::{DeploymentArgs, DeploymentPlanner};
//! use hangar_types::{AppConfig, AppHandle, ReleaseStatus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(InMemoryControlPlane::new());
//! let planner = DeploymentPlanner::new(client);
//!
//! let args = DeploymentArgs::for_app(AppHandle::new("demo", false))
//!     .with_image("registry/demo:v1");
//! let plan = planner.prepare(Some(AppConfig::new("demo")), args).await?;
//!
//! // hand the plan to the execution engine, then
//! plan.finalize(ReleaseStatus::Succeeded).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod args;
pub mod config;
pub mod error;
pub mod first_deploy;
pub mod guest;
pub mod image;
pub mod inventory;
pub mod lease;
pub mod plan;
pub mod provision;
pub mod release;
pub mod strategy;
pub mod summary;
pub mod topology;
pub mod volumes;

// Re-exports
pub use args::DeploymentArgs;
pub use config::{parse_env_overrides, validate_release_command, ConfigResolver};
pub use error::{PreflightError, Result};
pub use first_deploy::is_first_deploy;
pub use guest::resolve_guest;
pub use image::{resolve_image, ImageSource, ResolvedImage};
pub use inventory::MachineInventory;
pub use lease::{LeaseTiming, DEFAULT_LEASE_TIMEOUT, DEFAULT_WAIT_TIMEOUT};
pub use plan::{DeploymentPlan, DeploymentPlanner};
pub use provision::{NoopProvisioner, ProvisionContext, ProvisionError, ProvisionHook};
pub use release::ReleaseRecorder;
pub use strategy::resolve_strategy;
pub use summary::{GroupSummary, PlanSummary};
pub use topology::validate_topology;
pub use volumes::VolumeReservations;
