//! First-deploy provisioning hook
//!
//! Runs once, after volumes are reconciled and only on a first deploy. A
//! hook may consume volume reservations; topology validation runs after it
//! and sees what is left.

use crate::volumes::VolumeReservations;
use async_trait::async_trait;
use hangar_control::ControlPlaneSession;
use hangar_types::AppConfig;

/// Everything a provisioning hook may inspect
pub struct ProvisionContext<'a> {
    pub session: &'a ControlPlaneSession,
    pub config: &'a AppConfig,
    pub image: &'a str,
    pub volumes: &'a VolumeReservations,
}

/// Hook failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProvisionError(pub String);

/// First-deploy provisioning collaborator
#[async_trait]
pub trait ProvisionHook: Send + Sync {
    /// Provision resources an app needs before its first machines exist
    async fn provision(&self, ctx: &ProvisionContext<'_>) -> std::result::Result<(), ProvisionError>;

    /// Get the hook name
    fn name(&self) -> &str;
}

/// Default hook that provisions nothing
pub struct NoopProvisioner;

#[async_trait]
impl ProvisionHook for NoopProvisioner {
    async fn provision(&self, _ctx: &ProvisionContext<'_>) -> std::result::Result<(), ProvisionError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
