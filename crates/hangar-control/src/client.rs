//! Control-plane client trait

use crate::error::Result;
use async_trait::async_trait;
use hangar_types::{Machine, Release, ReleaseId, ReleaseInput, ReleaseStatus, Volume};

/// Managed machines of an application
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineListing {
    /// Machines carrying the managed platform tag, release-command machine excluded
    pub machines: Vec<Machine>,

    /// The one-off machine that runs the release command, if any
    pub release_command: Option<Machine>,
}

/// Remote operations the preflight consumes
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// List managed machines plus the release-command machine
    async fn list_machines(&self, app: &str) -> Result<MachineListing>;

    /// List every active machine regardless of management tag, excluding
    /// the release-command machine
    async fn list_active_machines(&self, app: &str) -> Result<Vec<Machine>>;

    /// List every volume of the application
    async fn list_volumes(&self, app: &str) -> Result<Vec<Volume>>;

    /// Image reference of the most recent release; `None` when no release has one
    async fn latest_release_image(&self, app: &str) -> Result<Option<String>>;

    /// Create a release; the backend assigns id and version
    async fn create_release(&self, input: ReleaseInput) -> Result<Release>;

    /// Move a release to a new status
    async fn update_release(&self, id: &ReleaseId, status: ReleaseStatus) -> Result<()>;
}
