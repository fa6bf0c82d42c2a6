//! Application-scoped control-plane session

use crate::client::{ControlPlaneClient, MachineListing};
use crate::error::{ControlPlaneError, Result};
use hangar_types::{AppHandle, Machine, Release, ReleaseId, ReleaseInput, ReleaseStatus, Volume};
use std::sync::Arc;
use tracing::debug;

/// A control-plane client bound to one application
#[derive(Clone)]
pub struct ControlPlaneSession {
    client: Arc<dyn ControlPlaneClient>,
    app: AppHandle,
}

impl ControlPlaneSession {
    /// Bind `client` to `app`
    pub fn open(client: Arc<dyn ControlPlaneClient>, app: AppHandle) -> Result<Self> {
        if app.name.is_empty() {
            return Err(ControlPlaneError::InvalidRequest(
                "cannot open a session without an app name".into(),
            ));
        }
        debug!(app = %app.name, "Control-plane session opened");
        Ok(Self { client, app })
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn app_name(&self) -> &str {
        &self.app.name
    }

    pub async fn list_machines(&self) -> Result<MachineListing> {
        self.client.list_machines(&self.app.name).await
    }

    pub async fn list_active_machines(&self) -> Result<Vec<Machine>> {
        self.client.list_active_machines(&self.app.name).await
    }

    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.client.list_volumes(&self.app.name).await
    }

    pub async fn latest_release_image(&self) -> Result<Option<String>> {
        self.client.latest_release_image(&self.app.name).await
    }

    pub async fn create_release(&self, input: ReleaseInput) -> Result<Release> {
        self.client.create_release(input).await
    }

    pub async fn update_release(&self, id: &ReleaseId, status: ReleaseStatus) -> Result<()> {
        self.client.update_release(id, status).await
    }
}

impl std::fmt::Debug for ControlPlaneSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneSession")
            .field("app", &self.app)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryControlPlane;

    #[test]
    fn test_open_rejects_empty_app_name() {
        let client = Arc::new(InMemoryControlPlane::new());
        let err = ControlPlaneSession::open(client, AppHandle::new("", false)).unwrap_err();
        assert!(matches!(err, ControlPlaneError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_session_scopes_calls_to_its_app() {
        let client = Arc::new(InMemoryControlPlane::new());
        client.add_machine("demo", Machine::new("m1", "img:1").managed("app"));
        client.add_machine("other", Machine::new("m2", "img:2").managed("app"));

        let session = ControlPlaneSession::open(client, AppHandle::new("demo", true)).unwrap();
        let listing = session.list_machines().await.unwrap();

        assert_eq!(listing.machines.len(), 1);
        assert_eq!(listing.machines[0].id.as_str(), "m1");
    }
}
