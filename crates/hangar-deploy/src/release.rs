//! Release recording

use crate::error::{PreflightError, Result};
use hangar_control::ControlPlaneSession;
use hangar_types::{
    AppConfig, Release, ReleaseId, ReleaseInput, ReleaseStatus, RolloutStrategy, PLATFORM_MARKER,
};
use tracing::{info, instrument};

/// Writes the release ledger entry of a plan
#[derive(Debug, Clone)]
pub struct ReleaseRecorder {
    session: ControlPlaneSession,
}

impl ReleaseRecorder {
    pub fn new(session: ControlPlaneSession) -> Self {
        Self { session }
    }

    /// Create the release; the backend assigns id and version
    #[instrument(skip(self, config), fields(app = %self.session.app_name()))]
    pub async fn create(
        &self,
        config: &AppConfig,
        strategy: RolloutStrategy,
        image: &str,
    ) -> Result<Release> {
        let definition = serde_json::to_value(config).map_err(|e| {
            PreflightError::ConfigValidation(format!("cannot snapshot configuration: {}", e))
        })?;

        let release = self
            .session
            .create_release(ReleaseInput {
                app_id: self.session.app_name().to_string(),
                platform_version: PLATFORM_MARKER.to_string(),
                strategy: strategy.ledger_name(),
                definition,
                image: image.to_string(),
            })
            .await?;

        info!(release_id = %release.id, version = release.version, "Release created");
        Ok(release)
    }

    /// Move a release to a terminal status
    #[instrument(skip(self), fields(app = %self.session.app_name()))]
    pub async fn update(&self, id: &ReleaseId, status: ReleaseStatus) -> Result<()> {
        if !status.is_terminal() {
            return Err(PreflightError::ContractViolation(format!(
                "release {} can only move to a terminal status, not {}",
                id, status
            )));
        }

        self.session
            .update_release(id, status)
            .await
            .map_err(|source| PreflightError::ReleaseNotFinalized {
                release: id.clone(),
                source,
            })?;
        info!(release_id = %id, status = %status, "Release finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_control::{ControlPlaneClient, InMemoryControlPlane};
    use hangar_types::AppHandle;
    use std::sync::Arc;

    fn recorder() -> (Arc<InMemoryControlPlane>, ReleaseRecorder) {
        let plane = Arc::new(InMemoryControlPlane::new());
        let session = ControlPlaneSession::open(plane.clone(), AppHandle::new("demo", true)).unwrap();
        (plane, ReleaseRecorder::new(session))
    }

    #[tokio::test]
    async fn test_create_submits_upper_case_strategy() {
        let (plane, recorder) = recorder();
        let release = recorder
            .create(&AppConfig::new("demo"), RolloutStrategy::Immediate, "img:7")
            .await
            .unwrap();

        assert_eq!(release.status, ReleaseStatus::Created);
        assert_eq!(release.strategy, RolloutStrategy::Immediate);
        assert_eq!(plane.releases_for("demo").len(), 1);
        assert_eq!(plane.latest_release_image("demo").await.unwrap(), Some("img:7".into()));
    }

    #[tokio::test]
    async fn test_update_rejects_non_terminal_status() {
        let (plane, recorder) = recorder();
        let release = plane.seed_release("demo", "img:1");

        let err = recorder.update(&release.id, ReleaseStatus::Created).await.unwrap_err();
        assert!(matches!(err, PreflightError::ContractViolation(_)));
        assert_eq!(plane.call_counts().update_release, 0);
    }

    #[tokio::test]
    async fn test_unknown_release_is_not_finalized() {
        let (_plane, recorder) = recorder();
        let err = recorder
            .update(&ReleaseId::new("missing"), ReleaseStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, PreflightError::ReleaseNotFinalized { .. }));
    }
}
