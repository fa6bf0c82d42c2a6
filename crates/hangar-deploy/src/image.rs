//! Image resolution
//!
//! Exactly one source decides the image, tried in order: the caller's
//! explicit reference, the latest release, then the first existing machine.

use crate::error::{PreflightError, Result};
use crate::inventory::MachineInventory;
use hangar_control::ControlPlaneSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

/// Where the resolved image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Explicit,
    LatestRelease,
    ExistingMachine,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageSource::Explicit => "explicit",
            ImageSource::LatestRelease => "latest release",
            ImageSource::ExistingMachine => "existing machine",
        })
    }
}

/// Image chosen for the deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub reference: String,
    pub source: ImageSource,
}

/// Resolve the image; an explicit reference is returned without any call
#[instrument(skip_all, fields(app = %session.app_name()))]
pub async fn resolve_image(
    explicit: Option<&str>,
    session: &ControlPlaneSession,
    inventory: &MachineInventory,
) -> Result<ResolvedImage> {
    if let Some(image) = explicit.filter(|i| !i.is_empty()) {
        return Ok(ResolvedImage {
            reference: image.to_string(),
            source: ImageSource::Explicit,
        });
    }

    let reason = match session.latest_release_image().await {
        Ok(Some(image)) if !image.is_empty() => {
            debug!(image = %image, "Using image of latest release");
            return Ok(ResolvedImage {
                reference: image,
                source: ImageSource::LatestRelease,
            });
        }
        Ok(_) => "no release found".to_string(),
        Err(e) => {
            warn!(error = %e, "Could not fetch latest release image");
            e.to_string()
        }
    };

    match inventory.first_image() {
        Some(image) => {
            debug!(image = %image, "Using image of existing machine");
            Ok(ResolvedImage {
                reference: image.to_string(),
                source: ImageSource::ExistingMachine,
            })
        }
        None => Err(PreflightError::ImageResolution(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_control::{ControlPlaneError, InMemoryControlPlane, MachineListing, Operation};
    use hangar_types::{AppHandle, Machine};
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryControlPlane>, ControlPlaneSession) {
        let plane = Arc::new(InMemoryControlPlane::new());
        let session = ControlPlaneSession::open(plane.clone(), AppHandle::new("demo", true)).unwrap();
        (plane, session)
    }

    fn inventory_with(image: &str) -> MachineInventory {
        MachineInventory::from_listing(
            MachineListing {
                machines: vec![Machine::new("m1", image).managed("app")],
                release_command: None,
            },
            "app",
        )
    }

    #[tokio::test]
    async fn test_explicit_image_makes_no_call() {
        let (plane, session) = setup();
        for _ in 0..2 {
            let image = resolve_image(Some("registry/app:v9"), &session, &MachineInventory::default())
                .await
                .unwrap();
            assert_eq!(image.reference, "registry/app:v9");
            assert_eq!(image.source, ImageSource::Explicit);
        }
        assert_eq!(plane.call_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_latest_release_wins_over_machines() {
        let (plane, session) = setup();
        plane.seed_release("demo", "registry/app:v2");

        let image = resolve_image(None, &session, &inventory_with("registry/app:v1"))
            .await
            .unwrap();
        assert_eq!(image.reference, "registry/app:v2");
        assert_eq!(image.source, ImageSource::LatestRelease);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_machine() {
        let (plane, session) = setup();
        plane.fail_operation(
            Operation::LatestReleaseImage,
            ControlPlaneError::Unavailable("timeout".into()),
        );

        let image = resolve_image(None, &session, &inventory_with("registry/app:v1"))
            .await
            .unwrap();
        assert_eq!(image.source, ImageSource::ExistingMachine);
    }

    #[tokio::test]
    async fn test_nothing_to_fall_back_on() {
        let (plane, session) = setup();
        let err = resolve_image(None, &session, &MachineInventory::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no release found"));

        plane.fail_operation(
            Operation::LatestReleaseImage,
            ControlPlaneError::Unavailable("timeout".into()),
        );
        let err = resolve_image(None, &session, &MachineInventory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PreflightError::ImageResolution(ref reason) if reason.contains("timeout")));
    }
}
