//! In-memory control plane
//!
//! Suitable for development, tests and dry runs against a recorded
//! snapshot. Call counters and failure injection let tests assert which
//! remote operations a pipeline performed.

use crate::client::{ControlPlaneClient, MachineListing};
use crate::error::{ControlPlaneError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use hangar_types::{
    AppHandle, Machine, Release, ReleaseId, ReleaseInput, ReleaseStatus, RolloutStrategy, Volume,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Remote operations, used for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMachines,
    ListActiveMachines,
    ListVolumes,
    LatestReleaseImage,
    CreateRelease,
    UpdateRelease,
}

/// Recorded state of one application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlPlaneSnapshot {
    /// The application
    pub app: Option<AppHandle>,

    /// Every machine, managed or not
    #[serde(default)]
    pub machines: Vec<Machine>,

    /// Every volume, attached or not
    #[serde(default)]
    pub volumes: Vec<Volume>,

    /// Image of the current release, if the app was deployed before
    #[serde(default)]
    pub current_image: Option<String>,
}

/// Number of calls made per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_machines: usize,
    pub list_active_machines: usize,
    pub list_volumes: usize,
    pub latest_release_image: usize,
    pub create_release: usize,
    pub update_release: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_machines
            + self.list_active_machines
            + self.list_volumes
            + self.latest_release_image
            + self.create_release
            + self.update_release
    }
}

/// In-memory control plane
pub struct InMemoryControlPlane {
    machines: DashMap<String, Vec<Machine>>,
    volumes: DashMap<String, Vec<Volume>>,
    releases: DashMap<ReleaseId, Release>,
    by_app: DashMap<String, Vec<ReleaseId>>,
    failures: DashMap<Operation, ControlPlaneError>,
    calls: DashMap<Operation, AtomicUsize>,
    next_version: AtomicU64,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self {
            machines: DashMap::new(),
            volumes: DashMap::new(),
            releases: DashMap::new(),
            by_app: DashMap::new(),
            failures: DashMap::new(),
            calls: DashMap::new(),
            next_version: AtomicU64::new(1),
        }
    }

    /// Build a control plane holding one recorded application
    pub fn from_snapshot(snapshot: ControlPlaneSnapshot) -> Result<Self> {
        let app = snapshot.app.ok_or_else(|| {
            ControlPlaneError::InvalidRequest("snapshot does not name an app".into())
        })?;

        let plane = Self::new();
        for machine in snapshot.machines {
            plane.add_machine(&app.name, machine);
        }
        for volume in snapshot.volumes {
            plane.add_volume(&app.name, volume);
        }
        if let Some(image) = snapshot.current_image {
            plane.seed_release(&app.name, image);
        }
        Ok(plane)
    }

    pub fn add_machine(&self, app: &str, machine: Machine) {
        self.machines.entry(app.to_string()).or_default().push(machine);
    }

    pub fn add_volume(&self, app: &str, volume: Volume) {
        self.volumes.entry(app.to_string()).or_default().push(volume);
    }

    /// Record a finished release carrying `image`
    pub fn seed_release(&self, app: &str, image: impl Into<String>) -> Release {
        self.insert_release(
            app,
            RolloutStrategy::default(),
            image.into(),
            ReleaseStatus::Succeeded,
        )
    }

    /// Make every later call of `op` fail with `error`
    pub fn fail_operation(&self, op: Operation, error: ControlPlaneError) {
        self.failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    pub fn release(&self, id: &ReleaseId) -> Option<Release> {
        self.releases.get(id).map(|r| r.clone())
    }

    pub fn releases_for(&self, app: &str) -> Vec<Release> {
        self.by_app
            .get(app)
            .map(|ids| ids.iter().filter_map(|id| self.release(id)).collect())
            .unwrap_or_default()
    }

    pub fn call_counts(&self) -> CallCounts {
        let count = |op: Operation| {
            self.calls
                .get(&op)
                .map(|c| c.load(Ordering::SeqCst))
                .unwrap_or(0)
        };
        CallCounts {
            list_machines: count(Operation::ListMachines),
            list_active_machines: count(Operation::ListActiveMachines),
            list_volumes: count(Operation::ListVolumes),
            latest_release_image: count(Operation::LatestReleaseImage),
            create_release: count(Operation::CreateRelease),
            update_release: count(Operation::UpdateRelease),
        }
    }

    // --- Internal helpers ---

    fn enter(&self, op: Operation) -> Result<()> {
        self.calls
            .entry(op)
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::SeqCst);

        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn insert_release(
        &self,
        app: &str,
        strategy: RolloutStrategy,
        image: String,
        status: ReleaseStatus,
    ) -> Release {
        let now = chrono::Utc::now();
        let release = Release {
            id: ReleaseId::generate(),
            version: self.next_version.fetch_add(1, Ordering::SeqCst),
            app_name: app.to_string(),
            strategy,
            image,
            status,
            created_at: now,
            updated_at: now,
        };

        self.releases.insert(release.id.clone(), release.clone());
        self.by_app
            .entry(app.to_string())
            .or_default()
            .push(release.id.clone());
        release
    }
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPlaneClient for InMemoryControlPlane {
    async fn list_machines(&self, app: &str) -> Result<MachineListing> {
        self.enter(Operation::ListMachines)?;

        let mut listing = MachineListing::default();
        if let Some(machines) = self.machines.get(app) {
            for machine in machines.iter().filter(|m| m.is_managed() && m.is_active()) {
                if machine.is_release_command() {
                    if listing.release_command.is_none() {
                        listing.release_command = Some(machine.clone());
                    }
                } else {
                    listing.machines.push(machine.clone());
                }
            }
        }
        Ok(listing)
    }

    async fn list_active_machines(&self, app: &str) -> Result<Vec<Machine>> {
        self.enter(Operation::ListActiveMachines)?;

        Ok(self
            .machines
            .get(app)
            .map(|ms| {
                ms.iter()
                    .filter(|m| m.is_active() && !m.is_release_command())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_volumes(&self, app: &str) -> Result<Vec<Volume>> {
        self.enter(Operation::ListVolumes)?;
        Ok(self.volumes.get(app).map(|v| v.clone()).unwrap_or_default())
    }

    async fn latest_release_image(&self, app: &str) -> Result<Option<String>> {
        self.enter(Operation::LatestReleaseImage)?;

        Ok(self
            .releases_for(app)
            .into_iter()
            .max_by_key(|r| r.version)
            .map(|r| r.image)
            .filter(|image| !image.is_empty()))
    }

    async fn create_release(&self, input: ReleaseInput) -> Result<Release> {
        self.enter(Operation::CreateRelease)?;

        let strategy = RolloutStrategy::ALL
            .into_iter()
            .find(|s| s.ledger_name() == input.strategy)
            .ok_or_else(|| {
                ControlPlaneError::InvalidRequest(format!(
                    "unknown release strategy '{}'",
                    input.strategy
                ))
            })?;
        if input.image.is_empty() {
            return Err(ControlPlaneError::InvalidRequest(
                "release image cannot be empty".into(),
            ));
        }

        Ok(self.insert_release(&input.app_id, strategy, input.image, ReleaseStatus::Created))
    }

    async fn update_release(&self, id: &ReleaseId, status: ReleaseStatus) -> Result<()> {
        self.enter(Operation::UpdateRelease)?;

        let mut release = self
            .releases
            .get_mut(id)
            .ok_or_else(|| ControlPlaneError::ReleaseNotFound(id.clone()))?;
        if release.status.is_terminal() {
            return Err(ControlPlaneError::InvalidRequest(format!(
                "release {} is already {}",
                id, release.status
            )));
        }
        release.status = status;
        release.updated_at = chrono::Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_partitions_release_command_machine() {
        let plane = InMemoryControlPlane::new();
        plane.add_machine("demo", Machine::new("m1", "img:1").managed("web"));
        plane.add_machine(
            "demo",
            Machine::new("rc", "img:1").managed(hangar_types::RELEASE_COMMAND_GROUP),
        );
        plane.add_machine("demo", Machine::new("legacy", "img:0"));

        let listing = plane.list_machines("demo").await.unwrap();
        assert_eq!(listing.machines.len(), 1);
        assert_eq!(listing.release_command.map(|m| m.id.to_string()), Some("rc".into()));

        let active = plane.list_active_machines("demo").await.unwrap();
        let ids: Vec<_> = active.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["m1", "legacy"]);
    }

    #[tokio::test]
    async fn test_latest_image_follows_highest_version() {
        let plane = InMemoryControlPlane::new();
        assert_eq!(plane.latest_release_image("demo").await.unwrap(), None);

        plane.seed_release("demo", "img:1");
        plane.seed_release("demo", "img:2");
        assert_eq!(
            plane.latest_release_image("demo").await.unwrap(),
            Some("img:2".to_string())
        );
    }

    #[tokio::test]
    async fn test_release_status_is_append_only() {
        let plane = InMemoryControlPlane::new();
        let release = plane
            .create_release(ReleaseInput {
                app_id: "demo".into(),
                platform_version: hangar_types::PLATFORM_MARKER.into(),
                strategy: "ROLLING".into(),
                definition: serde_json::json!({}),
                image: "img:3".into(),
            })
            .await
            .unwrap();
        assert_eq!(release.status, ReleaseStatus::Created);

        plane
            .update_release(&release.id, ReleaseStatus::Succeeded)
            .await
            .unwrap();
        let err = plane
            .update_release(&release.id, ReleaseStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, ControlPlaneError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_release_strategy_must_be_ledger_name() {
        let plane = InMemoryControlPlane::new();
        let err = plane
            .create_release(ReleaseInput {
                app_id: "demo".into(),
                platform_version: hangar_types::PLATFORM_MARKER.into(),
                strategy: "rolling".into(),
                definition: serde_json::json!({}),
                image: "img:3".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ControlPlaneError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let plane = InMemoryControlPlane::new();
        plane.fail_operation(
            Operation::ListVolumes,
            ControlPlaneError::Unavailable("timeout".into()),
        );

        assert!(plane.list_volumes("demo").await.is_err());
        plane.clear_failures();
        assert!(plane.list_volumes("demo").await.unwrap().is_empty());
        assert_eq!(plane.call_counts().list_volumes, 2);
    }

    #[test]
    fn test_snapshot_requires_app() {
        let err = InMemoryControlPlane::from_snapshot(ControlPlaneSnapshot::default())
            .err()
            .unwrap();
        assert!(matches!(err, ControlPlaneError::InvalidRequest(_)));
    }
}
