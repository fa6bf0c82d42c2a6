//! Volume reservations
//!
//! Unattached volumes grouped by name into FIFO queues. Reserving pops the
//! head of a queue; it is the only mutation and must not be retried after it
//! succeeds, or a volume is silently skipped.

use crate::error::Result;
use dashmap::DashMap;
use hangar_control::ControlPlaneSession;
use hangar_types::{AppConfig, Volume};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Reservable volumes keyed by name
///
/// Queues live in a sharded concurrent map so the execution engine may
/// reserve for several groups in parallel.
#[derive(Debug, Default)]
pub struct VolumeReservations {
    queues: DashMap<String, VecDeque<Volume>>,
}

impl VolumeReservations {
    /// Fetch and queue unattached volumes
    ///
    /// When the configuration mounts nothing the listing is skipped and the
    /// queues stay empty.
    #[instrument(skip_all, fields(app = %session.app_name()))]
    pub async fn reconcile(session: &ControlPlaneSession, config: &AppConfig) -> Result<Self> {
        if !config.has_mounts() {
            debug!("No mounts configured, skipping volume listing");
            return Ok(Self::default());
        }

        let volumes = session.list_volumes().await?;
        let reservations = Self::from_volumes(volumes);
        debug!(reservable = reservations.total(), "Volume reservations built");
        Ok(reservations)
    }

    /// Queue the unattached volumes, preserving snapshot order per name
    pub fn from_volumes(volumes: impl IntoIterator<Item = Volume>) -> Self {
        let queues: DashMap<String, VecDeque<Volume>> = DashMap::new();
        for volume in volumes.into_iter().filter(Volume::is_unattached) {
            queues.entry(volume.name.clone()).or_default().push_back(volume);
        }
        Self { queues }
    }

    /// Pop the next volume named `name`; `None` leaves every queue untouched
    pub fn reserve(&self, name: &str) -> Option<Volume> {
        let volume = self.queues.get_mut(name)?.pop_front();
        if let Some(volume) = &volume {
            debug!(volume = %volume.id, volume_name = name, "Volume reserved");
        }
        volume
    }

    pub fn queue_len(&self, name: &str) -> usize {
        self.queues.get(name).map(|q| q.len()).unwrap_or(0)
    }

    pub fn has_reservable(&self, name: &str) -> bool {
        self.queue_len(name) > 0
    }

    /// Reservable volume count per name, sorted by name
    pub fn counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .queues
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect();
        counts.sort();
        counts
    }

    pub fn total(&self) -> usize {
        self.queues.iter().map(|entry| entry.value().len()).sum()
    }
}
