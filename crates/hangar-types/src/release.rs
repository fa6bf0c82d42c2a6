//! Release ledger types
//!
//! A Release records one deployment attempt on the backend. Status moves
//! from `Created` to a terminal status exactly once.

use crate::{ReleaseId, RolloutStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform marker submitted with every release
pub const PLATFORM_MARKER: &str = "machines";

/// Backend ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Identifier assigned by the backend
    pub id: ReleaseId,

    /// Monotonic version assigned by the backend
    pub version: u64,

    /// Application the release belongs to
    pub app_name: String,

    /// Rollout strategy
    pub strategy: RolloutStrategy,

    /// Image being deployed
    pub image: String,

    /// Current status
    pub status: ReleaseStatus,

    /// Created timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Last updated timestamp
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Input for creating a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInput {
    /// Application identity
    pub app_id: String,

    /// Deployment platform marker
    pub platform_version: String,

    /// Upper-case strategy name
    pub strategy: String,

    /// Snapshot of the effective configuration
    pub definition: serde_json::Value,

    /// Image being deployed
    pub image: String,
}

/// Release lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Recorded before the rollout starts
    Created,
    /// Rollout finished successfully
    Succeeded,
    /// Rollout failed
    Failed,
}

impl ReleaseStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReleaseStatus::Created)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Created => "created",
            ReleaseStatus::Succeeded => "succeeded",
            ReleaseStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_created_is_non_terminal() {
        assert!(!ReleaseStatus::Created.is_terminal());
        assert!(ReleaseStatus::Succeeded.is_terminal());
        assert!(ReleaseStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReleaseStatus::Succeeded).unwrap(),
            "\"succeeded\""
        );
    }
}
