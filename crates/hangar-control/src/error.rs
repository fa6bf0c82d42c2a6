//! Control-plane error types

use hangar_types::ReleaseId;
use thiserror::Error;

/// Control-plane errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    #[error("release not found: {0}")]
    ReleaseNotFound(ReleaseId),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("control plane unavailable: {0}")]
    Unavailable(String),
}

/// Result type for control-plane operations
pub type Result<T> = std::result::Result<T, ControlPlaneError>;
