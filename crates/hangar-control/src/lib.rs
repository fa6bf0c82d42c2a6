//! Hangar Control - Control-plane client seam
//!
//! The preflight pipeline never talks to the platform directly. Every
//! remote read and write goes through [`ControlPlaneClient`], bound to one
//! application by a [`ControlPlaneSession`].
//!
//! ## In-Memory vs Remote
//!
//! [`InMemoryControlPlane`] is suitable for development, tests and dry runs
//! against a recorded [`ControlPlaneSnapshot`]. A remote client implements
//! the same trait; transport, authentication and retries are its concern.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod error;
pub mod memory;
pub mod session;

// Re-exports
pub use client::{ControlPlaneClient, MachineListing};
pub use error::{ControlPlaneError, Result};
pub use memory::{CallCounts, ControlPlaneSnapshot, InMemoryControlPlane, Operation};
pub use session::ControlPlaneSession;
