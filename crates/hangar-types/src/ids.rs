//! Strongly-typed identifiers for Hangar entities
//!
//! Identifiers are assigned by the platform, so they wrap opaque strings
//! rather than UUIDs. `generate` exists for in-memory backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a machine
    MachineId
);

string_id!(
    /// Unique identifier for a volume
    VolumeId
);

string_id!(
    /// Identifier the backend assigns to a release
    ReleaseId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(MachineId::generate(), MachineId::generate());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = VolumeId::new("vol_123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"vol_123\"");
        assert_eq!(id.to_string(), "vol_123");
    }
}
