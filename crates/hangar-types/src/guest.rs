//! Guest sizing
//!
//! A size token such as `shared-cpu-2x` names a preset CPU/memory class.

use serde::{Deserialize, Serialize};
use std::fmt;

const SHARED_MEMORY_PER_CPU_MB: u32 = 256;
const PERFORMANCE_MEMORY_PER_CPU_MB: u32 = 2048;

/// CPU class of a guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuKind {
    Shared,
    Performance,
}

impl CpuKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CpuKind::Shared => "shared",
            CpuKind::Performance => "performance",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            CpuKind::Shared => "shared-cpu",
            CpuKind::Performance => "performance",
        }
    }

    fn supported_cpus(&self) -> &'static [u32] {
        match self {
            CpuKind::Shared => &[1, 2, 4, 8],
            CpuKind::Performance => &[1, 2, 4, 8, 16],
        }
    }

    fn memory_per_cpu_mb(&self) -> u32 {
        match self {
            CpuKind::Shared => SHARED_MEMORY_PER_CPU_MB,
            CpuKind::Performance => PERFORMANCE_MEMORY_PER_CPU_MB,
        }
    }
}

/// Normalized compute/memory specification of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSpec {
    pub cpu_kind: CpuKind,
    pub cpus: u32,
    pub memory_mb: u32,
}

/// Unrecognized size token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid machine size '{0}'; expected one of: {names}",
    names = GuestSpec::preset_names().join(", ")
)]
pub struct GuestSizeError(pub String);

impl GuestSpec {
    /// Resolve a preset size token
    pub fn from_size(token: &str) -> Result<Self, GuestSizeError> {
        for kind in [CpuKind::Shared, CpuKind::Performance] {
            let Some(rest) = token.strip_prefix(kind.prefix()) else {
                continue;
            };
            // Digits must match the preset spelling exactly: no sign, no padding
            let cpus = rest
                .strip_prefix('-')
                .and_then(|r| r.strip_suffix('x'))
                .and_then(|digits| {
                    kind.supported_cpus()
                        .iter()
                        .copied()
                        .find(|n| n.to_string() == digits)
                });

            if let Some(cpus) = cpus {
                return Ok(Self {
                    cpu_kind: kind,
                    cpus,
                    memory_mb: cpus * kind.memory_per_cpu_mb(),
                });
            }
        }
        Err(GuestSizeError(token.to_string()))
    }

    /// Every recognized size token
    pub fn preset_names() -> Vec<String> {
        [CpuKind::Shared, CpuKind::Performance]
            .iter()
            .flat_map(|kind| {
                kind.supported_cpus()
                    .iter()
                    .map(move |n| format!("{}-{}x", kind.prefix(), n))
            })
            .collect()
    }
}

impl fmt::Display for GuestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}x ({} MB)",
            self.cpu_kind.prefix(),
            self.cpus,
            self.memory_mb
        )
    }
}
