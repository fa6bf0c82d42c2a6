//! Lease timing
//!
//! The execution engine holds a lease on each machine it mutates and renews
//! it every `lease_delay_between`. Nothing here acquires a lease.

use std::time::Duration;
use tracing::info;

/// Default time to wait for a machine to reach its target state
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default lease lifetime
pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(13);

/// Resolved wait and lease timeouts
///
/// The renewal delay is always derived from the lease timeout, so the two
/// cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseTiming {
    wait_timeout: Duration,
    lease_timeout: Duration,
}

impl Default for LeaseTiming {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
        }
    }
}

impl LeaseTiming {
    /// Resolve overrides; zero or absent values fall back to the defaults
    pub fn resolve(wait_timeout: Option<Duration>, lease_timeout: Option<Duration>) -> Self {
        let timing = Self {
            wait_timeout: non_zero_or(wait_timeout, DEFAULT_WAIT_TIMEOUT),
            lease_timeout: non_zero_or(lease_timeout, DEFAULT_LEASE_TIMEOUT),
        };

        if timing != Self::default() {
            info!(
                wait_timeout = %humantime::format_duration(timing.wait_timeout),
                lease_timeout = %humantime::format_duration(timing.lease_timeout),
                lease_delay_between = %humantime::format_duration(timing.lease_delay_between()),
                "Using custom machine timeouts"
            );
        }
        timing
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn lease_timeout(&self) -> Duration {
        self.lease_timeout
    }

    /// `(lease_timeout - 1s) / 3`, zero for leases of a second or less
    pub fn lease_delay_between(&self) -> Duration {
        self.lease_timeout.saturating_sub(Duration::from_secs(1)) / 3
    }
}

fn non_zero_or(value: Option<Duration>, default: Duration) -> Duration {
    value.filter(|d| !d.is_zero()).unwrap_or(default)
}
