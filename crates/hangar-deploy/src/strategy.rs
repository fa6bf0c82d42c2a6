//! Rollout strategy selection

use crate::error::Result;
use hangar_types::{AppConfig, RolloutStrategy};

/// Resolve the strategy: explicit, then configured, then rolling
///
/// Empty strings count as absent. Names are matched exactly, so `Rolling`
/// is rejected like any other unsupported value.
pub fn resolve_strategy(explicit: Option<&str>, config: &AppConfig) -> Result<RolloutStrategy> {
    let requested = explicit
        .filter(|s| !s.is_empty())
        .or_else(|| config.deploy_strategy());

    match requested {
        Some(name) => Ok(name.parse::<RolloutStrategy>()?),
        None => Ok(RolloutStrategy::default()),
    }
}
