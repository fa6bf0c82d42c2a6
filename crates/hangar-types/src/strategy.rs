//! Rollout strategies supported for machine deployments

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the execution engine replaces machines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloutStrategy {
    /// Replace machines one at a time, waiting for health between steps
    #[default]
    Rolling,
    /// Replace every machine at once
    Immediate,
}

/// Strategy name outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unsupported deployment strategy '{0}'; machine deployments support {names} strategies",
    names = RolloutStrategy::supported_names().join(" and ")
)]
pub struct UnsupportedStrategy(pub String);

impl RolloutStrategy {
    pub const ALL: [RolloutStrategy; 2] = [RolloutStrategy::Rolling, RolloutStrategy::Immediate];

    pub fn as_str(&self) -> &'static str {
        match self {
            RolloutStrategy::Rolling => "rolling",
            RolloutStrategy::Immediate => "immediate",
        }
    }

    /// Upper-case form recorded on the release ledger
    pub fn ledger_name(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    pub fn supported_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl FromStr for RolloutStrategy {
    type Err = UnsupportedStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnsupportedStrategy(s.to_string()))
    }
}

impl fmt::Display for RolloutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
