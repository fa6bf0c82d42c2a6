//! Effective configuration resolution
//!
//! The ambient application configuration is passed in explicitly and merged
//! with the caller's overrides exactly once per plan.

use crate::args::DeploymentArgs;
use crate::error::{PreflightError, Result};
use hangar_types::AppConfig;
use std::collections::BTreeMap;
use tracing::debug;

/// Merges caller overrides into the ambient configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    env: Vec<String>,
    primary_region: Option<String>,
    app_name: Option<String>,
}

impl ConfigResolver {
    pub fn from_args(args: &DeploymentArgs) -> Self {
        Self {
            env: args.env.clone(),
            primary_region: args.primary_region.clone(),
            app_name: args.app_name.clone(),
        }
    }

    /// Produce the effective configuration
    ///
    /// Region and app-name overrides only apply when non-empty; they never
    /// clear an existing value.
    pub fn resolve(&self, ambient: Option<AppConfig>) -> Result<AppConfig> {
        let mut config = ambient.ok_or_else(|| {
            PreflightError::ContractViolation("no application configuration was supplied".into())
        })?;

        let overrides = parse_env_overrides(&self.env)?;
        if !overrides.is_empty() {
            debug!(count = overrides.len(), "Applying environment overrides");
            config.set_env_variables(overrides);
        }

        if let Some(region) = self.primary_region.as_deref().filter(|r| !r.is_empty()) {
            config.primary_region = region.to_string();
        }
        if let Some(name) = self.app_name.as_deref().filter(|n| !n.is_empty()) {
            config.app_name = name.to_string();
        }

        config
            .validate()
            .map_err(|e| PreflightError::ConfigValidation(e.to_string()))?;
        Ok(config)
    }
}

/// Parse `KEY=VALUE` tokens; the value may itself contain `=`
pub fn parse_env_overrides(tokens: &[String]) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                vars.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(PreflightError::ConfigValidation(format!(
                    "environment override '{}' must have the form KEY=VALUE",
                    token
                )));
            }
        }
    }
    Ok(vars)
}

/// Check that the release command splits into shell tokens
///
/// The command is never executed here.
pub fn validate_release_command(config: &AppConfig) -> Result<()> {
    let Some(command) = config.release_command() else {
        return Ok(());
    };

    match shlex::split(command) {
        Some(tokens) => {
            debug!(tokens = tokens.len(), "Release command parsed");
            Ok(())
        }
        None => Err(PreflightError::ConfigValidation(format!(
            "could not split release command '{}' into shell tokens",
            command
        ))),
    }
}
