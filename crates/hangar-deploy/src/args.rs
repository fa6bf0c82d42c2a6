//! Caller-supplied deployment inputs

use hangar_types::AppHandle;
use std::time::Duration;

/// Inputs of one deploy command
///
/// Every field is optional from the pipeline's point of view; absent values
/// fall back to configuration or fixed defaults.
#[derive(Debug, Clone, Default)]
pub struct DeploymentArgs {
    /// Application being deployed
    pub app: Option<AppHandle>,

    /// Explicit image reference
    pub image: Option<String>,

    /// Explicit rollout strategy
    pub strategy: Option<String>,

    /// `KEY=VALUE` environment overrides
    pub env: Vec<String>,

    /// Primary region override
    pub primary_region: Option<String>,

    /// Application name override
    pub app_name: Option<String>,

    /// Passed through to the execution engine
    pub skip_health_checks: bool,

    /// Restart machines without changing their image
    pub restart_only: bool,

    /// Machine state wait override; zero or absent means the default
    pub wait_timeout: Option<Duration>,

    /// Lease lifetime override; zero or absent means the default
    pub lease_timeout: Option<Duration>,

    /// Guest size token, e.g. `shared-cpu-2x`
    pub vm_size: Option<String>,
}

impl DeploymentArgs {
    pub fn for_app(app: AppHandle) -> Self {
        Self {
            app: Some(app),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_env(mut self, token: impl Into<String>) -> Self {
        self.env.push(token.into());
        self
    }

    pub fn with_vm_size(mut self, size: impl Into<String>) -> Self {
        self.vm_size = Some(size.into());
        self
    }

    pub fn restart_only(mut self) -> Self {
        self.restart_only = true;
        self
    }

    /// Explicit image, treating an empty string as absent
    pub(crate) fn explicit_image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.is_empty())
    }
}
