//! `hangar preflight` - validate a deployment against a recorded fleet snapshot

use crate::config::CliConfig;
use crate::output::{self, OutputFormat};
use anyhow::Context;
use clap::Args;
use hangar_control::{ControlPlaneSnapshot, InMemoryControlPlane};
use hangar_deploy::{DeploymentArgs, DeploymentPlanner};
use hangar_types::AppConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Preflight arguments
#[derive(Debug, Args)]
pub struct PreflightArgs {
    /// Application configuration (TOML)
    #[arg(long, value_name = "PATH")]
    pub app_config: PathBuf,

    /// Recorded control-plane state (JSON)
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,

    /// Image to deploy
    #[arg(short, long)]
    pub image: Option<String>,

    /// Rollout strategy (rolling, immediate)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Environment override, KEY=VALUE (repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Primary region override
    #[arg(long)]
    pub region: Option<String>,

    /// Application name override
    #[arg(long)]
    pub app: Option<String>,

    /// Machine size, e.g. shared-cpu-2x
    #[arg(long)]
    pub vm_size: Option<String>,

    /// Time to wait for a machine to reach its target state
    #[arg(long, value_parser = humantime::parse_duration)]
    pub wait_timeout: Option<Duration>,

    /// Lease lifetime held on each machine
    #[arg(long, value_parser = humantime::parse_duration)]
    pub lease_timeout: Option<Duration>,

    /// Restart machines without changing their image
    #[arg(long)]
    pub restart_only: bool,

    /// Do not wait for health checks during the rollout
    #[arg(long)]
    pub skip_health_checks: bool,
}

/// Execute the preflight command
pub async fn execute(
    args: PreflightArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let app_config = load_app_config(&args.app_config)?;
    let snapshot = load_snapshot(&args.state)?;
    let app = snapshot
        .app
        .clone()
        .context("state snapshot does not name an app")?;
    debug!(app = %app.name, deployed = app.deployed, "Loaded state snapshot");

    let plane = Arc::new(InMemoryControlPlane::from_snapshot(snapshot)?);

    let deploy_args = DeploymentArgs {
        app: Some(app),
        image: args.image,
        strategy: args.strategy.or_else(|| config.defaults.strategy.clone()),
        env: args.env,
        primary_region: args.region,
        app_name: args.app,
        skip_health_checks: args.skip_health_checks,
        restart_only: args.restart_only,
        wait_timeout: match args.wait_timeout {
            Some(timeout) => Some(timeout),
            None => config.defaults.wait_timeout()?,
        },
        lease_timeout: match args.lease_timeout {
            Some(timeout) => Some(timeout),
            None => config.defaults.lease_timeout()?,
        },
        vm_size: args.vm_size.or_else(|| config.defaults.vm_size.clone()),
    };

    let plan = DeploymentPlanner::new(plane)
        .prepare(Some(app_config), deploy_args)
        .await?;

    output::print_summary(&plan.summary(), format)
}

fn load_app_config(path: &Path) -> anyhow::Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read app config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("cannot parse app config {}", path.display()))
}

fn load_snapshot(path: &Path) -> anyhow::Result<ControlPlaneSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read state {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("cannot parse state {}", path.display()))
}
