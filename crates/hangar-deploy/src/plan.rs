//! Deployment plan construction
//!
//! A strict linear pipeline. Each stage feeds the next and the first failure
//! aborts construction, so a partial plan is never returned:
//!
//! `resolve config -> open session -> release-command syntax -> lease timing
//! -> strategy -> guest -> inventory -> volumes -> image -> first deploy ->
//! provisioning hook -> topology -> record release`
//!
//! Recording the release is the only externally visible side effect and the
//! last stage. Once a plan exists its release sits in `created` until the
//! execution engine calls [`DeploymentPlan::finalize`].

use crate::args::DeploymentArgs;
use crate::config::{validate_release_command, ConfigResolver};
use crate::error::{PreflightError, Result};
use crate::first_deploy::is_first_deploy;
use crate::guest::resolve_guest;
use crate::image::{resolve_image, ResolvedImage};
use crate::inventory::MachineInventory;
use crate::lease::LeaseTiming;
use crate::provision::{NoopProvisioner, ProvisionContext, ProvisionHook};
use crate::release::ReleaseRecorder;
use crate::strategy::resolve_strategy;
use crate::summary::{GroupSummary, PlanSummary};
use crate::topology::validate_topology;
use crate::volumes::VolumeReservations;
use hangar_control::{ControlPlaneClient, ControlPlaneSession};
use hangar_types::{
    AppConfig, AppHandle, GuestSpec, Release, ReleaseId, ReleaseStatus, RolloutStrategy, Volume,
};
use std::sync::Arc;
use tracing::{debug, debug_span, info, instrument};

/// Builds deployment plans against a control plane
pub struct DeploymentPlanner {
    client: Arc<dyn ControlPlaneClient>,
    provisioner: Arc<dyn ProvisionHook>,
}

impl DeploymentPlanner {
    /// Create a planner with the no-op provisioning hook
    pub fn new(client: Arc<dyn ControlPlaneClient>) -> Self {
        Self {
            client,
            provisioner: Arc::new(NoopProvisioner),
        }
    }

    pub fn with_provisioner(mut self, provisioner: Arc<dyn ProvisionHook>) -> Self {
        self.provisioner = provisioner;
        self
    }

    /// Run the preflight pipeline
    #[instrument(skip_all, fields(app = args.app.as_ref().map(|a| a.name.as_str()).unwrap_or("")))]
    pub async fn prepare(
        &self,
        ambient: Option<AppConfig>,
        args: DeploymentArgs,
    ) -> Result<DeploymentPlan> {
        let app = args.app.clone().ok_or_else(|| {
            PreflightError::ContractViolation("no application handle was supplied".into())
        })?;
        if args.restart_only && args.explicit_image().is_some() {
            return Err(PreflightError::ContractViolation(
                "a restart-only deploy cannot also change the image".into(),
            ));
        }

        let config = debug_span!("resolve_config")
            .in_scope(|| ConfigResolver::from_args(&args).resolve(ambient))?;

        let session = ControlPlaneSession::open(self.client.clone(), app.clone())
            .map_err(|e| PreflightError::ContractViolation(e.to_string()))?;

        debug_span!("release_command").in_scope(|| validate_release_command(&config))?;

        let lease = debug_span!("lease_timing")
            .in_scope(|| LeaseTiming::resolve(args.wait_timeout, args.lease_timeout));

        let strategy = debug_span!("strategy")
            .in_scope(|| resolve_strategy(args.strategy.as_deref(), &config))?;
        debug!(strategy = %strategy, "Strategy resolved");

        let guest = debug_span!("guest").in_scope(|| resolve_guest(args.vm_size.as_deref()))?;

        let inventory = MachineInventory::build(&session, &config).await?;
        let volumes = VolumeReservations::reconcile(&session, &config).await?;
        let image = resolve_image(args.explicit_image(), &session, &inventory).await?;
        debug!(image = %image.reference, source = %image.source, "Image resolved");

        let first_deploy = is_first_deploy(&app, &inventory);
        if first_deploy {
            self.run_provisioner(&session, &config, &image, &volumes).await?;
        }

        debug_span!("topology").in_scope(|| validate_topology(&config, &inventory, &volumes))?;

        let recorder = ReleaseRecorder::new(session);
        let release = recorder.create(&config, strategy, &image.reference).await?;

        info!(
            release_id = %release.id,
            version = release.version,
            machines = inventory.len(),
            first_deploy,
            "Deployment plan ready"
        );

        Ok(DeploymentPlan {
            app,
            config,
            image,
            strategy,
            guest,
            lease,
            inventory,
            volumes,
            first_deploy,
            skip_health_checks: args.skip_health_checks,
            restart_only: args.restart_only,
            release,
            recorder,
        })
    }

    #[instrument(skip_all, fields(hook = %self.provisioner.name()))]
    async fn run_provisioner(
        &self,
        session: &ControlPlaneSession,
        config: &AppConfig,
        image: &ResolvedImage,
        volumes: &VolumeReservations,
    ) -> Result<()> {
        let ctx = ProvisionContext {
            session,
            config,
            image: &image.reference,
            volumes,
        };
        self.provisioner
            .provision(&ctx)
            .await
            .map_err(|e| PreflightError::Provision {
                hook: self.provisioner.name().to_string(),
                reason: e.to_string(),
            })
    }
}

/// A validated, executable deployment plan
#[derive(Debug)]
pub struct DeploymentPlan {
    app: AppHandle,
    config: AppConfig,
    image: ResolvedImage,
    strategy: RolloutStrategy,
    guest: Option<GuestSpec>,
    lease: LeaseTiming,
    inventory: MachineInventory,
    volumes: VolumeReservations,
    first_deploy: bool,
    skip_health_checks: bool,
    restart_only: bool,
    release: Release,
    recorder: ReleaseRecorder,
}

impl DeploymentPlan {
    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    /// Effective configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn image(&self) -> &ResolvedImage {
        &self.image
    }

    pub fn strategy(&self) -> RolloutStrategy {
        self.strategy
    }

    /// Guest override; `None` keeps each machine's current guest
    pub fn guest(&self) -> Option<GuestSpec> {
        self.guest
    }

    pub fn lease(&self) -> LeaseTiming {
        self.lease
    }

    pub fn inventory(&self) -> &MachineInventory {
        &self.inventory
    }

    pub fn volumes(&self) -> &VolumeReservations {
        &self.volumes
    }

    pub fn is_first_deploy(&self) -> bool {
        self.first_deploy
    }

    pub fn skip_health_checks(&self) -> bool {
        self.skip_health_checks
    }

    pub fn restart_only(&self) -> bool {
        self.restart_only
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn release_id(&self) -> &ReleaseId {
        &self.release.id
    }

    pub fn release_version(&self) -> u64 {
        self.release.version
    }

    /// Reserve the volume a new machine of `group` should mount
    ///
    /// `None` when the group mounts nothing or no volume is left.
    pub fn reserve_volume_for(&self, group: &str) -> Result<Option<Volume>> {
        let group = self
            .config
            .flatten(group)
            .map_err(|e| PreflightError::ConfigValidation(e.to_string()))?;
        Ok(group
            .primary_mount()
            .and_then(|mount| self.volumes.reserve(&mount.source)))
    }

    /// Record the terminal status of the release after execution
    pub async fn finalize(&self, status: ReleaseStatus) -> Result<()> {
        self.recorder.update(&self.release.id, status).await
    }

    /// Serializable view of the plan
    pub fn summary(&self) -> PlanSummary {
        let groups = self
            .config
            .process_names()
            .into_iter()
            .map(|name| {
                let mount = self
                    .config
                    .flatten(&name)
                    .ok()
                    .and_then(|g| g.primary_mount().map(|m| m.source.clone()));
                let reservable = mount
                    .as_deref()
                    .map(|source| self.volumes.queue_len(source))
                    .unwrap_or(0);
                GroupSummary {
                    machines: self.inventory.in_group(&name).len(),
                    name,
                    mount,
                    reservable,
                }
            })
            .collect();

        PlanSummary {
            app: self.app.name.clone(),
            release_id: self.release.id.clone(),
            release_version: self.release.version,
            image: self.image.reference.clone(),
            image_source: self.image.source,
            strategy: self.strategy,
            guest: self.guest,
            wait_timeout: humantime::format_duration(self.lease.wait_timeout()).to_string(),
            lease_timeout: humantime::format_duration(self.lease.lease_timeout()).to_string(),
            lease_delay_between: humantime::format_duration(self.lease.lease_delay_between())
                .to_string(),
            first_deploy: self.first_deploy,
            skip_health_checks: self.skip_health_checks,
            restart_only: self.restart_only,
            groups,
            release_command_machine: self
                .inventory
                .release_command_machines()
                .first()
                .map(|m| m.id.clone()),
        }
    }
}
