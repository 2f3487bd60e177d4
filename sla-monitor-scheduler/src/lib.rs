//! Cycle Scheduler, Service Initializer, and Maintenance Loop
//!
//! The orchestration crate: owns the cancellation token and wires the
//! prober, storage, and dispatcher crates together into one long-lived
//! `Core`. Singletons from the source (database handle, prober, scheduler)
//! become explicit fields here, constructed once at startup and passed
//! down — nothing in this crate reaches for a `getInstance()`-style global.

pub mod cycle;
pub mod initializer;
pub mod maintenance;

use std::sync::Arc;
use std::time::Duration;

use sla_monitor_core::{Error, MonitoringSession, Result, ServiceConfig};
use sla_monitor_dispatcher::{Dispatcher, DispatcherConfig};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cycle::CycleScheduler;

/// Everything the scheduler needs that isn't itself a `ServiceConfig`:
/// the probe cycle interval, the maintenance interval, and the dispatcher
/// configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub cycle_interval: Duration,
    pub maintenance_interval: Duration,
    pub dispatcher: DispatcherConfig,
}

/// The process-wide orchestrator: owns the database pool, the resolved
/// service list, the scheduler, and the cancellation token for cooperative
/// shutdown. Constructed once at startup.
pub struct Core {
    pool: PgPool,
    scheduler: Arc<CycleScheduler>,
    maintenance_interval: Duration,
    cancel: CancellationToken,
}

impl Core {
    /// Reconciles the service dimension table, then builds the scheduler
    /// and dispatcher. Does not start any background loop — call `run` for
    /// that.
    pub async fn bootstrap(pool: PgPool, services: Vec<ServiceConfig>, config: CoreConfig) -> Result<Self> {
        initializer::initialize(&pool, &services).await?;

        let cancel = CancellationToken::new();
        let dispatcher = Arc::new(Dispatcher::new(config.dispatcher));
        let scheduler = Arc::new(CycleScheduler::new(
            services,
            pool.clone(),
            dispatcher,
            config.cycle_interval,
            cancel.clone(),
        ));

        Ok(Self {
            pool,
            scheduler,
            maintenance_interval: config.maintenance_interval,
            cancel,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Probes one service outside the regular cycle — the "single-service
    /// probe" path §4.6 distinguishes from a full cycle.
    pub async fn probe_service(&self, service: &ServiceConfig) -> sla_monitor_core::ProbeResult {
        self.scheduler.probe_single(service).await
    }

    pub async fn run_cycle_once(&self) -> MonitoringSession {
        self.scheduler.run_cycle().await
    }

    /// Drives the cycle scheduler and the maintenance loop for the
    /// lifetime of the process, until `shutdown` cancels the shared token.
    /// Both loops run as independent tasks and are joined here so a panic
    /// in one surfaces rather than silently stopping the other.
    pub async fn run(&self) -> Result<()> {
        let scheduler = Arc::clone(&self.scheduler);
        let cycle_task = tokio::spawn(async move { scheduler.run().await });

        let pool = self.pool.clone();
        let maintenance_interval = self.maintenance_interval;
        let cancel = self.cancel.clone();
        let maintenance_task =
            tokio::spawn(async move { maintenance::run(pool, maintenance_interval, cancel).await });

        let (cycle_result, maintenance_result) = tokio::join!(cycle_task, maintenance_task);
        cycle_result.map_err(|e| Error::Transport(format!("cycle scheduler task panicked: {e}")))?;
        maintenance_result.map_err(|e| Error::Transport(format!("maintenance loop task panicked: {e}")))?;

        info!("core shut down cleanly");
        Ok(())
    }

    /// Cancels the shared token; in-flight probes and maintenance steps
    /// observe it on their next suspension point and unwind.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
