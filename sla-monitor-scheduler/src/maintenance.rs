//! Maintenance Loop
//!
//! Runs once per day (configurable, mainly for tests): rebuilds yesterday's
//! daily call aggregate from the raw samples, deletes everything past its
//! retention horizon, and emits a `SystemStatus` snapshot. Each step is
//! isolated — a failure in one never prevents the next from running.

use std::time::Duration;

use chrono::Utc;
use sla_monitor_storage::RetentionReport;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub rebuilt_services: usize,
    pub retention: RetentionReport,
    pub system_status: Option<String>,
}

/// Runs every maintenance step in order, logging and continuing past any
/// individual failure instead of aborting the remaining steps.
pub async fn run_once(pool: &PgPool) -> MaintenanceReport {
    let mut report = MaintenanceReport::default();
    let yesterday = (Utc::now() - chrono::Duration::days(1)).date_naive();

    // Step 1: rebuild yesterday's daily aggregate from raw samples.
    match sla_monitor_storage::services_with_samples_on(pool, yesterday).await {
        Ok(service_ids) => {
            for service_id in &service_ids {
                if let Err(e) = sla_monitor_storage::rebuild_daily_aggregate(pool, service_id, yesterday).await {
                    warn!(service_id, error = %e, "failed to rebuild daily aggregate, continuing with remaining services");
                } else {
                    report.rebuilt_services += 1;
                }
            }
        }
        Err(e) => error!(error = %e, "failed to list services with samples, skipping aggregate rebuild step"),
    }

    // Steps 2-4: retention deletion, one independently-fallible statement
    // per table.
    report.retention = sla_monitor_storage::delete_expired(pool).await;
    info!(
        check_logs = ?report.retention.check_logs_deleted,
        response_time_samples = ?report.retention.response_time_samples_deleted,
        daily_call_aggregates = ?report.retention.daily_call_aggregates_deleted,
        "retention deletion pass complete"
    );

    // Step 5: emit a SystemStatus snapshot.
    match sla_monitor_reader::system_status_snapshot(pool).await {
        Ok(status) => {
            let message = status.message.clone();
            if let Err(e) = sla_monitor_storage::log_system_status(
                pool,
                overall_status_code(&status),
                &message,
            )
            .await
            {
                warn!(error = %e, "failed to log system status snapshot");
            }
            report.system_status = Some(message);
        }
        Err(e) => error!(error = %e, "failed to compute system status snapshot"),
    }

    report
}

fn overall_status_code(status: &sla_monitor_core::SystemStatus) -> &'static str {
    match status.overall_status {
        sla_monitor_core::OverallStatus::Operational => "operational",
        sla_monitor_core::OverallStatus::Degraded => "degraded",
        sla_monitor_core::OverallStatus::Outage => "outage",
    }
}

/// Drives `run_once` on its own interval, independent of the probe cycle
/// interval, until cancelled.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("maintenance loop cancelled");
                return;
            }
            _ = ticker.tick() => {
                let report = run_once(&pool).await;
                info!(rebuilt = report.rebuilt_services, status = ?report.system_status, "maintenance pass complete");
            }
        }
    }
}
