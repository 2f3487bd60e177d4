//! Service Initializer
//!
//! Runs once at startup, before the first cycle: reconciles the Endpoint
//! Registry into the `services` dimension table. Never deletes a service
//! that disappeared from config — time-series rows may still reference it.

use sla_monitor_core::{Result, ServiceConfig};
use sqlx::PgPool;
use tracing::info;

pub async fn initialize(pool: &PgPool, services: &[ServiceConfig]) -> Result<()> {
    for service in services {
        sla_monitor_storage::services::upsert_service(pool, service).await?;
        info!(service_id = %service.id, url = %service.url, "reconciled service into dimension table");
    }

    Ok(())
}
