//! Service dimension table writes, used exclusively by the Service
//! Initializer.

use sla_monitor_core::ServiceConfig;
use sqlx::PgPool;

use crate::models::ServiceRow;
use crate::Result;

/// Reconciles one config entry into the `services` table: inserts a missing
/// row, updates `endpoint_url`/`updated_at` when the URL changed, and
/// otherwise leaves the row untouched. The `WHERE` clause on the conflict
/// update is what implements "otherwise leave it" without a prior read.
pub async fn upsert_service(pool: &PgPool, config: &ServiceConfig) -> Result<()> {
    sqlx::query(
        "INSERT INTO services (id, name, description, endpoint_url) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE SET \
           endpoint_url = excluded.endpoint_url, \
           name = excluded.name, \
           updated_at = now() \
         WHERE services.endpoint_url IS DISTINCT FROM excluded.endpoint_url",
    )
    .bind(&config.id)
    .bind(&config.name)
    .bind(&config.description)
    .bind(&config.url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Looked up by the Derived-View Readers to answer "does this service
/// exist" before running a window query against it.
pub async fn get_service(pool: &PgPool, id: &str) -> Result<Option<ServiceRow>> {
    let row = sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
