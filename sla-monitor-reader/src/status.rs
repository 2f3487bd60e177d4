//! `system_status_snapshot`

use sla_monitor_core::{SystemStatus, UptimeBucket};
use sqlx::{PgPool, Row};

use crate::error::Result;

/// Reduces the latest per-service `DailyUptimeBucket` to a single
/// registry-wide status: any `mo` wins outage, else any `po` wins
/// degraded, else operational. A pure function of what's currently
/// persisted — called on demand, never cached, matching §8's "pure
/// function of the current per-service latest DailyUptimeBucket."
pub async fn system_status_snapshot(pool: &PgPool) -> Result<SystemStatus> {
    let rows = sqlx::query(
        "SELECT DISTINCT ON (service_id) service_id, status \
         FROM daily_uptime_buckets \
         ORDER BY service_id, day DESC",
    )
    .fetch_all(pool)
    .await?;

    let buckets = rows
        .into_iter()
        .filter_map(|row| {
            let status: String = row.try_get("status").ok()?;
            UptimeBucket::from_code(&status)
        });

    Ok(SystemStatus::reduce(buckets))
}
