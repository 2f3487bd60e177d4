//! Idempotent daily aggregate rebuild, used by the maintenance loop's first
//! step. Running this twice for the same day produces the same row: the
//! aggregate is set from scratch from `response_time_samples`, not
//! incremented.

use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::Result;

/// Recomputes `daily_call_aggregates` for one `(service_id, day)` from
/// `response_time_samples`. A sample counts as successful when it carries a
/// real response (`status_code` between 1 and 399); `0` (no response at
/// all) or `>= 400` counts as an error, mirroring the classifier's own
/// success rule without needing a stored success flag.
pub async fn rebuild_daily_aggregate(pool: &PgPool, service_id: &str, day: NaiveDate) -> Result<()> {
    let row = sqlx::query(
        "SELECT \
           count(*) AS total, \
           count(*) FILTER (WHERE status_code > 0 AND status_code < 400) AS success, \
           count(*) FILTER (WHERE status_code = 0 OR status_code >= 400) AS error, \
           round(avg(response_time_ms)) AS avg_rt, \
           max(response_time_ms) AS max_rt, \
           min(response_time_ms) AS min_rt \
         FROM response_time_samples \
         WHERE service_id = $1 AND sampled_at::date = $2",
    )
    .bind(service_id)
    .bind(day)
    .fetch_one(pool)
    .await?;

    let total: i64 = row.try_get("total")?;
    let success: i64 = row.try_get("success")?;
    let error: i64 = row.try_get("error")?;
    let avg_rt: Option<f64> = row.try_get("avg_rt")?;
    let max_rt: Option<i64> = row.try_get("max_rt")?;
    let min_rt: Option<i64> = row.try_get("min_rt")?;

    sqlx::query(
        "INSERT INTO daily_call_aggregates \
         (service_id, day, total_calls, success_calls, error_calls, \
          avg_response_time_ms, max_response_time_ms, min_response_time_ms) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (service_id, day) DO UPDATE SET \
           total_calls = excluded.total_calls, \
           success_calls = excluded.success_calls, \
           error_calls = excluded.error_calls, \
           avg_response_time_ms = excluded.avg_response_time_ms, \
           max_response_time_ms = excluded.max_response_time_ms, \
           min_response_time_ms = excluded.min_response_time_ms",
    )
    .bind(service_id)
    .bind(day)
    .bind(total)
    .bind(success)
    .bind(error)
    .bind(avg_rt)
    .bind(max_rt)
    .bind(min_rt)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns every `service_id` with at least one sample on the given day, so
/// the maintenance loop can rebuild each one's aggregate.
pub async fn services_with_samples_on(pool: &PgPool, day: NaiveDate) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT DISTINCT service_id FROM response_time_samples WHERE sampled_at::date = $1")
        .bind(day)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.get("service_id")).collect())
}
