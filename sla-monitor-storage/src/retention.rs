//! Retention deletion.
//!
//! Each table's deletion is independent — a failure deleting one table must
//! not prevent the others from being cleaned up.

use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use tracing::warn;

pub const CHECK_LOG_RETENTION_DAYS: i64 = 30;
pub const RESPONSE_TIME_SAMPLE_RETENTION_DAYS: i64 = 30;
pub const DAILY_CALL_AGGREGATE_RETENTION_DAYS: i64 = 90;
pub const DAILY_UPTIME_BUCKET_RETENTION_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionReport {
    pub check_logs_deleted: Option<u64>,
    pub response_time_samples_deleted: Option<u64>,
    pub daily_call_aggregates_deleted: Option<u64>,
    pub daily_uptime_buckets_deleted: Option<u64>,
}

/// Runs every retention delete, logging and continuing past any individual
/// failure. `None` in the report marks a step that failed.
pub async fn delete_expired(pool: &PgPool) -> RetentionReport {
    let mut report = RetentionReport::default();

    let check_log_cutoff = Utc::now() - ChronoDuration::days(CHECK_LOG_RETENTION_DAYS);
    report.check_logs_deleted = run_delete(
        pool,
        "DELETE FROM check_logs WHERE check_time < $1",
        check_log_cutoff,
        "check_logs",
    )
    .await;

    let sample_cutoff = Utc::now() - ChronoDuration::days(RESPONSE_TIME_SAMPLE_RETENTION_DAYS);
    report.response_time_samples_deleted = run_delete(
        pool,
        "DELETE FROM response_time_samples WHERE sampled_at < $1",
        sample_cutoff,
        "response_time_samples",
    )
    .await;

    let aggregate_cutoff = (Utc::now() - ChronoDuration::days(DAILY_CALL_AGGREGATE_RETENTION_DAYS)).date_naive();
    report.daily_call_aggregates_deleted = run_delete(
        pool,
        "DELETE FROM daily_call_aggregates WHERE day < $1",
        aggregate_cutoff,
        "daily_call_aggregates",
    )
    .await;

    let bucket_cutoff = (Utc::now() - ChronoDuration::days(DAILY_UPTIME_BUCKET_RETENTION_DAYS)).date_naive();
    report.daily_uptime_buckets_deleted = run_delete(
        pool,
        "DELETE FROM daily_uptime_buckets WHERE day < $1",
        bucket_cutoff,
        "daily_uptime_buckets",
    )
    .await;

    report
}

async fn run_delete<T>(pool: &PgPool, query: &str, cutoff: T, table: &str) -> Option<u64>
where
    T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send,
{
    match sqlx::query(query).bind(cutoff).execute(pool).await {
        Ok(result) => Some(result.rows_affected()),
        Err(e) => {
            warn!(table, error = %e, "retention delete failed, continuing with remaining steps");
            None
        }
    }
}
