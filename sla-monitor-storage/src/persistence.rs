//! The four-write probe-result transaction.
//!
//! `record_probe_result` is the only place a `ProbeResult` turns into rows.
//! The four writes happen in the mandated order inside one transaction —
//! either all four land or none do.

use chrono::Utc;
use sla_monitor_core::{ErrorType, ProbeResult, UptimeBucket};
use sqlx::PgPool;

use crate::Result;

pub async fn record_probe_result(
    pool: &PgPool,
    result: &ProbeResult,
    error_type: Option<ErrorType>,
    bucket: UptimeBucket,
) -> Result<()> {
    let is_success = error_type.is_none();
    let error_type_code = error_type.map(error_type_code);
    let day = result.timestamp.date_naive();

    let mut tx = pool.begin().await?;

    // 1. CheckLog
    sqlx::query(
        "INSERT INTO check_logs \
         (service_id, check_time, status_code, response_time_ms, is_success, error_message, error_type) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&result.service_id)
    .bind(result.timestamp)
    .bind(result.http_status as i32)
    .bind(result.response_time_ms as i64)
    .bind(is_success)
    .bind(&result.error)
    .bind(error_type_code)
    .execute(&mut *tx)
    .await?;

    // 2. ResponseTimeSample
    sqlx::query(
        "INSERT INTO response_time_samples \
         (service_id, endpoint, method, status_code, response_time_ms, sampled_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&result.service_id)
    .bind(&result.url)
    .bind(&result.method)
    .bind(result.http_status as i32)
    .bind(result.response_time_ms as i64)
    .bind(result.timestamp)
    .execute(&mut *tx)
    .await?;

    // 3. DailyCallAggregate — the running mean is recomputed server-side
    // from the row's own pre-increment total_calls, which is what makes the
    // upsert safe under concurrent writers without explicit row locking.
    let success_delta: i64 = if is_success { 1 } else { 0 };
    let error_delta: i64 = if is_success { 0 } else { 1 };
    let rt = result.response_time_ms as i64;

    sqlx::query(
        "INSERT INTO daily_call_aggregates \
         (service_id, day, total_calls, success_calls, error_calls, \
          avg_response_time_ms, max_response_time_ms, min_response_time_ms) \
         VALUES ($1, $2, 1, $3, $4, $5, $5, $5) \
         ON CONFLICT (service_id, day) DO UPDATE SET \
           total_calls = daily_call_aggregates.total_calls + 1, \
           success_calls = daily_call_aggregates.success_calls + $3, \
           error_calls = daily_call_aggregates.error_calls + $4, \
           avg_response_time_ms = round( \
             (COALESCE(daily_call_aggregates.avg_response_time_ms, 0) * daily_call_aggregates.total_calls + $5) \
             / (daily_call_aggregates.total_calls + 1)::double precision \
           ), \
           max_response_time_ms = GREATEST(daily_call_aggregates.max_response_time_ms, $5), \
           min_response_time_ms = LEAST(daily_call_aggregates.min_response_time_ms, $5)",
    )
    .bind(&result.service_id)
    .bind(day)
    .bind(success_delta)
    .bind(error_delta)
    .bind(rt)
    .execute(&mut *tx)
    .await?;

    // 4. DailyUptimeBucket — unconditional overwrite implements
    // last-writer-wins within the day.
    sqlx::query(
        "INSERT INTO daily_uptime_buckets (service_id, day, status, response_time_ms, error_message) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (service_id, day) DO UPDATE SET \
           status = excluded.status, \
           response_time_ms = excluded.response_time_ms, \
           error_message = excluded.error_message",
    )
    .bind(&result.service_id)
    .bind(day)
    .bind(bucket.code())
    .bind(rt)
    .bind(&result.error)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

fn error_type_code(error_type: ErrorType) -> &'static str {
    match error_type {
        ErrorType::Timeout => "timeout",
        ErrorType::ConnectionError => "connection_error",
        ErrorType::DnsError => "dns_error",
        ErrorType::HttpError => "http_error",
    }
}

/// Recorded-at time for the audit trail of `SystemStatus` snapshots; kept
/// separate from the four-write transaction since it is not part of the
/// per-result invariant.
pub async fn log_system_status(
    pool: &PgPool,
    overall_status: &str,
    message: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO system_status_log (recorded_at, overall_status, message) VALUES ($1, $2, $3)")
        .bind(Utc::now())
        .bind(overall_status)
        .bind(message)
        .execute(pool)
        .await?;
    Ok(())
}
