//! `sla_compliance`

use chrono::Utc;
use serde::Serialize;
use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::support::{buckets_in_range, require_service, score_percentage};

#[derive(Debug, Clone, Serialize)]
pub struct SlaCompliance {
    pub compliant: bool,
    pub current_uptime: f64,
    pub downtime_minutes: f64,
    pub allowed_downtime_minutes: f64,
    pub breach_minutes: f64,
}

/// `total_minutes = days * 1440`; `allowed = total_minutes * (100 -
/// target) / 100`. `downtime_minutes` is estimated from the failed-check
/// count in `check_logs` when the window has samples (one minute per
/// failed check, the natural unit when probes run roughly once a minute);
/// otherwise it is recomputed from the coarser daily buckets.
pub async fn sla_compliance(pool: &PgPool, service_id: &str, target: f64, days: i64) -> Result<SlaCompliance> {
    require_service(pool, service_id).await?;

    let total_minutes = (days * 1440) as f64;
    let allowed_downtime_minutes = total_minutes * (100.0 - target) / 100.0;

    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days.max(1) - 1);
    let window_start = start.and_hms_opt(0, 0, 0).expect("midnight is a valid time");

    let row = sqlx::query(
        "SELECT count(*) AS total, count(*) FILTER (WHERE NOT is_success) AS failed \
         FROM check_logs WHERE service_id = $1 AND check_time >= $2",
    )
    .bind(service_id)
    .bind(window_start)
    .fetch_one(pool)
    .await?;

    let total_checks: i64 = row.try_get("total")?;
    let failed_checks: i64 = row.try_get("failed")?;

    let current_uptime = if total_checks == 0 {
        0.0
    } else {
        let buckets = buckets_in_range(pool, service_id, start, end).await?;
        score_percentage(&buckets)
    };

    let downtime_minutes = if total_checks > 0 {
        failed_checks as f64
    } else {
        let buckets = buckets_in_range(pool, service_id, start, end).await?;
        buckets
            .iter()
            .filter_map(|b| b.bucket.uptime_score())
            .map(|score| (1.0 - score) * 1440.0)
            .sum()
    };

    let breach_minutes = (downtime_minutes - allowed_downtime_minutes).max(0.0);
    let compliant = total_checks > 0 && current_uptime >= target && downtime_minutes <= allowed_downtime_minutes;

    Ok(SlaCompliance {
        compliant,
        current_uptime,
        downtime_minutes,
        allowed_downtime_minutes,
        breach_minutes,
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn allowed_downtime_for_thirty_days_at_99_9_percent_target() {
        let total_minutes = 30.0 * 1440.0;
        let allowed = total_minutes * (100.0 - 99.9) / 100.0;
        assert!((allowed - 43.2).abs() < 1e-9);
    }
}
