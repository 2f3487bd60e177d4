//! Shared query helpers used by more than one reader.

use chrono::NaiveDate;
use sla_monitor_core::UptimeBucket;
use sla_monitor_storage::models::DailyUptimeBucketRow;
use sqlx::PgPool;

use crate::error::{Error, Result};

pub async fn service_exists(pool: &PgPool, service_id: &str) -> Result<bool> {
    let service = sla_monitor_storage::services::get_service(pool, service_id).await?;
    Ok(service.is_some())
}

pub async fn require_service(pool: &PgPool, service_id: &str) -> Result<()> {
    if service_exists(pool, service_id).await? {
        Ok(())
    } else {
        Err(Error::ServiceNotFound)
    }
}

/// One day's bucket, trimmed to what the readers need.
#[derive(Debug, Clone)]
pub struct BucketDay {
    pub day: NaiveDate,
    pub bucket: UptimeBucket,
}

/// Buckets for a service over `[start, end]` inclusive, ordered oldest
/// first — the shape every reader that walks a window wants.
pub async fn buckets_in_range(
    pool: &PgPool,
    service_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<BucketDay>> {
    let rows = sqlx::query_as::<_, DailyUptimeBucketRow>(
        "SELECT service_id, day, status, response_time_ms, error_message FROM daily_uptime_buckets \
         WHERE service_id = $1 AND day BETWEEN $2 AND $3 \
         ORDER BY day ASC",
    )
    .bind(service_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| UptimeBucket::from_code(&row.status).map(|bucket| BucketDay { day: row.day, bucket }))
        .collect())
}

/// Rounds to two decimal places, then applies the "nice number" rule: a
/// value at or above 99.95 is reported as the cleaner 99.99 rather than
/// something like 99.97.
pub fn nice_round_percentage(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded >= 99.95 { 99.99 } else { rounded }
}

/// The uptime percentage for a set of scored days: `None` scores (no
/// data / empty) are excluded from both the numerator and denominator.
pub fn score_percentage(buckets: &[BucketDay]) -> f64 {
    let mut total = 0.0;
    let mut counted = 0usize;

    for b in buckets {
        if let Some(score) = b.bucket.uptime_score() {
            total += score;
            counted += 1;
        }
    }

    if counted == 0 {
        0.0
    } else {
        nice_round_percentage(total / counted as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_round_bumps_near_perfect_scores_to_99_99() {
        assert_eq!(nice_round_percentage(99.96), 99.99);
        assert_eq!(nice_round_percentage(99.95), 99.99);
    }

    #[test]
    fn nice_round_leaves_lower_scores_alone() {
        assert_eq!(nice_round_percentage(98.123), 98.12);
        assert_eq!(nice_round_percentage(75.0), 75.0);
    }

    #[test]
    fn score_percentage_excludes_no_data_days() {
        let buckets = vec![
            BucketDay { day: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(), bucket: UptimeBucket::Operational },
            BucketDay { day: NaiveDate::from_ymd_opt(2026, 7, 2).unwrap(), bucket: UptimeBucket::NoData },
            BucketDay { day: NaiveDate::from_ymd_opt(2026, 7, 3).unwrap(), bucket: UptimeBucket::MajorOutage },
        ];
        assert_eq!(score_percentage(&buckets), 50.0);
    }

    #[test]
    fn score_percentage_is_zero_for_empty_window() {
        assert_eq!(score_percentage(&[]), 0.0);
    }
}
