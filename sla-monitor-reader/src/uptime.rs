//! `service_uptime_percentage`

use chrono::Utc;
use sqlx::PgPool;

use crate::error::Result;
use crate::support::{buckets_in_range, require_service, score_percentage};

/// Uptime over the last `days` days, scored `o=1.0, po=0.75, mo=0.0`, with
/// `nd`/`e` days excluded from the denominator. Two-decimal rounding, with
/// the ≥99.95 → 99.99 "nice number" rule applied on top.
pub async fn service_uptime_percentage(pool: &PgPool, service_id: &str, days: i64) -> Result<f64> {
    require_service(pool, service_id).await?;

    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days.max(1) - 1);

    let buckets = buckets_in_range(pool, service_id, start, end).await?;
    Ok(score_percentage(&buckets))
}

#[cfg(test)]
mod tests {
    use sla_monitor_core::UptimeBucket;

    use crate::support::{score_percentage, BucketDay};
    use chrono::NaiveDate;

    #[test]
    fn all_operational_days_score_100() {
        let day = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let buckets = vec![
            BucketDay { day, bucket: UptimeBucket::Operational },
            BucketDay { day: day.succ_opt().unwrap(), bucket: UptimeBucket::Operational },
        ];
        assert_eq!(score_percentage(&buckets), 100.0);
    }

    #[test]
    fn mixed_partial_outage_scores_partial_credit() {
        let day = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let buckets = vec![
            BucketDay { day, bucket: UptimeBucket::Operational },
            BucketDay { day: day.succ_opt().unwrap(), bucket: UptimeBucket::PartialOutage },
        ];
        assert_eq!(score_percentage(&buckets), 87.5);
    }
}
