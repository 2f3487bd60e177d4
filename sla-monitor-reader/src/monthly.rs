//! `monthly_grid`

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::support::{buckets_in_range, require_service, score_percentage};

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyGridEntry {
    pub year: i32,
    pub month: u32,
    pub uptime_percentage: f64,
    /// Per-day status codes (`o`/`po`/`mo`/`nd`) in calendar order,
    /// 1-indexed by day-of-month.
    pub days: Vec<String>,
}

/// Returns, for each of the last `months` months (anchored on today or
/// `anchor`, most recent month first), the per-day status sequence plus the
/// aggregate uptime% for that month.
pub async fn monthly_grid(
    pool: &PgPool,
    service_id: &str,
    months: u32,
    anchor: Option<NaiveDate>,
) -> Result<Vec<MonthlyGridEntry>> {
    require_service(pool, service_id).await?;

    let anchor = anchor.unwrap_or_else(|| Utc::now().date_naive());
    let mut entries = Vec::with_capacity(months as usize);

    for offset in 0..months {
        let (year, month) = month_minus(anchor.year(), anchor.month(), offset);
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first-of-month date");
        let days_in_month = days_in_month(year, month);
        let natural_last_day =
            NaiveDate::from_ymd_opt(year, month, days_in_month).expect("valid last-of-month date");
        let query_last_day = natural_last_day.min(anchor);

        let buckets = if query_last_day >= first_day {
            buckets_in_range(pool, service_id, first_day, query_last_day).await?
        } else {
            Vec::new()
        };

        let mut days = vec!["nd".to_string(); days_in_month as usize];
        for b in &buckets {
            let index = (b.day.day() - 1) as usize;
            if let Some(slot) = days.get_mut(index) {
                *slot = b.bucket.code().to_string();
            }
        }

        entries.push(MonthlyGridEntry {
            year,
            month,
            uptime_percentage: score_percentage(&buckets),
            days,
        });
    }

    Ok(entries)
}

fn month_minus(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let zero_indexed = (month - 1) as i64 - offset as i64;
    let year_delta = zero_indexed.div_euclid(12);
    let new_month = zero_indexed.rem_euclid(12) as u32 + 1;
    (year + year_delta as i32, new_month)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid next-month date");

    let this_month_first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid this-month date");
    (next_month_first - this_month_first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_minus_steps_back_within_the_same_year() {
        assert_eq!(month_minus(2026, 7, 1), (2026, 6));
    }

    #[test]
    fn month_minus_rolls_over_the_year_boundary() {
        assert_eq!(month_minus(2026, 1, 1), (2025, 12));
        assert_eq!(month_minus(2026, 2, 3), (2025, 11));
    }

    #[test]
    fn days_in_month_handles_february_and_leap_years() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 1), 31);
    }
}
