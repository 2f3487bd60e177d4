//! `trend`

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::support::{buckets_in_range, require_service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub delta_percentage: f64,
    pub weekly_averages: Vec<f64>,
    pub daily_uptimes: Vec<f64>,
}

/// Splits the window into weekly averages (chronological 7-day chunks),
/// then classifies the direction from the mean of the first half of weeks
/// versus the second half: `improving` if the delta exceeds +0.5, `declining`
/// below -0.5, `stable` otherwise. A window with fewer than two weeks of
/// data has nothing to compare and is always `stable`.
pub async fn trend(pool: &PgPool, service_id: &str, days: i64) -> Result<Trend> {
    require_service(pool, service_id).await?;

    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days.max(1) - 1);

    let buckets = buckets_in_range(pool, service_id, start, end).await?;
    let daily_uptimes: Vec<f64> = buckets
        .iter()
        .filter_map(|b| b.bucket.uptime_score().map(|s| s * 100.0))
        .collect();

    let weekly_averages: Vec<f64> = daily_uptimes.chunks(7).map(mean).collect();

    if weekly_averages.len() < 2 {
        return Ok(Trend {
            direction: TrendDirection::Stable,
            delta_percentage: 0.0,
            weekly_averages,
            daily_uptimes,
        });
    }

    let split = weekly_averages.len() / 2;
    let first_half_mean = mean(&weekly_averages[..split]);
    let second_half_mean = mean(&weekly_averages[split..]);
    let delta = second_half_mean - first_half_mean;

    let direction = if delta > 0.5 {
        TrendDirection::Improving
    } else if delta < -0.5 {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    Ok(Trend {
        direction,
        delta_percentage: delta,
        weekly_averages,
        daily_uptimes,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_improving_when_second_half_is_meaningfully_higher() {
        let weekly_averages = vec![90.0, 91.0, 99.0, 99.5];
        let split = weekly_averages.len() / 2;
        let delta = mean(&weekly_averages[split..]) - mean(&weekly_averages[..split]);
        assert!(delta > 0.5);
    }

    #[test]
    fn classifies_stable_within_the_half_percent_band() {
        let weekly_averages = vec![99.0, 99.2, 99.3, 99.1];
        let split = weekly_averages.len() / 2;
        let delta = mean(&weekly_averages[split..]) - mean(&weekly_averages[..split]);
        assert!(delta.abs() <= 0.5);
    }

    #[test]
    fn mean_of_empty_slice_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
