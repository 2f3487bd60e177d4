//! Domain types shared across the probe core.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved probe parameters for one monitored service, as produced by the
/// Endpoint Registry. Immutable after `load()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_expected_statuses")]
    pub expected_statuses: Vec<u16>,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    pub retries: u32,
    #[serde(with = "duration_millis")]
    pub retry_base_delay: Duration,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_expected_statuses() -> Vec<u16> {
    vec![200]
}

/// The operational status reported on the live `ProbeResult`. Distinct from
/// the coarser `UptimeBucket` — see the classifier's canonical 4xx rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Operational,
    Degraded,
    Down,
}

/// The error taxonomy tag attached to a `CheckLog` row, `null` when the
/// probe succeeded cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Timeout,
    ConnectionError,
    DnsError,
    HttpError,
}

/// The per-day coarse classification of a service's observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UptimeBucket {
    #[serde(rename = "o")]
    Operational,
    #[serde(rename = "po")]
    PartialOutage,
    #[serde(rename = "mo")]
    MajorOutage,
    #[serde(rename = "nd")]
    NoData,
    #[serde(rename = "e")]
    Empty,
}

impl UptimeBucket {
    /// Short code as persisted in `daily_uptime_buckets.status`.
    pub fn code(self) -> &'static str {
        match self {
            UptimeBucket::Operational => "o",
            UptimeBucket::PartialOutage => "po",
            UptimeBucket::MajorOutage => "mo",
            UptimeBucket::NoData => "nd",
            UptimeBucket::Empty => "e",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(UptimeBucket::Operational),
            "po" => Some(UptimeBucket::PartialOutage),
            "mo" => Some(UptimeBucket::MajorOutage),
            "nd" => Some(UptimeBucket::NoData),
            "e" => Some(UptimeBucket::Empty),
            _ => None,
        }
    }

    /// Score used by `service_uptime_percentage`; `None` means the day is
    /// excluded from the denominator.
    pub fn uptime_score(self) -> Option<f64> {
        match self {
            UptimeBucket::Operational => Some(1.0),
            UptimeBucket::PartialOutage => Some(0.75),
            UptimeBucket::MajorOutage => Some(0.0),
            UptimeBucket::NoData | UptimeBucket::Empty => None,
        }
    }
}

/// One completed probe, in-memory only — never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub service_id: String,
    pub url: String,
    pub method: String,
    pub status: ProbeStatus,
    /// 0 when no HTTP response was ever received.
    pub http_status: u16,
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
    pub attempts_used: u32,
}

/// Groups the results of one monitoring cycle for logging/metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSession {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub avg_response_time_ms: f64,
    pub results: Vec<ProbeResult>,
}

impl MonitoringSession {
    pub fn from_results(session_id: String, start_time: DateTime<Utc>, results: Vec<ProbeResult>) -> Self {
        let end_time = Utc::now();
        let total = results.len();
        let success = results
            .iter()
            .filter(|r| r.status == ProbeStatus::Operational)
            .count();
        let failed = total - success;
        let avg_response_time_ms = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.response_time_ms as f64).sum::<f64>() / total as f64
        };

        Self {
            session_id,
            start_time,
            end_time,
            total,
            success,
            failed,
            avg_response_time_ms,
            results,
        }
    }
}

/// Coarse, registry-wide health reduced from the latest per-service
/// `DailyUptimeBucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Operational,
    Degraded,
    Outage,
}

/// Snapshot emitted by the maintenance loop (and recomputable on demand by
/// `system_status_snapshot`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub overall_status: OverallStatus,
    pub message: String,
}

impl SystemStatus {
    /// Reduce a set of latest per-service buckets per §4.7 step 5: any `mo`
    /// wins outage, else any `po` wins degraded, else operational.
    pub fn reduce<I: IntoIterator<Item = UptimeBucket>>(buckets: I) -> Self {
        let mut any_major = false;
        let mut any_partial = false;
        for bucket in buckets {
            match bucket {
                UptimeBucket::MajorOutage => any_major = true,
                UptimeBucket::PartialOutage => any_partial = true,
                _ => {}
            }
        }

        if any_major {
            SystemStatus {
                overall_status: OverallStatus::Outage,
                message: "one or more services are in major outage".to_string(),
            }
        } else if any_partial {
            SystemStatus {
                overall_status: OverallStatus::Degraded,
                message: "one or more services report partial outage".to_string(),
            }
        } else {
            SystemStatus {
                overall_status: OverallStatus::Operational,
                message: "all services operational".to_string(),
            }
        }
    }
}

/// Dimension row for a monitored service, owned exclusively by the Service
/// Initializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub endpoint_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// (de)serializes a `Duration` as whole milliseconds, for config structs
/// that round-trip through JSON/TOML.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_status_reduces_to_outage_when_any_bucket_is_major() {
        let status = SystemStatus::reduce(vec![
            UptimeBucket::Operational,
            UptimeBucket::MajorOutage,
            UptimeBucket::PartialOutage,
        ]);
        assert_eq!(status.overall_status, OverallStatus::Outage);
    }

    #[test]
    fn system_status_reduces_to_degraded_when_only_partial_present() {
        let status = SystemStatus::reduce(vec![UptimeBucket::Operational, UptimeBucket::PartialOutage]);
        assert_eq!(status.overall_status, OverallStatus::Degraded);
    }

    #[test]
    fn system_status_reduces_to_operational_when_all_clear() {
        let status = SystemStatus::reduce(vec![UptimeBucket::Operational, UptimeBucket::Operational]);
        assert_eq!(status.overall_status, OverallStatus::Operational);
    }

    #[test]
    fn system_status_reduces_to_operational_on_empty_input() {
        let status = SystemStatus::reduce(std::iter::empty());
        assert_eq!(status.overall_status, OverallStatus::Operational);
    }

    #[test]
    fn uptime_bucket_round_trips_through_code() {
        for bucket in [
            UptimeBucket::Operational,
            UptimeBucket::PartialOutage,
            UptimeBucket::MajorOutage,
            UptimeBucket::NoData,
            UptimeBucket::Empty,
        ] {
            assert_eq!(UptimeBucket::from_code(bucket.code()), Some(bucket));
        }
    }
}
