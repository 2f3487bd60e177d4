//! Row types mirroring the persisted tables this crate and its readers
//! actually map into Rust. Kept distinct from `sla_monitor_core` types
//! because a row carries storage concerns (e.g. a generated `id`) the
//! in-memory domain types don't. Only tables with a real `query_as`
//! consumer get a row type here — `check_logs` and `response_time_samples`
//! are read through hand-rolled aggregate queries instead (`sla-monitor-
//! reader::sla`, `::rebuild`), so they have no row struct to keep in sync.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub endpoint_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyUptimeBucketRow {
    pub service_id: String,
    pub day: NaiveDate,
    pub status: String,
    pub response_time_ms: Option<i64>,
    pub error_message: Option<String>,
}
