//! Persistence Layer
//!
//! Four write paths keyed on `service_id` — append-only check log,
//! append-only response-time log, per-day call aggregate, per-day uptime
//! bucket — plus retention deletion and the idempotent daily rebuild the
//! maintenance loop uses. Backed by PostgreSQL via `sqlx`.

mod error;
pub mod models;
mod persistence;
mod pool;
mod rebuild;
mod retention;
pub mod services;

pub use error::{Error, Result};
pub use persistence::{log_system_status, record_probe_result};
pub use pool::connect_and_migrate;
pub use rebuild::{rebuild_daily_aggregate, services_with_samples_on};
pub use retention::{delete_expired, RetentionReport};
