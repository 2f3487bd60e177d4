//! Derived-View Readers
//!
//! Pure read paths over the tables `sla-monitor-storage` writes:
//! `service_uptime_percentage`, `monthly_grid`, `sla_compliance`, `trend`,
//! and `system_status_snapshot`. No reader in this crate ever writes — that
//! ownership rule is enforced by never importing a mutating query from
//! `sla-monitor-storage` in the first place.

mod error;
mod monthly;
mod sla;
mod status;
mod support;
mod trend;
mod uptime;

pub use error::{Error, Result};
pub use monthly::{monthly_grid, MonthlyGridEntry};
pub use sla::{sla_compliance, SlaCompliance};
pub use status::system_status_snapshot;
pub use trend::{trend, Trend, TrendDirection};
pub use uptime::service_uptime_percentage;
