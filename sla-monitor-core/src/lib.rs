//! SLA Monitor Core
//!
//! Shared domain types and the error taxonomy for the probe-and-metrics
//! core: service configuration, probe results, classification outcomes,
//! monitoring sessions, and the system status snapshot.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Sent as the `User-Agent` header on every outgoing probe request.
pub const USER_AGENT: &str = "SLA-Monitor-Watch-Server/1.0";
