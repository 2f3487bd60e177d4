use thiserror::Error;

/// The Derived-View Readers' own error type. Deliberately separate from
/// `sla_monitor_core::Error` — "service not found" is a read-path concern,
/// not one of the probe pipeline's error kinds from §7.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Service not found")]
    ServiceNotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sla_monitor_storage::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
