use std::time::Duration;

use thiserror::Error;

/// Stable error taxonomy shared by every crate in the probe core.
///
/// Every downstream crate's own error type converts into this one at its
/// public boundary. The variant a caller matches on is the "kind" from the
/// error handling design; the payload is for operators.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration invalid: {0:?}")]
    Config(Vec<String>),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("http error: status {status}")]
    Http { status: u16 },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("dispatcher error: {0}")]
    Dispatcher(String),

    #[error("cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for the one kind that aborts the process at startup; every
    /// other kind is recovered at its own boundary per the error handling
    /// design's propagation policy.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// True for cancellation, which is deliberately not logged as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
