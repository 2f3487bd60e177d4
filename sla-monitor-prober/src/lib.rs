//! HTTP Prober + Classifier
//!
//! Performs one bounded-retry probe of one service and classifies the
//! resulting `ProbeResult` into an error taxonomy tag and a daily uptime
//! bucket. Stateless — the returned `reqwest::Client` is the only thing
//! worth sharing across calls, for connection pooling.

pub mod classifier;
mod probe;

pub use classifier::classify;
pub use probe::{build_client, probe};
