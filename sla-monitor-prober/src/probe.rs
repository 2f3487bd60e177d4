//! HTTP Prober
//!
//! Performs one probe of one service with bounded timeout and bounded
//! retries with exponential backoff, generalizing the donor client crate's
//! `with_retry` shape: retry on transport failure or timeout, never on a
//! received HTTP response (the status code classifies the outcome, it never
//! drives another attempt).

use std::time::Duration;

use reqwest::{Client, Method};
use sla_monitor_core::{ProbeResult, ProbeStatus, ServiceConfig, USER_AGENT};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Performs up to `retries + 1` attempts against `config`, sleeping
/// `base_delay * 2^(attempt-1)` between failed attempts. `response_time_ms`
/// is the total wall-clock from the first attempt's dispatch to whichever
/// attempt produced the terminal result, including any backoff sleeps in
/// between — not the configured timeout value alone.
pub async fn probe(client: &Client, config: &ServiceConfig, cancel: &CancellationToken) -> ProbeResult {
    let start = tokio::time::Instant::now();
    let max_attempts = config.retries + 1;
    let mut attempts_used = 0;
    let mut last_error: Option<AttemptError> = None;

    for attempt in 1..=max_attempts {
        attempts_used = attempt;

        if cancel.is_cancelled() {
            return cancelled_result(config, start, attempts_used);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = attempt_once(client, config) => Some(r),
        };

        match outcome {
            None => return cancelled_result(config, start, attempts_used),
            Some(Ok(status_code)) => {
                debug!(service = %config.id, attempt, status_code, "probe attempt produced a response");
                return result_from_response(config, status_code, start, attempts_used);
            }
            Some(Err(e)) => {
                warn!(service = %config.id, attempt, error = %e, "probe attempt failed");
                last_error = Some(e);

                if attempt < max_attempts {
                    let backoff = config.retry_base_delay * 2u32.pow(attempt - 1);
                    tokio::select! {
                        _ = cancel.cancelled() => return cancelled_result(config, start, attempts_used),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    down_result(config, start, attempts_used, last_error)
}

/// Dispatches one HTTP attempt, bounded by the service's configured
/// timeout. Any status code at all — including 4xx/5xx — is `Ok`: a
/// received response is never a retry signal.
async fn attempt_once(client: &Client, config: &ServiceConfig) -> Result<u16, AttemptError> {
    let method = Method::from_bytes(config.method.as_bytes()).unwrap_or(Method::GET);

    let mut builder = client
        .request(method, &config.url)
        .timeout(config.timeout)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json");

    for (name, value) in &config.headers {
        builder = builder.header(name, value);
    }

    if let Some(body) = &config.body {
        builder = builder.json(body);
    }

    let response = builder.send().await.map_err(AttemptError::from)?;
    Ok(response.status().as_u16())
}

/// Transport-level failure, classified enough for the classifier to tag an
/// `error_type` without re-inspecting the underlying `reqwest::Error`.
#[derive(Debug)]
enum AttemptError {
    Timeout,
    Dns(String),
    Transport(String),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Timeout => write!(f, "request timed out"),
            AttemptError::Dns(msg) => write!(f, "dns resolution failed: {msg}"),
            AttemptError::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return AttemptError::Timeout;
        }

        let msg = e.to_string();
        if e.is_connect() && dns_failure(&msg) {
            return AttemptError::Dns(msg);
        }

        AttemptError::Transport(msg)
    }
}

fn dns_failure(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("dns") || lower.contains("name resolution") || lower.contains("lookup")
}

fn status_for(http_status: u16, expected: &[u16]) -> ProbeStatus {
    if expected.contains(&http_status) || http_status == 200 {
        ProbeStatus::Operational
    } else if (400..500).contains(&http_status) {
        ProbeStatus::Degraded
    } else if http_status >= 500 {
        ProbeStatus::Down
    } else {
        ProbeStatus::Operational
    }
}

fn result_from_response(
    config: &ServiceConfig,
    http_status: u16,
    start: tokio::time::Instant,
    attempts_used: u32,
) -> ProbeResult {
    let status = status_for(http_status, &config.expected_statuses);
    let error = if status == ProbeStatus::Down {
        Some(format!("http status {http_status}"))
    } else {
        None
    };

    ProbeResult {
        service_id: config.id.clone(),
        url: config.url.clone(),
        method: config.method.clone(),
        status,
        http_status,
        response_time_ms: elapsed_ms(start),
        timestamp: chrono::Utc::now(),
        error,
        attempts_used,
    }
}

fn down_result(
    config: &ServiceConfig,
    start: tokio::time::Instant,
    attempts_used: u32,
    last_error: Option<AttemptError>,
) -> ProbeResult {
    ProbeResult {
        service_id: config.id.clone(),
        url: config.url.clone(),
        method: config.method.clone(),
        status: ProbeStatus::Down,
        http_status: 0,
        response_time_ms: elapsed_ms(start),
        timestamp: chrono::Utc::now(),
        error: Some(last_error.map(|e| e.to_string()).unwrap_or_else(|| "no response received".to_string())),
        attempts_used,
    }
}

fn cancelled_result(config: &ServiceConfig, start: tokio::time::Instant, attempts_used: u32) -> ProbeResult {
    debug!(service = %config.id, attempts_used, "probe cancelled, not logged as a failure");

    ProbeResult {
        service_id: config.id.clone(),
        url: config.url.clone(),
        method: config.method.clone(),
        status: ProbeStatus::Down,
        http_status: 0,
        response_time_ms: elapsed_ms(start),
        timestamp: chrono::Utc::now(),
        error: Some("cancelled".to_string()),
        attempts_used,
    }
}

fn elapsed_ms(start: tokio::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Builds the shared `reqwest::Client` used across probes of every
/// registered service. One client, reused, so connection pooling works
/// across cycles — per §5's "prober is stateless per call" note, the client
/// itself carries no per-service state.
pub fn build_client() -> reqwest::Client {
    Client::builder()
        .build()
        .expect("failed to build the probe HTTP client")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(url: String, retries: u32, timeout: Duration) -> ServiceConfig {
        ServiceConfig {
            id: "svc".to_string(),
            name: "svc".to_string(),
            description: None,
            url,
            method: "GET".to_string(),
            headers: HashMap::new(),
            expected_statuses: vec![200],
            timeout,
            retries,
            retry_base_delay: Duration::from_millis(10),
            body: None,
        }
    }

    #[tokio::test]
    async fn successful_200_is_operational_with_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = build_client();
        let cfg = config(format!("{}/health", server.uri()), 3, Duration::from_secs(1));
        let result = probe(&client, &cfg, &CancellationToken::new()).await;

        assert_eq!(result.status, ProbeStatus::Operational);
        assert_eq!(result.http_status, 200);
        assert_eq!(result.attempts_used, 1);
    }

    #[tokio::test]
    async fn retries_zero_makes_exactly_one_attempt_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = build_client();
        let cfg = config(format!("{}/health", server.uri()), 0, Duration::from_secs(1));
        let result = probe(&client, &cfg, &CancellationToken::new()).await;

        assert_eq!(result.attempts_used, 1);
        assert_eq!(result.status, ProbeStatus::Down);
    }

    #[tokio::test]
    async fn no_response_after_retries_is_down_with_zero_http_status() {
        let client = build_client();
        let cfg = config("http://127.0.0.1:1".to_string(), 1, Duration::from_millis(200));
        let result = probe(&client, &cfg, &CancellationToken::new()).await;

        assert_eq!(result.status, ProbeStatus::Down);
        assert_eq!(result.http_status, 0);
        assert_eq!(result.attempts_used, 2);
    }

    #[tokio::test]
    async fn does_not_retry_on_a_received_4xx_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = build_client();
        let cfg = config(format!("{}/health", server.uri()), 3, Duration::from_secs(1));
        let result = probe(&client, &cfg, &CancellationToken::new()).await;

        assert_eq!(result.attempts_used, 1);
        assert_eq!(result.status, ProbeStatus::Degraded);
        assert_eq!(result.http_status, 400);
    }

    #[tokio::test]
    async fn cancellation_reports_down_with_cancelled_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = build_client();
        let cfg = config("http://127.0.0.1:9/health".to_string(), 3, Duration::from_secs(1));
        let result = probe(&client, &cfg, &cancel).await;

        assert_eq!(result.status, ProbeStatus::Down);
        assert_eq!(result.error.as_deref(), Some("cancelled"));
    }
}
