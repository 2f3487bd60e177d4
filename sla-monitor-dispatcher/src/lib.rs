//! Auto-Detection Dispatcher
//!
//! Fires best-effort "analyze this service now" requests into the
//! (out-of-scope) Incident API after a cycle or a single-service probe.
//! Both entry points are fire-and-forget from the prober's perspective:
//! failures are logged and never propagated, following the same
//! bounded-timeout `reqwest` idiom the prober uses, minus retries — the
//! spec defines this path as not retried.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sourced from `ENABLE_AUTO_INCIDENT_DETECTION`, `MONITOR_API_URL`, and
/// `AUTO_DETECTION_TIMEOUT`. A disabled or url-less dispatcher makes both
/// methods a no-op rather than erroring — the feature is opt-in.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub enabled: bool,
    pub monitor_api_url: Option<String>,
    pub timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            monitor_api_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeSingleRequest<'a> {
    #[serde(rename = "serviceId")]
    service_id: &'a str,
    #[serde(rename = "latestCheckId", skip_serializing_if = "Option::is_none")]
    latest_check_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AnalyzeBatchRequest<'a> {
    #[serde(rename = "serviceIds")]
    service_ids: &'a [String],
}

pub struct Dispatcher {
    client: reqwest::Client,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// `POST {MONITOR_API_URL}/api/auto-detection/analyze` for one service,
    /// bounded by the configured timeout. Never returns an error — a
    /// failure is logged at `warn` and swallowed, per §4.6's "failures are
    /// logged but never propagated."
    pub async fn analyze_single(&self, service_id: &str, latest_check_id: Option<i64>) {
        let Some(base_url) = self.target_url("analyze") else {
            return;
        };
        if !self.config.enabled {
            return;
        }

        let body = AnalyzeSingleRequest {
            service_id,
            latest_check_id,
        };

        self.send(&base_url, &body, self.config.timeout).await;
    }

    /// `POST {MONITOR_API_URL}/api/auto-detection/batch-analyze`, bounded by
    /// double the configured timeout — a batch call naturally does more
    /// work on the Incident API's side.
    pub async fn analyze_batch(&self, service_ids: &[String]) {
        if service_ids.is_empty() {
            return;
        }

        let Some(base_url) = self.target_url("batch-analyze") else {
            return;
        };
        if !self.config.enabled {
            return;
        }

        let body = AnalyzeBatchRequest { service_ids };

        self.send(&base_url, &body, self.config.timeout * 2).await;
    }

    fn target_url(&self, suffix: &str) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        let base = self.config.monitor_api_url.as_deref()?;
        Some(format!("{}/api/auto-detection/{suffix}", base.trim_end_matches('/')))
    }

    /// The response schema is advisory — only HTTP 2xx-vs-other is checked,
    /// per §4.6. The body is never parsed.
    async fn send<B: Serialize>(&self, url: &str, body: &B, timeout: Duration) {
        let result = self
            .client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warn!(url, status = %response.status(), "auto-detection dispatch returned a non-2xx status");
            }
            Err(e) => {
                warn!(url, error = %e, "auto-detection dispatch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn disabled_dispatcher_never_sends_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(DispatcherConfig {
            enabled: false,
            monitor_api_url: Some(server.uri()),
            timeout: Duration::from_secs(1),
        });

        dispatcher.analyze_single("svc", None).await;
        dispatcher.analyze_batch(&["svc".to_string()]).await;
    }

    #[tokio::test]
    async fn analyze_single_posts_service_id_to_analyze_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auto-detection/analyze"))
            .and(body_json(serde_json::json!({"serviceId": "svc"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(DispatcherConfig {
            enabled: true,
            monitor_api_url: Some(server.uri()),
            timeout: Duration::from_secs(1),
        });

        dispatcher.analyze_single("svc", None).await;
    }

    #[tokio::test]
    async fn analyze_batch_posts_service_ids_to_batch_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auto-detection/batch-analyze"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(DispatcherConfig {
            enabled: true,
            monitor_api_url: Some(server.uri()),
            timeout: Duration::from_secs(1),
        });

        dispatcher.analyze_batch(&["svc-a".to_string(), "svc-b".to_string()]).await;
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(DispatcherConfig {
            enabled: true,
            monitor_api_url: Some(server.uri()),
            timeout: Duration::from_secs(1),
        });

        dispatcher.analyze_batch(&[]).await;
    }

    #[tokio::test]
    async fn server_error_is_swallowed_not_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auto-detection/analyze"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dispatcher = Dispatcher::new(DispatcherConfig {
            enabled: true,
            monitor_api_url: Some(server.uri()),
            timeout: Duration::from_secs(1),
        });

        dispatcher.analyze_single("svc", Some(42)).await;
    }
}
