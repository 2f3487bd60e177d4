//! Endpoint Registry
//!
//! Resolves the list of monitored services and their probe parameters from
//! an on-disk endpoint descriptor file plus environment overrides, and
//! validates the result before anything else in the process starts.

pub mod defaults;
pub mod descriptor;
pub mod env;
pub mod validate;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use sla_monitor_core::{Error, Result, ServiceConfig};
use tracing::debug;

use defaults::{
    DEFAULT_AUTH_HEADER, DEFAULT_AUTO_DETECTION_TIMEOUT, DEFAULT_CYCLE_INTERVAL, DEFAULT_RETRIES,
    DEFAULT_RETRY_BASE_DELAY, DEFAULT_SLA_TARGET, DEFAULT_TIMEOUT, RECOGNIZED_SERVICES,
};
use descriptor::Descriptor;

/// Process-wide settings that sit alongside the resolved service list:
/// everything in §6's environment variable table that is not itself a
/// per-service probe parameter.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database_url: String,
    pub port: u16,
    pub node_env: String,
    pub cycle_interval: Duration,
    pub alert_on_failure: bool,
    pub log_level: String,
    pub log_file: Option<String>,
    pub sla_target: f64,
    pub auto_detection: AutoDetectionConfig,
}

#[derive(Debug, Clone)]
pub struct AutoDetectionConfig {
    pub enabled: bool,
    pub monitor_api_url: Option<String>,
    pub timeout: Duration,
}

/// Output of `EndpointRegistry::load`: the validated service list plus the
/// process-wide settings derived alongside it.
pub struct LoadedRegistry {
    pub services: Vec<ServiceConfig>,
    pub config: RegistryConfig,
}

pub struct EndpointRegistry;

impl EndpointRegistry {
    /// Resolution order: descriptor file, then per-service environment
    /// variables, then hardcoded defaults. Fails fast with every validation
    /// problem aggregated into one `Error::Config`.
    pub fn load(descriptor_path: &Path) -> Result<LoadedRegistry> {
        let descriptor = Descriptor::load(descriptor_path).map_err(Error::Io)?;

        let cycle_interval = env::duration_ms("MONITORING_INTERVAL").unwrap_or(DEFAULT_CYCLE_INTERVAL);
        let request_timeout = env::duration_ms("REQUEST_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT);
        let max_retries = env::u32("MAX_RETRIES").unwrap_or(DEFAULT_RETRIES);
        let retry_delay = env::duration_ms("RETRY_DELAY").unwrap_or(DEFAULT_RETRY_BASE_DELAY);
        let auth_header = env::string("SERVICE_AUTH_HEADER").unwrap_or_else(|| DEFAULT_AUTH_HEADER.to_string());
        let api_key = env::string("SERVICE_API_KEY").or_else(|| descriptor.api_key.clone());

        let services: Vec<ServiceConfig> = RECOGNIZED_SERVICES
            .iter()
            .map(|recognized| {
                let url = descriptor
                    .url_for(recognized.env_prefix)
                    .map(str::to_string)
                    .map(|url| {
                        debug!(service = recognized.id, %url, "url resolved from descriptor file");
                        url
                    })
                    .or_else(|| {
                        env::string(&format!("{}_URL", recognized.env_prefix)).map(|url| {
                            debug!(service = recognized.id, %url, "url resolved from environment override");
                            url
                        })
                    })
                    .unwrap_or_else(|| {
                        debug!(service = recognized.id, url = recognized.default_url, "url falling back to default");
                        recognized.default_url.to_string()
                    });

                let mut headers = HashMap::new();
                if let Some(api_key) = &api_key {
                    headers.insert(auth_header.clone(), api_key.clone());
                }

                ServiceConfig {
                    id: recognized.id.to_string(),
                    name: recognized.name.to_string(),
                    description: None,
                    url,
                    method: "GET".to_string(),
                    headers,
                    expected_statuses: vec![200],
                    timeout: request_timeout,
                    retries: max_retries,
                    retry_base_delay: retry_delay,
                    body: None,
                }
            })
            .collect();

        validate::validate(&services, cycle_interval)?;

        let database_url = env::string("DATABASE_URL")
            .ok_or_else(|| Error::Config(vec!["DATABASE_URL is required".to_string()]))?;

        let config = RegistryConfig {
            database_url,
            port: env::u32("PORT").map(|p| p as u16).unwrap_or(8080),
            node_env: env::string("NODE_ENV").unwrap_or_else(|| "development".to_string()),
            cycle_interval,
            alert_on_failure: env::bool("ALERT_ON_FAILURE").unwrap_or(false),
            log_level: env::string("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: env::string("LOG_FILE"),
            sla_target: env::f64("SLA_TARGET").unwrap_or(DEFAULT_SLA_TARGET),
            auto_detection: AutoDetectionConfig {
                enabled: env::bool("ENABLE_AUTO_INCIDENT_DETECTION").unwrap_or(false),
                monitor_api_url: env::string("MONITOR_API_URL"),
                timeout: env::duration_ms("AUTO_DETECTION_TIMEOUT").unwrap_or(DEFAULT_AUTO_DETECTION_TIMEOUT),
            },
        };

        Ok(LoadedRegistry { services, config })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;

    // Environment variables are process-global; serialize the tests that
    // touch them so they don't race each other under `cargo test`'s
    // default multi-threaded runner.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn load_falls_back_to_defaults_with_no_descriptor_or_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("DATABASE_URL", "postgres://localhost/sla_monitor_test");
        }

        let loaded = EndpointRegistry::load(Path::new("/nonexistent/endpoints.env")).unwrap();
        assert_eq!(loaded.services.len(), RECOGNIZED_SERVICES.len());
        assert_eq!(loaded.config.cycle_interval, DEFAULT_CYCLE_INTERVAL);

        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
    }

    #[test]
    fn load_fails_without_database_url() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
        let result = EndpointRegistry::load(Path::new("/nonexistent/endpoints.env"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn load_reads_descriptor_file_url_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("DATABASE_URL", "postgres://localhost/sla_monitor_test");
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ID_RECOGNITION_URL=https://override.example.com/health").unwrap();

        let loaded = EndpointRegistry::load(file.path()).unwrap();
        let id_recognition = loaded.services.iter().find(|s| s.id == "id-recognition").unwrap();
        assert_eq!(id_recognition.url, "https://override.example.com/health");

        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
    }
}
