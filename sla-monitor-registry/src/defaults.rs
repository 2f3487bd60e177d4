//! Defaults and the fixed set of recognized services.
//!
//! The set of monitored services is fixed at compile time (this is a probe
//! core for a known verification pipeline, not a dynamic service-discovery
//! system) — each entry names the stable `id` used as the `service_id` key
//! throughout persistence, its display name, and the env var prefix used to
//! look up `<PREFIX>_URL` overrides.

use std::time::Duration;

pub struct RecognizedService {
    pub id: &'static str,
    pub name: &'static str,
    pub env_prefix: &'static str,
    pub default_url: &'static str,
}

/// The verification services this deployment of the monitor watches.
pub const RECOGNIZED_SERVICES: &[RecognizedService] = &[
    RecognizedService {
        id: "id-recognition",
        name: "ID Recognition",
        env_prefix: "ID_RECOGNITION",
        default_url: "https://id-recognition.internal/health",
    },
    RecognizedService {
        id: "face-match",
        name: "Face Match",
        env_prefix: "FACE_MATCH",
        default_url: "https://face-match.internal/health",
    },
    RecognizedService {
        id: "liveness-check",
        name: "Liveness Check",
        env_prefix: "LIVENESS_CHECK",
        default_url: "https://liveness-check.internal/health",
    },
    RecognizedService {
        id: "document-ocr",
        name: "Document OCR",
        env_prefix: "DOCUMENT_OCR",
        default_url: "https://document-ocr.internal/health",
    },
    RecognizedService {
        id: "aml-screening",
        name: "AML Screening",
        env_prefix: "AML_SCREENING",
        default_url: "https://aml-screening.internal/health",
    },
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_AUTH_HEADER: &str = "x-api-key";
pub const MIN_CYCLE_INTERVAL: Duration = Duration::from_secs(10);
pub const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_SLA_TARGET: f64 = 99.9;
pub const DEFAULT_AUTO_DETECTION_TIMEOUT: Duration = Duration::from_secs(5);
