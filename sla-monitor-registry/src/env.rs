//! Environment variable overrides, read once at startup.

use std::time::Duration;

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

pub fn string(key: &str) -> Option<String> {
    var(key)
}

pub fn duration_ms(key: &str) -> Option<Duration> {
    var(key).and_then(|v| v.parse::<u64>().ok()).map(Duration::from_millis)
}

pub fn u32(key: &str) -> Option<u32> {
    var(key).and_then(|v| v.parse().ok())
}

pub fn f64(key: &str) -> Option<f64> {
    var(key).and_then(|v| v.parse().ok())
}

pub fn bool(key: &str) -> Option<bool> {
    var(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
