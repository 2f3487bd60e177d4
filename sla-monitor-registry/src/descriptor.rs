//! Endpoint descriptor file parsing.
//!
//! The descriptor file is line-oriented `KEY=value`. The only keys this
//! reader gives special meaning to are `x-api-key=<hex>` and
//! `<SERVICE>_URL=<absolute-url>` for each recognized service id; everything
//! else is kept in the raw map but otherwise ignored.

use std::collections::HashMap;
use std::path::Path;

/// The parsed descriptor: a flat `KEY -> value` map plus the one key this
/// reader special-cases up front (`x-api-key`), matching the shape the spec
/// calls out (`{id, name, url, apiKey}` per recognized service, derived from
/// this map by the caller).
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    pub entries: HashMap<String, String>,
    pub api_key: Option<String>,
}

impl Descriptor {
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        let api_key = entries.get("x-api-key").cloned();

        Self { entries, api_key }
    }

    /// Reads and parses the descriptor file if it exists; an absent file is
    /// not an error — the registry simply falls back to environment
    /// variables and defaults for every service.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Looks up `<SERVICE>_URL` for a recognized service's env key prefix.
    pub fn url_for(&self, env_prefix: &str) -> Option<&str> {
        self.entries.get(&format!("{env_prefix}_URL")).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_keys_and_ignores_unknown_ones() {
        let descriptor = Descriptor::parse(
            "x-api-key=deadbeef\nID_RECOGNITION_URL=https://svc.example.com/check\nSOME_UNRELATED_KEY=value\n# a comment\n",
        );

        assert_eq!(descriptor.api_key.as_deref(), Some("deadbeef"));
        assert_eq!(
            descriptor.url_for("ID_RECOGNITION"),
            Some("https://svc.example.com/check")
        );
        assert_eq!(descriptor.entries.get("SOME_UNRELATED_KEY").map(String::as_str), Some("value"));
    }

    #[test]
    fn missing_file_yields_empty_descriptor() {
        let descriptor = Descriptor::load(Path::new("/nonexistent/endpoints.env")).unwrap();
        assert!(descriptor.entries.is_empty());
        assert!(descriptor.api_key.is_none());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let descriptor = Descriptor::parse("\n\nx-api-key=abc\n\n");
        assert_eq!(descriptor.api_key.as_deref(), Some("abc"));
    }
}
