//! Process configuration read from the environment.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;

use search_sync_repository::config::{DEFAULT_SIGNING_REGION, DEFAULT_SIGNING_SERVICE};
use search_sync_repository::{SigningConfig, TransportConfig};

use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Settings for the `search-sync` process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub opensearch_url: String,
    pub signing_enabled: bool,
    pub signing_service: String,
    pub signing_region: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch endpoint (default: http://localhost:9200)
    /// - `OPENSEARCH_SIGNING`: `false`, `0`, `off` or `no` disables SigV4 signing (default: true)
    /// - `OPENSEARCH_SIGNING_SERVICE`: signing service identifier (default: es)
    /// - `OPENSEARCH_SIGNING_REGION`: signing region (default: us-east-1)
    /// - `LOG_FORMAT`: `json` for JSON log lines (default: text)
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - The settings
    /// * `Err(IndexingError)` - If a variable holds an invalid value
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let signing_enabled = match lookup("OPENSEARCH_SIGNING") {
            Some(value) => parse_flag("OPENSEARCH_SIGNING", &value)?,
            None => true,
        };

        Ok(Self {
            opensearch_url: read("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            signing_enabled,
            signing_service: read("OPENSEARCH_SIGNING_SERVICE", DEFAULT_SIGNING_SERVICE),
            signing_region: read("OPENSEARCH_SIGNING_REGION", DEFAULT_SIGNING_REGION),
            log_format: lookup("LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
        })
    }

    /// Transport configuration for the index client.
    pub fn transport_config(&self) -> TransportConfig {
        let config = TransportConfig::unsigned(&self.opensearch_url);
        if self.signing_enabled {
            config.with_signing(SigningConfig::new(
                &self.signing_service,
                &self.signing_region,
            ))
        } else {
            config
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, IndexingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(IndexingError::config(format!(
            "Invalid value '{}' for {}",
            other, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.opensearch_url, "http://localhost:9200");
        assert!(settings.signing_enabled);
        assert_eq!(settings.signing_service, "es");
        assert_eq!(settings.signing_region, "us-east-1");
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("OPENSEARCH_URL", "https://search-podcasts.eu-west-1.es.amazonaws.com"),
            ("OPENSEARCH_SIGNING_REGION", "eu-west-1"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(
            settings.opensearch_url,
            "https://search-podcasts.eu-west-1.es.amazonaws.com"
        );
        assert_eq!(settings.signing_region, "eu-west-1");
        assert_eq!(settings.log_format, LogFormat::Json);

        let transport = settings.transport_config();
        assert_eq!(
            transport.signing,
            Some(SigningConfig::new("es", "eu-west-1"))
        );
    }

    #[test]
    fn test_signing_flag() {
        for value in ["false", "0", "OFF", "no"] {
            let settings = settings(&[("OPENSEARCH_SIGNING", value)]).unwrap();
            assert!(!settings.signing_enabled, "{} should disable signing", value);
            assert_eq!(settings.transport_config().signing, None);
        }

        for value in ["true", "1", "on", ""] {
            assert!(settings(&[("OPENSEARCH_SIGNING", value)]).unwrap().signing_enabled);
        }

        assert!(matches!(
            settings(&[("OPENSEARCH_SIGNING", "maybe")]),
            Err(IndexingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let settings = settings(&[("OPENSEARCH_URL", "  ")]).unwrap();
        assert_eq!(settings.opensearch_url, "http://localhost:9200");
    }
}
