//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use daedalus_directives::behaviors::date::DEFAULT_FORMAT;
use daedalus_directives::behaviors::{DateSettings, MissingValuePolicy};
use daedalus_directives::fetch::DEFAULT_USER_AGENT;
use daedalus_directives::DEFAULT_ORDER;
use daedalus_telemetry::LogConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Compiler configuration section.
///
/// # Example
///
/// ```
/// use daedalus_config::CompilerConfig;
///
/// let config = CompilerConfig::default();
/// assert_eq!(config.order.last().map(String::as_str), Some("auth"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Directive application order, innermost first.
    #[serde(default = "default_order")]
    pub order: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
        }
    }
}

fn default_order() -> Vec<String> {
    DEFAULT_ORDER.iter().map(ToString::to_string).collect()
}

/// Date formatting configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DateConfig {
    /// Pattern used when a `@date` annotation omits `format`.
    #[serde(default = "default_date_format")]
    pub default_format: String,

    /// What `@date` does when the value is null.
    #[serde(default)]
    pub missing_value: MissingValuePolicy,

    /// Custom `name -> strftime` patterns.
    #[serde(default)]
    pub patterns: IndexMap<String, String>,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            default_format: default_date_format(),
            missing_value: MissingValuePolicy::default(),
            patterns: IndexMap::new(),
        }
    }
}

impl DateConfig {
    /// Converts this section into the settings `@date` layers are built with.
    #[must_use]
    pub fn to_settings(&self) -> DateSettings {
        DateSettings {
            default_format: self.default_format.clone(),
            missing_value: self.missing_value,
            patterns: self.patterns.clone(),
        }
    }
}

fn default_date_format() -> String {
    DEFAULT_FORMAT.to_string()
}

/// Remote retrieval configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// `User-Agent` header sent with retrievals.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g. `info`, `daedalus=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            include_location: self.include_location,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_config_to_settings() {
        let mut config = DateConfig {
            missing_value: MissingValuePolicy::Fail,
            ..DateConfig::default()
        };
        config.patterns.insert("compact".to_string(), "%Y%m%d".to_string());

        let settings = config.to_settings();
        assert_eq!(settings.default_format, "isoDateTime");
        assert_eq!(settings.missing_value, MissingValuePolicy::Fail);
        assert_eq!(settings.pattern("compact"), Some("%Y%m%d"));
    }

    #[test]
    fn test_logging_config_to_log_config() {
        let pretty = LoggingConfig {
            format: LogFormat::Pretty,
            level: "daedalus=trace".to_string(),
            ..LoggingConfig::default()
        }
        .to_log_config();
        assert!(!pretty.json_format);
        assert_eq!(pretty.level, "daedalus=trace");
        assert!(!pretty.include_location);

        let json = LoggingConfig::default().to_log_config();
        assert!(json.json_format);
        assert_eq!(json.level, "info");
    }

    #[test]
    fn test_missing_value_serde() {
        let config: DateConfig = serde_json::from_str(r#"{"missing_value": "fail"}"#).unwrap();
        assert_eq!(config.missing_value, MissingValuePolicy::Fail);
        assert!(serde_json::from_str::<DateConfig>(r#"{"missing_value": "never"}"#).is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<FetchConfig>(r#"{"timeout_ms": 100}"#).is_err());
    }
}
