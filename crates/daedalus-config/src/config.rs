//! Main configuration types.
//!
//! This module provides the top-level [`DaedalusConfig`] struct and its builder.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompilerConfig, ConfigError, DateConfig, FetchConfig, LogFormat, TelemetryConfig};

/// Complete Daedalus configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert_eq!(config.date.default_format, "isoDateTime");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// Chain compiler configuration.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// `@date` configuration.
    #[serde(default)]
    pub date: DateConfig,

    /// `@fetch` transport configuration.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl DaedalusConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> DaedalusConfigBuilder {
        DaedalusConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The compiler order is empty, has a blank entry or names a directive twice
    /// - The default date format is unknown, or a custom pattern is not valid strftime
    /// - The user agent or the log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.order.is_empty() {
            return Err(ConfigError::invalid_value(
                "compiler.order",
                "must name at least one directive",
            ));
        }
        let mut seen = HashSet::new();
        for directive in &self.compiler.order {
            if directive.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "compiler.order",
                    "contains an empty directive name",
                ));
            }
            if !seen.insert(directive.as_str()) {
                return Err(ConfigError::invalid_value(
                    "compiler.order",
                    format!("directive '{directive}' is listed more than once"),
                ));
            }
        }

        self.date
            .to_settings()
            .validate()
            .map_err(|reason| ConfigError::invalid_value("date", reason))?;

        if self.fetch.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "fetch.user_agent",
                "must not be empty",
            ));
        }

        if self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty logs at debug level with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::DaedalusConfig;
    ///
    /// let config = DaedalusConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::{DaedalusConfig, LogFormat};
    ///
    /// let config = DaedalusConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.include_location = false;
        config
    }
}

/// Builder for [`DaedalusConfig`].
#[derive(Debug, Default)]
pub struct DaedalusConfigBuilder {
    compiler: Option<CompilerConfig>,
    date: Option<DateConfig>,
    fetch: Option<FetchConfig>,
    telemetry: Option<TelemetryConfig>,
}

impl DaedalusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compiler configuration.
    #[must_use]
    pub fn compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Set the date configuration.
    #[must_use]
    pub fn date(mut self, date: DateConfig) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the fetch configuration.
    #[must_use]
    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> DaedalusConfig {
        DaedalusConfig {
            compiler: self.compiler.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            fetch: self.fetch.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DaedalusConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
