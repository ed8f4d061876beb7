//! Observability for Daedalus.
//!
//! - **Logging**: structured JSON or pretty logs via `tracing-subscriber`
//! - **Metrics**: directive and compilation counters via the `metrics` facade
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::{init_telemetry, LogConfig};
//!
//! init_telemetry(&LogConfig::production())?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{describe_metrics, record_compilation, record_directive, record_fetch, Outcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and registers metric descriptions.
///
/// # Errors
///
/// Returns `TelemetryError` if the logging subscriber cannot be installed.
pub fn init_telemetry(logging: &LogConfig) -> TelemetryResult<()> {
    init_logging(logging)?;
    describe_metrics();
    Ok(())
}
