//! Typed configuration for Daedalus.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [compiler]
//! order = ["uniqueId", "inject", "date", "length", "upper", "fetch", "auth"]
//!
//! [date]
//! default_format = "isoDateTime"
//! missing_value = "format_now"   # or "fail"
//!
//! [date.patterns]
//! compact = "%Y%m%d"
//!
//! [fetch]
//! user_agent = "daedalus/0.1"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `DAEDALUS__COMPILER__ORDER=uniqueId,fetch,auth`
//! - `DAEDALUS__DATE__MISSING_VALUE=fail`
//! - `DAEDALUS__TELEMETRY__LOGGING__LEVEL=daedalus=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{DaedalusConfig, DaedalusConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
