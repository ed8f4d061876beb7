//! # Daedalus
//!
//! **Annotation-driven resolver pipelines**
//!
//! Daedalus compiles a schema whose fields carry annotations into per-field
//! resolver chains:
//!
//! - **Declarative behaviors**: `@upper`, `@length`, `@date`, `@fetch`, `@auth`,
//!   `@uniqueId` and `@inject` wrap a field's resolver without touching it
//! - **Deterministic order**: one configured driver order decides nesting,
//!   independent of how annotations are written
//! - **Typed configuration**: TOML/JSON files with environment overrides
//! - **Structured observability**: `tracing` logs and `metrics` counters
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use daedalus::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("daedalus.toml")?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//! daedalus::init_telemetry(&config)?;
//!
//! let engine = Engine::from_config(&config)?;
//! let compiled = engine.compile(&schema)?;
//!
//! let mut ctx = ExecutionContext::new()
//!     .with_identity(CallerIdentity::user("u-1", "ADMIN"));
//! let row = compiled
//!     .resolve_object("Book", &parent, [("title", Arguments::new())], &mut ctx)
//!     .await;
//! ```
//!
//! ## Chain shape
//!
//! ```text
//! order = [uniqueId, inject, date, length, upper, fetch, auth]
//!
//! request → auth → fetch → upper → length → date → inject → base resolver
//! ```
//!
//! The last directive in the order is outermost and sees the request first.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;

pub use engine::{Engine, EngineError};

// Re-export core types
pub use daedalus_core as core;

// Re-export directives and the compiler
pub use daedalus_directives as directives;

// Re-export configuration
pub use daedalus_config as config;

// Re-export telemetry
pub use daedalus_telemetry as telemetry;

/// Installs logging and metric descriptions from loaded configuration.
///
/// # Errors
///
/// Returns `TelemetryError` if a global subscriber is already installed.
pub fn init_telemetry(config: &daedalus_config::DaedalusConfig) -> telemetry::TelemetryResult<()> {
    daedalus_telemetry::init_telemetry(&config.telemetry.logging.to_log_config())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use daedalus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Engine, EngineError};

    pub use daedalus_core::{
        resolver_fn, Annotation, Arguments, CallerIdentity, CompileError, ExecutionContext,
        FieldDescriptor, FieldError, RequestId, Resolve, ResolveError, ResolveResult, Schema,
        SharedResolver, TypeDescriptor,
    };

    pub use daedalus_directives::{
        Behavior, CompiledSchema, Compiler, CustomDirective, DirectiveKind, DirectiveLocation,
        DirectiveRegistry, Fetcher, HttpFetcher, MockFetcher, Next, ResolvedObject,
        DEFAULT_ORDER,
    };

    pub use daedalus_config::{ConfigError, ConfigLoader, DaedalusConfig};
}
