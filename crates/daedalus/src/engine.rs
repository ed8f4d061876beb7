//! Configured compilation entry point.

use std::sync::Arc;

use daedalus_config::DaedalusConfig;
use daedalus_core::{CompileError, Schema};
use daedalus_directives::{
    CompiledSchema, Compiler, DirectiveKind, DirectiveRegistry, Fetcher, HttpFetcher,
};
use thiserror::Error;

/// Errors building an [`Engine`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// The HTTP transport for `@fetch` could not be built.
    #[error("failed to build HTTP fetcher: {0}")]
    Transport(String),
}

/// A directive registry and application order, ready to compile schemas.
///
/// # Example
///
/// ```
/// use daedalus::prelude::*;
/// use std::sync::Arc;
///
/// let engine = Engine::with_fetcher(&DaedalusConfig::default(), Arc::new(MockFetcher::new()));
/// let schema = Schema::builder()
///     .add_type(TypeDescriptor::builder("Query").field(FieldDescriptor::property("hello")))
///     .build()
///     .unwrap();
///
/// let compiled = engine.compile(&schema).unwrap();
/// assert!(compiled.field("Query", "hello").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    compiler: Compiler,
}

impl Engine {
    /// Builds an engine from configuration, retrieving over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &DaedalusConfig) -> Result<Self, EngineError> {
        let fetcher = HttpFetcher::with_user_agent(&config.fetch.user_agent)
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Builds an engine from configuration with a custom fetcher.
    #[must_use]
    pub fn with_fetcher(config: &DaedalusConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let registry =
            DirectiveRegistry::builtin(fetcher).with_date_settings(config.date.to_settings());
        let compiler = Compiler::new(registry).order(config.compiler.order.iter().cloned());
        Self { compiler }
    }

    /// Replaces the fetcher, keeping everything else.
    #[must_use]
    pub fn fetcher(self, fetcher: Arc<dyn Fetcher>) -> Self {
        let order = self.compiler.directive_order().to_vec();
        let registry = self.compiler.registry().clone().with_fetcher(fetcher);
        Self {
            compiler: Compiler::new(registry).order(order),
        }
    }

    /// Registers an additional directive under `name`.
    ///
    /// The name must also appear in the application order to be applied.
    #[must_use]
    pub fn register(self, name: impl Into<String>, kind: DirectiveKind) -> Self {
        let order = self.compiler.directive_order().to_vec();
        let mut registry = self.compiler.registry().clone();
        registry.register(name, kind);
        Self {
            compiler: Compiler::new(registry).order(order),
        }
    }

    /// Replaces the application order, innermost first.
    #[must_use]
    pub fn order<I, S>(self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            compiler: self.compiler.order(order),
        }
    }

    /// Returns the underlying compiler.
    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compiles `schema` into a shareable compiled schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] found.
    pub fn compile(&self, schema: &Schema) -> Result<Arc<CompiledSchema>, CompileError> {
        self.compiler.compile(schema).map(Arc::new)
    }
}
