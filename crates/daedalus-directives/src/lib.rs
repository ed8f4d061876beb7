//! Directive behaviors and the chain compiler.
//!
//! This crate turns the annotations on a [`daedalus_core::Schema`] into
//! per-field resolver chains:
//!
//! - [`registry`]: which directive names exist and what they stand for
//! - [`params`]: declared parameters and their compile-time validation
//! - [`behaviors`]: the built-in behavior modules
//! - [`compiler`]: applies behaviors in driver order, producing a [`CompiledSchema`]
//! - [`fetch`]: the remote retrieval capability used by `@fetch`
//!
//! # Example
//!
//! ```
//! use daedalus_core::fixtures::admin_context;
//! use daedalus_core::schema::{Annotation, FieldDescriptor, Schema, TypeDescriptor};
//! use daedalus_core::Arguments;
//! use daedalus_directives::fetch::MockFetcher;
//! use daedalus_directives::{Compiler, DirectiveRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::builder()
//!     .add_type(
//!         TypeDescriptor::builder("Book").field(
//!             FieldDescriptor::property("title")
//!                 .annotate(Annotation::new("upper"))
//!                 .annotate(Annotation::new("auth").param("role", "ADMIN")),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let registry = DirectiveRegistry::builtin(Arc::new(MockFetcher::new()));
//! let compiled = Compiler::new(registry).compile(&schema).unwrap();
//!
//! let mut ctx = admin_context();
//! let title = compiled
//!     .resolve("Book", "title", &json!({"title": "dune"}), Arguments::new(), &mut ctx)
//!     .await
//!     .unwrap();
//! assert_eq!(title, json!("DUNE"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod behavior;
pub mod behaviors;
pub mod compiler;
pub mod fetch;
pub mod params;
pub mod registry;

pub use behavior::{Behavior, Next};
pub use compiler::{
    CompiledField, CompiledSchema, CompiledType, Compiler, ResolvedObject, DEFAULT_ORDER,
};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetcher, MockFetcher};
pub use registry::{CustomDirective, DirectiveKind, DirectiveLocation, DirectiveRegistry};
