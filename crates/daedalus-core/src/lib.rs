//! # Daedalus Core
//!
//! Core types for the Daedalus annotation-driven resolver pipeline.
//!
//! This crate provides the foundational types used throughout Daedalus:
//!
//! - [`Schema`], [`TypeDescriptor`], [`FieldDescriptor`], [`Annotation`] - the declared schema
//! - [`Resolve`] - the resolution function every field and wrapper implements
//! - [`ExecutionContext`] - per-request state (request id, caller identity, extensions)
//! - [`Arguments`] - per-call argument bag with a typed enrichment slot
//! - [`ResolveError`] / [`CompileError`] - request-time and compile-time errors

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arguments;
mod context;
mod error;
pub mod fixtures;
mod identity;
pub mod resolver;
pub mod schema;

pub use arguments::{Arguments, Enrichment, ENRICHMENT_KEY};
pub use context::{ExecutionContext, RequestId};
pub use error::{CompileError, ErrorCategory, FieldError, ResolveError, ResolveResult};
pub use identity::CallerIdentity;
pub use resolver::{resolver_fn, BoxFuture, Resolve, SharedResolver};
pub use schema::{Annotation, FieldDescriptor, Schema, TypeDescriptor};
