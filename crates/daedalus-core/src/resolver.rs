//! Resolution functions.
//!
//! A resolver turns `(parent, args, context)` into a value or a
//! [`ResolveError`](crate::ResolveError). Base resolvers hold a field's data
//! fetching logic; directive behaviors wrap them.
//!
//! # Example
//!
//! ```
//! use daedalus_core::resolver::{resolver_fn, Resolve};
//! use daedalus_core::{Arguments, ExecutionContext};
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let greet = resolver_fn(|_parent: &Value, args: Arguments, _ctx: &ExecutionContext| {
//!     let name = args.get("name").cloned().unwrap_or(json!("world"));
//!     async move { Ok(json!(format!("hello {}", name.as_str().unwrap_or_default()))) }
//! });
//!
//! let mut ctx = ExecutionContext::new();
//! let args = Arguments::from_value(json!({"name": "ada"})).unwrap();
//! let value = greet.resolve(&Value::Null, args, &mut ctx).await.unwrap();
//! assert_eq!(value, json!("hello ada"));
//! # });
//! ```

use crate::arguments::Arguments;
use crate::context::ExecutionContext;
use crate::error::ResolveResult;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A resolution function for one field.
///
/// Implementations must be shareable across concurrent requests; all
/// per-request state lives in the arguments and the context.
pub trait Resolve: Send + Sync + 'static {
    /// Resolves the field value.
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult>;
}

/// A type-erased resolver that can be shared between fields and requests.
pub type SharedResolver = Arc<dyn Resolve>;

/// A resolver built from an async function.
///
/// The function sees the context read-only and returns a `'static` future,
/// so it must copy what it needs out of `parent` and `ctx` before awaiting.
pub struct FnResolver<F> {
    func: F,
}

impl<F> FnResolver<F> {
    /// Creates a resolver from an async function.
    pub fn new<Fut>(func: F) -> Self
    where
        F: Fn(&Value, Arguments, &ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        Self { func }
    }
}

impl<F, Fut> Resolve for FnResolver<F>
where
    F: Fn(&Value, Arguments, &ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin((self.func)(parent, args, ctx))
    }
}

/// Wraps an async function into a [`SharedResolver`].
pub fn resolver_fn<F, Fut>(func: F) -> SharedResolver
where
    F: Fn(&Value, Arguments, &ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolveResult> + Send + 'static,
{
    Arc::new(FnResolver::new(func))
}

/// Resolver that reads a property of the parent object.
///
/// This is the resolver a field gets when none is given: it returns
/// `parent[key]`, or `null` when the parent lacks it.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    key: String,
}

impl PropertyResolver {
    /// Creates a resolver reading `parent[key]`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Resolve for PropertyResolver {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        _args: Arguments,
        _ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        let value = parent.get(&self.key).cloned().unwrap_or(Value::Null);
        Box::pin(async move { Ok(value) })
    }
}

/// Resolver that always returns the same value.
#[derive(Debug, Clone)]
pub struct ConstantResolver {
    value: Value,
}

impl ConstantResolver {
    /// Creates a resolver returning `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Resolve for ConstantResolver {
    fn resolve<'a>(
        &'a self,
        _parent: &'a Value,
        _args: Arguments,
        _ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move { Ok(self.value.clone()) })
    }
}
