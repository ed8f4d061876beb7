//! The behavior trait and the resolver chain.
//!
//! A [`Behavior`] is one cross-cutting concern wrapped around a field's
//! resolver. The compiler stacks behaviors per field; at request time the
//! stack is walked outermost-first through [`Next`] continuations, and the
//! innermost continuation invokes the field's base resolver.
//!
//! ```text
//! auth → fetch → date → base resolver
//!                          ↓
//! auth ← fetch ← date ←────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use daedalus_directives::{Behavior, Next};
//!
//! struct Trim;
//!
//! impl Behavior for Trim {
//!     fn name(&self) -> &str {
//!         "trim"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         parent: &'a Value,
//!         args: Arguments,
//!         ctx: &'a mut ExecutionContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, ResolveResult> {
//!         Box::pin(async move {
//!             let value = next.run(parent, args, ctx).await?;
//!             Ok(match value {
//!                 Value::String(s) => Value::String(s.trim().to_string()),
//!                 other => other,
//!             })
//!         })
//!     }
//! }
//! ```

use daedalus_core::resolver::Resolve;
use daedalus_core::{Arguments, BoxFuture, ExecutionContext, ResolveResult};
use serde_json::Value;

/// One layer of a field's resolver chain.
///
/// # Invariants
///
/// - A behavior either calls `next.run()` exactly once or short-circuits by
///   returning without calling it.
/// - A behavior never runs concurrently with the layer it wraps; it awaits it.
/// - Instances are immutable and shared by all requests.
pub trait Behavior: Send + Sync + 'static {
    /// Returns the directive name this layer was compiled from.
    fn name(&self) -> &str;

    /// Runs this layer.
    ///
    /// # Arguments
    ///
    /// * `parent` - The parent object of the field
    /// * `args` - The call arguments, as left by outer layers
    /// * `ctx` - The per-request context
    /// * `next` - Continuation into the inner layers
    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult>;
}

/// Continuation into the rest of a resolver chain.
///
/// Consumed by [`Next::run`], so a layer cannot invoke its inner chain twice.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More layers to run.
    Chain {
        behavior: &'a dyn Behavior,
        next: Box<Next<'a>>,
    },
    /// End of chain: the field's base resolver.
    Resolver(&'a dyn Resolve),
}

impl<'a> Next<'a> {
    /// Creates a continuation that runs `behavior`, then `next`.
    pub(crate) fn new(behavior: &'a dyn Behavior, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                behavior,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal continuation.
    pub(crate) fn resolver(resolver: &'a dyn Resolve) -> Self {
        Self {
            inner: NextInner::Resolver(resolver),
        }
    }

    /// Invokes the next layer, or the base resolver at the end of the chain.
    pub fn run<'b>(
        self,
        parent: &'b Value,
        args: Arguments,
        ctx: &'b mut ExecutionContext,
    ) -> BoxFuture<'b, ResolveResult>
    where
        'a: 'b,
    {
        match self.inner {
            NextInner::Chain { behavior, next } => behavior.process(parent, args, ctx, *next),
            NextInner::Resolver(resolver) => resolver.resolve(parent, args, ctx),
        }
    }
}
