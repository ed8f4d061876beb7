//! Test fixtures for Daedalus development and testing.
//!
//! # Example
//!
//! ```
//! use daedalus_core::fixtures::{admin_context, CallRecorder};
//! use daedalus_core::resolver::Resolve;
//! use daedalus_core::Arguments;
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let recorder = CallRecorder::returning(json!("ok"));
//! let mut ctx = admin_context();
//!
//! recorder.resolve(&Value::Null, Arguments::new(), &mut ctx).await.unwrap();
//! assert_eq!(recorder.call_count(), 1);
//! # });
//! ```

use crate::arguments::Arguments;
use crate::context::ExecutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::identity::CallerIdentity;
use crate::resolver::{BoxFuture, Resolve};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Creates a context for a caller claiming the `ADMIN` role.
#[must_use]
pub fn admin_context() -> ExecutionContext {
    context_with_role("ADMIN")
}

/// Creates a context for a caller claiming `role`.
#[must_use]
pub fn context_with_role(role: &str) -> ExecutionContext {
    ExecutionContext::new().with_identity(CallerIdentity::with_role(role))
}

/// A base resolver that records every call it receives.
///
/// Cloning a recorder shares the call log, so a test can keep one clone and
/// hand the other to the schema.
#[derive(Debug, Clone)]
pub struct CallRecorder {
    outcome: Result<Value, ResolveError>,
    calls: Arc<Mutex<Vec<Arguments>>>,
}

impl CallRecorder {
    /// Creates a recorder that resolves to `value`.
    #[must_use]
    pub fn returning(value: Value) -> Self {
        Self {
            outcome: Ok(value),
            calls: Arc::default(),
        }
    }

    /// Creates a recorder that fails with `error`.
    #[must_use]
    pub fn failing(error: ResolveError) -> Self {
        Self {
            outcome: Err(error),
            calls: Arc::default(),
        }
    }

    /// Returns how many times the recorder was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns the arguments of the most recent call.
    #[must_use]
    pub fn last_args(&self) -> Option<Arguments> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Resolve for CallRecorder {
    fn resolve<'a>(
        &'a self,
        _parent: &'a Value,
        args: Arguments,
        _ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// A shared, ordered log of named events, for asserting invocation order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: impl Into<String>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    /// Returns a snapshot of all events.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
