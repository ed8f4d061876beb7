//! Per-request execution context.
//!
//! The [`ExecutionContext`] is created once per incoming request and threaded
//! mutably through every wrapper of every resolver chain that request runs.
//! It is never shared between requests.

use crate::identity::CallerIdentity;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines of one request easy to
/// correlate.
///
/// # Example
///
/// ```
/// use daedalus_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// State that flows through every resolver chain of one request.
///
/// # Example
///
/// ```
/// use daedalus_core::{CallerIdentity, ExecutionContext};
///
/// let ctx = ExecutionContext::new().with_identity(CallerIdentity::with_role("ADMIN"));
/// assert_eq!(ctx.role(), Some("ADMIN"));
/// ```
#[derive(Debug)]
pub struct ExecutionContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The identity of the caller, as supplied by the transport.
    identity: CallerIdentity,

    /// Type-erased extension data for collaborators of the engine.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    /// Creates a context for an anonymous caller with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the transport already assigned one.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            identity: CallerIdentity::Anonymous,
            extensions: HashMap::new(),
        }
    }

    /// Sets the caller identity.
    #[must_use]
    pub fn with_identity(mut self, identity: CallerIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the caller identity.
    #[must_use]
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Returns the caller's claimed role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.identity.role()
    }

    /// Stores a typed extension value, replacing any previous value of that type.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_core::ExecutionContext;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = ExecutionContext::new();
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().unwrap().0, "acme");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Retrieves a mutable typed extension value.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
