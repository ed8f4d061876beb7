//! Caller identity as supplied by the transport layer.
//!
//! The core never authenticates anyone. The surrounding request engine decides
//! who the caller is and which role they claim, and hands that over in the
//! [`ExecutionContext`](crate::ExecutionContext).

use serde::{Deserialize, Serialize};

/// The identity of the caller of one request.
///
/// # Example
///
/// ```
/// use daedalus_core::CallerIdentity;
///
/// let caller = CallerIdentity::user("u-42", "ADMIN");
/// assert_eq!(caller.role(), Some("ADMIN"));
/// assert_eq!(caller.log_id(), "user:u-42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// No identity was established.
    #[default]
    Anonymous,

    /// A caller that claims a role, optionally with a subject identifier.
    User {
        /// Opaque subject identifier.
        user_id: Option<String>,
        /// The role the caller claims.
        role: String,
    },
}

impl CallerIdentity {
    /// Creates an anonymous identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates a user identity with a subject and a claimed role.
    #[must_use]
    pub fn user(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self::User {
            user_id: Some(user_id.into()),
            role: role.into(),
        }
    }

    /// Creates an identity that only claims a role.
    #[must_use]
    pub fn with_role(role: impl Into<String>) -> Self {
        Self::User {
            user_id: None,
            role: role.into(),
        }
    }

    /// Returns the claimed role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User { role, .. } => Some(role),
        }
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never contains anything beyond the subject id.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::User {
                user_id: Some(id), ..
            } => format!("user:{id}"),
            Self::User { role, .. } => format!("role:{role}"),
        }
    }
}
