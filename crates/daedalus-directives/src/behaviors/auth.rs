//! `@auth(role)`: role guard.
//!
//! Compares the required role with the role the caller claims in the
//! [`ExecutionContext`]. On mismatch the inner layers never run.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::params::{string_param, DirectiveSite};
use crate::registry::names;
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, ResolveError, ResolveResult,
};
use daedalus_telemetry::{record_directive, Outcome};
use serde_json::{Map, Value};
use tracing::warn;

/// Short-circuits with an authorization error unless the caller holds `role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthBehavior {
    role: String,
}

impl AuthBehavior {
    /// Creates a guard requiring `role`.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    pub(crate) fn from_params(
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
    ) -> Result<Self, CompileError> {
        string_param(site, params, "role").map(Self::new)
    }

    /// Returns the required role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl Behavior for AuthBehavior {
    fn name(&self) -> &str {
        names::AUTH
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            if ctx.role() == Some(self.role.as_str()) {
                let result = next.run(parent, args, ctx).await;
                return observed(self.name(), result);
            }

            warn!(
                request_id = %ctx.request_id(),
                caller = %ctx.identity().log_id(),
                required_role = %self.role,
                "Authorization denied"
            );
            record_directive(self.name(), Outcome::Rejected);
            Err(ResolveError::authorization(&self.role, ctx.role()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::fixtures::{admin_context, context_with_role, CallRecorder};
    use serde_json::json;

    async fn run(ctx: &mut ExecutionContext, base: &CallRecorder) -> ResolveResult {
        AuthBehavior::new("ADMIN")
            .process(&Value::Null, Arguments::new(), ctx, Next::resolver(base))
            .await
    }

    #[tokio::test]
    async fn test_matching_role_passes_through() {
        let base = CallRecorder::returning(json!("secret"));
        let result = run(&mut admin_context(), &base).await;

        assert_eq!(result, Ok(json!("secret")));
        assert_eq!(base.call_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_role_short_circuits() {
        let base = CallRecorder::returning(json!("secret"));
        let err = run(&mut context_with_role("GUEST"), &base).await.unwrap_err();

        assert_eq!(err, ResolveError::authorization("ADMIN", Some("GUEST")));
        assert_eq!(base.call_count(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_denied() {
        let base = CallRecorder::returning(json!("secret"));
        let err = run(&mut ExecutionContext::new(), &base).await.unwrap_err();

        assert!(matches!(err, ResolveError::Authorization { actual: None, .. }));
        assert_eq!(base.call_count(), 0);
    }

    #[test]
    fn test_role_comparison_is_exact() {
        let params = json!({"role": "admin"}).as_object().cloned().unwrap();
        let site = DirectiveSite::field(names::AUTH, "Query", "users");
        let guard = AuthBehavior::from_params(&site, &params).unwrap();
        assert_eq!(guard.role(), "admin");
        assert_ne!(guard, AuthBehavior::new("ADMIN"));
    }
}
