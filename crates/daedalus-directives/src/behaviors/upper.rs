//! `@upper`: upper-cases string results.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::registry::names;
use daedalus_core::{Arguments, BoxFuture, ExecutionContext, ResolveResult};
use serde_json::Value;

/// Post-transform that upper-cases string values and passes everything else through.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperBehavior;

impl Behavior for UpperBehavior {
    fn name(&self) -> &str {
        names::UPPER
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            let result = next.run(parent, args, ctx).await.map(|value| match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            });
            observed(self.name(), result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::fixtures::CallRecorder;
    use daedalus_core::ResolveError;
    use serde_json::json;

    async fn run(base: CallRecorder) -> ResolveResult {
        let mut ctx = ExecutionContext::new();
        UpperBehavior
            .process(&Value::Null, Arguments::new(), &mut ctx, Next::resolver(&base))
            .await
    }

    #[tokio::test]
    async fn test_uppercases_strings() {
        let value = run(CallRecorder::returning(json!("Hello, world"))).await;
        assert_eq!(value, Ok(json!("HELLO, WORLD")));
    }

    #[tokio::test]
    async fn test_unicode() {
        let value = run(CallRecorder::returning(json!("straße"))).await;
        assert_eq!(value, Ok(json!("STRASSE")));
    }

    #[tokio::test]
    async fn test_non_strings_pass_through() {
        for value in [json!(42), json!(null), json!(["a"]), json!({"a": "b"})] {
            let result = run(CallRecorder::returning(value.clone())).await;
            assert_eq!(result, Ok(value));
        }
    }

    #[tokio::test]
    async fn test_inner_errors_propagate() {
        let result = run(CallRecorder::failing(ResolveError::resolver("boom"))).await;
        assert_eq!(result, Err(ResolveError::resolver("boom")));
    }
}
