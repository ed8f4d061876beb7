//! End-to-end chain tests.
//!
//! These compile annotated schemas with the built-in registry and resolve
//! fields through the compiled chains, checking that layers compose in
//! driver order:
//!
//! 1. Unannotated fields behave like their base resolver
//! 2. The last-applied layer runs first
//! 3. `@auth` outside `@fetch` prevents retrievals
//! 4. Each built-in behaves as documented inside a compiled chain

use daedalus_core::fixtures::{admin_context, context_with_role, CallRecorder, EventLog};
use daedalus_core::schema::{Annotation, FieldDescriptor, Schema, TypeDescriptor};
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, ResolveError, ResolveResult,
};
use daedalus_directives::params::DirectiveSite;
use daedalus_directives::{
    Behavior, CompiledSchema, Compiler, CustomDirective, DirectiveKind, DirectiveRegistry,
    MockFetcher, Next,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const PROFILE_URL: &str = "https://profiles.test/me";

/// Logs its label on the way in and on the way out.
struct Trace {
    label: String,
    log: EventLog,
}

impl Behavior for Trace {
    fn name(&self) -> &str {
        &self.label
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            self.log.push(format!("enter {}", self.label));
            let result = next.run(parent, args, ctx).await;
            self.log.push(format!("exit {}", self.label));
            result
        })
    }
}

struct TraceDirective {
    log: EventLog,
}

impl CustomDirective for TraceDirective {
    fn instantiate(
        &self,
        site: &DirectiveSite<'_>,
        _params: &Map<String, Value>,
    ) -> Result<Arc<dyn Behavior>, CompileError> {
        Ok(Arc::new(Trace {
            label: site.directive.to_string(),
            log: self.log.clone(),
        }))
    }
}

fn registry(fetcher: &MockFetcher) -> DirectiveRegistry {
    DirectiveRegistry::builtin(Arc::new(fetcher.clone()))
}

fn one_field(field: FieldDescriptor) -> Schema {
    Schema::builder()
        .add_type(TypeDescriptor::builder("Query").field(field))
        .build()
        .unwrap()
}

async fn resolve(
    compiled: &CompiledSchema,
    field: &str,
    parent: &Value,
    ctx: &mut ExecutionContext,
) -> ResolveResult {
    compiled
        .resolve("Query", field, parent, Arguments::new(), ctx)
        .await
}

#[tokio::test]
async fn test_unannotated_field_matches_base() {
    let base = CallRecorder::returning(json!({"n": 1}));
    let schema = one_field(FieldDescriptor::new("plain", Arc::new(base.clone())));
    let compiled = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap();

    let mut args = Arguments::new();
    args.insert("x", json!(2));
    let mut ctx = ExecutionContext::new();
    let value = compiled
        .resolve("Query", "plain", &Value::Null, args.clone(), &mut ctx)
        .await;

    assert_eq!(value, Ok(json!({"n": 1})));
    assert_eq!(base.last_args(), Some(args));
    assert!(!compiled.field("Query", "plain").unwrap().is_wrapped());
}

#[tokio::test]
async fn test_last_applied_layer_runs_first() {
    for order in [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]] {
        let log = EventLog::new();
        let mut registry = registry(&MockFetcher::new());
        for name in ["a", "b", "c"] {
            let directive = TraceDirective { log: log.clone() };
            registry.register(name, DirectiveKind::Custom(Arc::new(directive)));
        }

        let schema = one_field(
            FieldDescriptor::property("value")
                .annotate(Annotation::new("a"))
                .annotate(Annotation::new("b"))
                .annotate(Annotation::new("c")),
        );
        let compiled = Compiler::new(registry).order(order).compile(&schema).unwrap();
        resolve(&compiled, "value", &json!({"value": 1}), &mut ExecutionContext::new())
            .await
            .unwrap();

        let mut expected: Vec<String> = order.iter().rev().map(|l| format!("enter {l}")).collect();
        expected.extend(order.iter().map(|l| format!("exit {l}")));
        assert_eq!(log.events(), expected, "order {order:?}");
    }
}

#[tokio::test]
async fn test_auth_prevents_inner_fetch() {
    let fetcher = MockFetcher::new().respond(PROFILE_URL, json!({"name": "Ada"}));
    let base = CallRecorder::returning(json!("profile"));
    let schema = one_field(
        FieldDescriptor::new("me", Arc::new(base.clone()))
            .annotate(Annotation::new("auth").param("role", "ADMIN"))
            .annotate(Annotation::new("fetch").param("url", PROFILE_URL)),
    );
    let compiled = Compiler::new(registry(&fetcher))
        .order(["fetch", "auth"])
        .compile(&schema)
        .unwrap();

    let err = resolve(&compiled, "me", &Value::Null, &mut context_with_role("GUEST"))
        .await
        .unwrap_err();

    assert_eq!(err, ResolveError::authorization("ADMIN", Some("GUEST")));
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(base.call_count(), 0);
}

#[tokio::test]
async fn test_authorized_fetch_threads_payload() {
    let fetcher = MockFetcher::new().respond(PROFILE_URL, json!({"name": "Ada"}));
    let base = CallRecorder::returning(json!("profile"));
    let schema = one_field(
        FieldDescriptor::new("me", Arc::new(base.clone()))
            .annotate(Annotation::new("auth").param("role", "ADMIN"))
            .annotate(Annotation::new("fetch").param("url", PROFILE_URL)),
    );
    let compiled = Compiler::new(registry(&fetcher)).compile(&schema).unwrap();

    let value = resolve(&compiled, "me", &Value::Null, &mut admin_context()).await;

    assert_eq!(value, Ok(json!("profile")));
    assert_eq!(fetcher.calls(), [PROFILE_URL]);
    let args = base.last_args().unwrap();
    assert_eq!(args.enrichment(), Some(&json!({"name": "Ada"})));
    assert_eq!(args.to_value()["_enrichment"]["name"], "Ada");
}

#[tokio::test]
async fn test_length_boundary() {
    let schema = one_field(
        FieldDescriptor::property("code").annotate(Annotation::new("length").param("min", 10)),
    );
    let compiled = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap();
    let mut ctx = ExecutionContext::new();

    let err = resolve(&compiled, "code", &json!({"code": "123456789"}), &mut ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Validation { field, .. } if field == "code"));

    let ok = resolve(&compiled, "code", &json!({"code": "1234567890"}), &mut ctx).await;
    assert_eq!(ok, Ok(json!("1234567890")));
}

#[tokio::test]
async fn test_same_directive_on_sibling_fields_is_independent() {
    let fetcher = MockFetcher::new()
        .respond("https://a.test/doc", json!({"from": "a"}))
        .respond("https://b.test/doc", json!({"from": "b"}));
    let schema = Schema::builder()
        .add_type(
            TypeDescriptor::builder("Query")
                .field(
                    FieldDescriptor::property("code")
                        .annotate(Annotation::new("length").param("max", 3))
                        .annotate(Annotation::new("fetch").param("url", "https://a.test/doc")),
                )
                .field(
                    FieldDescriptor::property("name")
                        .annotate(Annotation::new("length").param("min", 5))
                        .annotate(Annotation::new("fetch").param("url", "https://b.test/doc")),
                ),
        )
        .build()
        .unwrap();
    let compiled = Compiler::new(registry(&fetcher)).compile(&schema).unwrap();
    let mut ctx = admin_context();

    // "abcd" breaks code's max but satisfies name's min
    let parent = json!({"code": "abcd", "name": "abcd"});
    let err = resolve(&compiled, "code", &parent, &mut ctx).await.unwrap_err();
    assert!(matches!(err, ResolveError::Validation { field, .. } if field == "code"));
    let err = resolve(&compiled, "name", &parent, &mut ctx).await.unwrap_err();
    assert!(matches!(err, ResolveError::Validation { field, .. } if field == "name"));

    let parent = json!({"code": "abc", "name": "abcde"});
    assert_eq!(resolve(&compiled, "code", &parent, &mut ctx).await, Ok(json!("abc")));
    assert_eq!(resolve(&compiled, "name", &parent, &mut ctx).await, Ok(json!("abcde")));

    assert_eq!(
        fetcher.calls(),
        [
            "https://a.test/doc",
            "https://b.test/doc",
            "https://a.test/doc",
            "https://b.test/doc",
        ]
    );
}

#[tokio::test]
async fn test_date_formats_now_for_missing_value() {
    let schema = one_field(
        FieldDescriptor::property("createdAt")
            .annotate(Annotation::new("date").param("format", "isoDateTime")),
    );
    let compiled = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap();
    let mut ctx = ExecutionContext::new();

    let value = resolve(&compiled, "createdAt", &json!({}), &mut ctx)
        .await
        .unwrap();
    let rendered = value.as_str().unwrap();
    assert!(chrono::DateTime::parse_from_str(rendered, "%Y-%m-%dT%H:%M:%S%z").is_ok());

    let err = resolve(&compiled, "createdAt", &json!({"createdAt": "soon"}), &mut ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Format { .. }));
}

#[tokio::test]
async fn test_unique_id_is_fresh_per_call() {
    let schema = Schema::builder()
        .add_type(
            TypeDescriptor::builder("Query")
                .annotate(Annotation::new("uniqueId").param("field", "id"))
                .field(FieldDescriptor::property("id").annotate(Annotation::new("upper"))),
        )
        .build()
        .unwrap();
    let compiled = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap();
    let parent = json!({"id": "stored"});
    let mut ctx = ExecutionContext::new();

    let first = resolve(&compiled, "id", &parent, &mut ctx).await.unwrap();
    let second = resolve(&compiled, "id", &parent, &mut ctx).await.unwrap();

    assert_ne!(first, second);
    assert_ne!(first, json!("stored"));
    // `@upper` wraps the generator under the default order.
    let first = first.as_str().unwrap();
    assert_eq!(first, first.to_uppercase());
}

#[tokio::test]
async fn test_unique_id_unknown_field_fails_compile() {
    let schema = Schema::builder()
        .add_type(
            TypeDescriptor::builder("Query")
                .annotate(Annotation::new("uniqueId").param("field", "uuid"))
                .field(FieldDescriptor::property("id")),
        )
        .build()
        .unwrap();

    let err = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownField { field, .. } if field == "uuid"));
}

#[tokio::test]
async fn test_inject_before_base() {
    let base = CallRecorder::returning(json!(true));
    let schema = one_field(
        FieldDescriptor::new("createPost", Arc::new(base.clone()))
            .annotate(Annotation::new("inject").param("name", "status").param("value", "draft")),
    );
    let compiled = Compiler::new(registry(&MockFetcher::new()))
        .compile(&schema)
        .unwrap();

    let args = Arguments::from_value(json!({"input": {"title": "Hi"}})).unwrap();
    compiled
        .resolve("Query", "createPost", &Value::Null, args, &mut ExecutionContext::new())
        .await
        .unwrap();

    let seen = base.last_args().unwrap();
    assert_eq!(seen.get("input"), Some(&json!({"title": "Hi", "status": "draft"})));
}

#[tokio::test]
async fn test_compiled_schema_serves_concurrent_requests() {
    let schema = one_field(
        FieldDescriptor::property("name")
            .annotate(Annotation::new("upper"))
            .annotate(Annotation::new("auth").param("role", "ADMIN")),
    );
    let compiled = Arc::new(
        Compiler::new(registry(&MockFetcher::new()))
            .compile(&schema)
            .unwrap(),
    );

    let handles: Vec<_> = ["ADMIN", "GUEST", "ADMIN"]
        .into_iter()
        .map(|role| {
            let compiled = Arc::clone(&compiled);
            tokio::spawn(async move {
                let mut ctx = context_with_role(role);
                compiled
                    .resolve("Query", "name", &json!({"name": "ada"}), Arguments::new(), &mut ctx)
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    assert_eq!(results[0], Ok(json!("ADA")));
    assert!(matches!(results[1], Err(ResolveError::Authorization { .. })));
    assert_eq!(results[2], Ok(json!("ADA")));
}
