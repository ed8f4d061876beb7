//! `@fetch(url)`: enriches the arguments with a remote JSON document.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::fetch::Fetcher;
use crate::params::{string_param, DirectiveSite};
use crate::registry::names;
use daedalus_core::{Arguments, BoxFuture, CompileError, ExecutionContext, ResolveResult};
use daedalus_telemetry::record_fetch;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Retrieves a document before the inner layers run and pushes it into the
/// arguments' enrichment slot, tagged with its address.
#[derive(Clone)]
pub struct FetchBehavior {
    url: String,
    fetcher: Arc<dyn Fetcher>,
}

impl fmt::Debug for FetchBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchBehavior")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl FetchBehavior {
    /// Creates an enrichment layer for `url`.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidParameter` unless `url` is an absolute
    /// `http` or `https` address.
    pub fn new(
        site: &DirectiveSite<'_>,
        url: &str,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, CompileError> {
        let parsed = Url::parse(url).map_err(|e| site.invalid("url", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(site.invalid(
                "url",
                format!("unsupported scheme `{}`", parsed.scheme()),
            ));
        }
        Ok(Self {
            url: url.to_string(),
            fetcher,
        })
    }

    pub(crate) fn from_params(
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, CompileError> {
        let url = string_param(site, params, "url")?;
        Self::new(site, &url, fetcher)
    }

    /// Returns the bound address.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Behavior for FetchBehavior {
    fn name(&self) -> &str {
        names::FETCH
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        mut args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            let started = Instant::now();
            let fetched = self.fetcher.fetch(&self.url).await;
            record_fetch(&self.url, started.elapsed());

            let payload = match fetched {
                Ok(payload) => payload,
                Err(e) => return observed(self.name(), Err(e)),
            };
            debug!(
                request_id = %ctx.request_id(),
                url = %self.url,
                "Arguments enriched"
            );
            args.push_enrichment(&self.url, payload);

            let result = next.run(parent, args, ctx).await;
            observed(self.name(), result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;
    use daedalus_core::fixtures::CallRecorder;
    use daedalus_core::ResolveError;
    use serde_json::json;

    const USER_URL: &str = "https://api.test/user";

    fn site() -> DirectiveSite<'static> {
        DirectiveSite::field(names::FETCH, "Query", "me")
    }

    #[tokio::test]
    async fn test_payload_reaches_inner_resolver() {
        let fetcher = MockFetcher::new().respond(USER_URL, json!({"name": "Ada"}));
        let behavior = FetchBehavior::new(&site(), USER_URL, Arc::new(fetcher.clone())).unwrap();
        let base = CallRecorder::returning(json!("ok"));
        let mut ctx = ExecutionContext::new();

        let mut args = Arguments::new();
        args.insert("id", json!(7));
        let result = behavior
            .process(&Value::Null, args, &mut ctx, Next::resolver(&base))
            .await;

        assert_eq!(result, Ok(json!("ok")));
        assert_eq!(fetcher.calls(), [USER_URL]);
        let seen = base.last_args().unwrap();
        assert_eq!(seen.get("id"), Some(&json!(7)));
        assert_eq!(seen.enrichment_from(USER_URL), Some(&json!({"name": "Ada"})));
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_inner() {
        let fetcher = MockFetcher::new().fail(USER_URL, "connection refused");
        let behavior = FetchBehavior::new(&site(), USER_URL, Arc::new(fetcher)).unwrap();
        let base = CallRecorder::returning(json!("ok"));
        let mut ctx = ExecutionContext::new();

        let err = behavior
            .process(&Value::Null, Arguments::new(), &mut ctx, Next::resolver(&base))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Retrieval { url, .. } if url == USER_URL));
        assert_eq!(base.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chained_fetches_accumulate() {
        let fetcher = MockFetcher::new()
            .respond("https://a.test/", json!("a"))
            .respond("https://b.test/", json!("b"));
        let shared: Arc<dyn Fetcher> = Arc::new(fetcher);
        let inner = FetchBehavior::new(&site(), "https://a.test/", Arc::clone(&shared)).unwrap();
        let outer = FetchBehavior::new(&site(), "https://b.test/", shared).unwrap();
        let base = CallRecorder::returning(json!(null));
        let mut ctx = ExecutionContext::new();

        Next::new(&outer, Next::new(&inner, Next::resolver(&base)))
            .run(&Value::Null, Arguments::new(), &mut ctx)
            .await
            .unwrap();

        let seen = base.last_args().unwrap();
        let sources: Vec<_> = seen.enrichments().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, ["https://b.test/", "https://a.test/"]);
        assert_eq!(seen.enrichment(), Some(&json!("a")));
    }

    #[test]
    fn test_url_validation() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(MockFetcher::new());
        for bad in ["not a url", "/relative/path", "ftp://files.test/x"] {
            let err = FetchBehavior::new(&site(), bad, Arc::clone(&fetcher)).unwrap_err();
            assert!(matches!(err, CompileError::InvalidParameter { parameter, .. } if parameter == "url"));
        }
        assert!(FetchBehavior::new(&site(), "http://localhost:8080/x", fetcher).is_ok());
    }
}
