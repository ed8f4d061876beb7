//! Remote JSON retrieval.
//!
//! The `fetch` directive depends on a [`Fetcher`]: something that can turn an
//! address into a JSON document. [`HttpFetcher`] does it over HTTP with
//! `reqwest`; [`MockFetcher`] serves canned documents and records calls.
//!
//! There is no retry, caching or deadline here. A hung retrieval stalls the
//! field until the transport gives up.

use daedalus_core::{BoxFuture, ResolveError, ResolveResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Default `User-Agent` sent by [`HttpFetcher`].
pub const DEFAULT_USER_AGENT: &str = concat!("daedalus/", env!("CARGO_PKG_VERSION"));

/// Retrieves a JSON document from an address.
pub trait Fetcher: Send + Sync + fmt::Debug + 'static {
    /// Fetches and decodes the document at `url`.
    ///
    /// Failures are reported as [`ResolveError::Retrieval`].
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ResolveResult<Value>>;
}

/// Fetcher backed by a `reqwest` client.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Creates a fetcher with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Creates a fetcher sending the given user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ResolveResult<Value>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| ResolveError::retrieval(url, e.to_string()))?;

            response
                .json::<Value>()
                .await
                .map_err(|e| ResolveError::retrieval(url, format!("invalid JSON body: {e}")))
        })
    }
}

/// Fetcher serving canned documents, for tests.
///
/// Clones share the call log.
///
/// # Example
///
/// ```
/// use daedalus_directives::fetch::{Fetcher, MockFetcher};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let fetcher = MockFetcher::new().respond("https://api.test/user", json!({"name": "Ada"}));
///
/// let doc = fetcher.fetch("https://api.test/user").await.unwrap();
/// assert_eq!(doc["name"], "Ada");
/// assert_eq!(fetcher.calls(), ["https://api.test/user"]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: IndexMap<String, Result<Value, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Creates a fetcher with no responses configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `document` for `url`.
    #[must_use]
    pub fn respond(mut self, url: impl Into<String>, document: Value) -> Self {
        self.responses.insert(url.into(), Ok(document));
        self
    }

    /// Fails retrievals of `url` with `message`.
    #[must_use]
    pub fn fail(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Err(message.into()));
        self
    }

    /// Returns every requested URL in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many retrievals were attempted.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ResolveResult<Value>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let outcome = match self.responses.get(url) {
            Some(Ok(document)) => Ok(document.clone()),
            Some(Err(message)) => Err(ResolveError::retrieval(url, message.clone())),
            None => Err(ResolveError::retrieval(url, "no response configured")),
        };
        Box::pin(async move { outcome })
    }
}
