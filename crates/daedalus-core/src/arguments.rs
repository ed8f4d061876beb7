//! Per-call argument bag.
//!
//! [`Arguments`] is passed by value down a resolver chain. Wrappers may add or
//! rewrite keys before handing it to the resolver they wrap, which is how
//! state flows from outer wrappers to inner ones.
//!
//! Payloads retrieved from remote sources do not go into the plain key space.
//! They are pushed onto a typed enrichment slot, tagged with their source, and
//! the base resolver reads them back with [`Arguments::enrichment`].

use serde_json::{Map, Value};

/// Key under which [`Arguments::to_value`] renders the latest enrichment payload.
pub const ENRICHMENT_KEY: &str = "_enrichment";

/// A payload injected into the arguments by a remote retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Where the payload came from.
    pub source: String,
    /// The retrieved JSON document.
    pub payload: Value,
}

/// The arguments of one field call.
///
/// # Example
///
/// ```
/// use daedalus_core::Arguments;
/// use serde_json::json;
///
/// let mut args = Arguments::from_value(json!({"id": 7})).unwrap();
/// args.push_enrichment("https://example.com/user/7", json!({"name": "Ada"}));
///
/// assert_eq!(args.get("id"), Some(&json!(7)));
/// assert_eq!(args.enrichment(), Some(&json!({"name": "Ada"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
    enrichments: Vec<Enrichment>,
}

impl Arguments {
    /// Creates an empty argument bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from a JSON object.
    ///
    /// Returns `None` when `value` is not an object. `null` yields empty arguments.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(values) => Some(Self {
                values,
                enrichments: Vec::new(),
            }),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }

    /// Returns the value of an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a mutable reference to an argument.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    /// Sets an argument, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Returns the plain argument map.
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Records a payload retrieved from `source`.
    pub fn push_enrichment(&mut self, source: impl Into<String>, payload: Value) {
        self.enrichments.push(Enrichment {
            source: source.into(),
            payload,
        });
    }

    /// Returns the most recently injected payload.
    #[must_use]
    pub fn enrichment(&self) -> Option<&Value> {
        self.enrichments.last().map(|e| &e.payload)
    }

    /// Returns the payload injected from a given source.
    #[must_use]
    pub fn enrichment_from(&self, source: &str) -> Option<&Value> {
        self.enrichments
            .iter()
            .rev()
            .find(|e| e.source == source)
            .map(|e| &e.payload)
    }

    /// Returns all payloads in injection order.
    #[must_use]
    pub fn enrichments(&self) -> &[Enrichment] {
        &self.enrichments
    }

    /// Renders the arguments as a JSON object.
    ///
    /// The latest enrichment payload, if any, appears under [`ENRICHMENT_KEY`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut values = self.values.clone();
        if let Some(payload) = self.enrichment() {
            values.insert(ENRICHMENT_KEY.to_string(), payload.clone());
        }
        Value::Object(values)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            enrichments: Vec::new(),
        }
    }
}
