//! Directive registration.
//!
//! The [`DirectiveRegistry`] maps directive names to a closed set of
//! [`DirectiveKind`]s. It is built once at startup and consulted by the
//! compiler; a name that is not registered fails compilation.
//!
//! Applications add their own behaviors through [`DirectiveKind::Custom`].
//!
//! # Example
//!
//! ```
//! use daedalus_directives::fetch::MockFetcher;
//! use daedalus_directives::registry::{names, DirectiveKind, DirectiveRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = DirectiveRegistry::builtin(Arc::new(MockFetcher::new()));
//! assert!(registry.contains(names::AUTH));
//!
//! // A second `@auth`, under its own name so it can be ordered independently.
//! registry.register("staffOnly", DirectiveKind::Auth);
//! assert_eq!(registry.len(), 8);
//! ```

use crate::behavior::Behavior;
use crate::behaviors::{
    unique_id, AuthBehavior, DateBehavior, DateSettings, FetchBehavior, InjectBehavior,
    LengthBehavior, UniqueIdResolver, UpperBehavior,
};
use crate::fetch::Fetcher;
use crate::params::{self, DirectiveSite, ParamKind, ParamSpec};
use daedalus_core::schema::TypeDescriptor;
use daedalus_core::{CompileError, SharedResolver};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Built-in directive names.
pub mod names {
    /// `@upper`
    pub const UPPER: &str = "upper";
    /// `@length(min, max)`
    pub const LENGTH: &str = "length";
    /// `@date(format)`
    pub const DATE: &str = "date";
    /// `@fetch(url)`
    pub const FETCH: &str = "fetch";
    /// `@auth(role)`
    pub const AUTH: &str = "auth";
    /// `@uniqueId(field)`
    pub const UNIQUE_ID: &str = "uniqueId";
    /// `@inject(name, value)`
    pub const INJECT: &str = "inject";
}

/// Where a directive may be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveLocation {
    /// On a field.
    Field,
    /// On a type.
    Type,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// An application-defined field directive.
///
/// # Example
///
/// ```ignore
/// struct Trim;
///
/// impl CustomDirective for Trim {
///     fn instantiate(
///         &self,
///         _site: &DirectiveSite<'_>,
///         _params: &Map<String, Value>,
///     ) -> Result<Arc<dyn Behavior>, CompileError> {
///         Ok(Arc::new(TrimBehavior))
///     }
/// }
///
/// registry.register("trim", DirectiveKind::Custom(Arc::new(Trim)));
/// ```
pub trait CustomDirective: Send + Sync + 'static {
    /// Declares the accepted parameters. None by default.
    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Builds the behavior for one annotated field.
    ///
    /// `params` has already been validated against [`Self::parameters`].
    fn instantiate(
        &self,
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
    ) -> Result<Arc<dyn Behavior>, CompileError>;
}

/// The behavior a registered name stands for.
#[derive(Clone)]
pub enum DirectiveKind {
    /// Upper-case string results.
    Upper,
    /// Bound string length.
    Length,
    /// Format results as dates.
    Date,
    /// Enrich arguments with a remote document.
    Fetch,
    /// Require a caller role.
    Auth,
    /// Replace a type's field with an identifier generator.
    UniqueId,
    /// Inject a constant into `args.input`.
    Inject,
    /// Application-defined field behavior.
    Custom(Arc<dyn CustomDirective>),
}

impl fmt::Debug for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => write!(f, "Upper"),
            Self::Length => write!(f, "Length"),
            Self::Date => write!(f, "Date"),
            Self::Fetch => write!(f, "Fetch"),
            Self::Auth => write!(f, "Auth"),
            Self::UniqueId => write!(f, "UniqueId"),
            Self::Inject => write!(f, "Inject"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl DirectiveKind {
    /// Returns where this directive may be attached.
    #[must_use]
    pub const fn location(&self) -> DirectiveLocation {
        match self {
            Self::UniqueId => DirectiveLocation::Type,
            _ => DirectiveLocation::Field,
        }
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn parameters(&self) -> Vec<ParamSpec> {
        match self {
            Self::Upper => Vec::new(),
            Self::Length => vec![
                ParamSpec::optional("min", ParamKind::NonNegativeInteger),
                ParamSpec::optional("max", ParamKind::NonNegativeInteger),
            ],
            Self::Date => vec![ParamSpec::optional("format", ParamKind::String)],
            Self::Fetch => vec![ParamSpec::required("url", ParamKind::String)],
            Self::Auth => vec![ParamSpec::required("role", ParamKind::String)],
            Self::UniqueId => vec![ParamSpec::required("field", ParamKind::String)],
            Self::Inject => vec![
                ParamSpec::required("name", ParamKind::String),
                ParamSpec::required("value", ParamKind::Any),
            ],
            Self::Custom(custom) => custom.parameters(),
        }
    }
}

/// What applying one annotation does to a field.
pub(crate) enum Application {
    /// Push a wrapping layer onto the annotated field.
    Wrap(Arc<dyn Behavior>),
    /// Replace a field's resolver and drop the layers applied so far.
    Replace {
        field: String,
        resolver: SharedResolver,
    },
}

/// Name-keyed table of directives, plus the collaborators they need.
#[derive(Clone)]
pub struct DirectiveRegistry {
    kinds: IndexMap<String, DirectiveKind>,
    fetcher: Arc<dyn Fetcher>,
    date: DateSettings,
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("kinds", &self.kinds)
            .field("fetcher", &self.fetcher)
            .field("date", &self.date)
            .finish()
    }
}

impl DirectiveRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            kinds: IndexMap::new(),
            fetcher,
            date: DateSettings::default(),
        }
    }

    /// Creates a registry with every built-in directive under its standard name.
    #[must_use]
    pub fn builtin(fetcher: Arc<dyn Fetcher>) -> Self {
        let mut registry = Self::new(fetcher);
        registry.register(names::UPPER, DirectiveKind::Upper);
        registry.register(names::LENGTH, DirectiveKind::Length);
        registry.register(names::DATE, DirectiveKind::Date);
        registry.register(names::FETCH, DirectiveKind::Fetch);
        registry.register(names::AUTH, DirectiveKind::Auth);
        registry.register(names::UNIQUE_ID, DirectiveKind::UniqueId);
        registry.register(names::INJECT, DirectiveKind::Inject);
        registry
    }

    /// Replaces the date settings.
    #[must_use]
    pub fn with_date_settings(mut self, settings: DateSettings) -> Self {
        self.date = settings;
        self
    }

    /// Replaces the fetcher handed to `@fetch` layers.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Registers `kind` under `name`, returning the kind it replaced.
    pub fn register(&mut self, name: impl Into<String>, kind: DirectiveKind) -> Option<DirectiveKind> {
        self.kinds.insert(name.into(), kind)
    }

    /// Looks up a directive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DirectiveKind> {
        self.kinds.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Iterates over registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Returns the number of registered directives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Returns the fetcher handed to `@fetch` layers.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Returns the date settings.
    #[must_use]
    pub fn date_settings(&self) -> &DateSettings {
        &self.date
    }

    /// Validates an annotation's parameters and builds what it applies.
    pub(crate) fn instantiate(
        &self,
        kind: &DirectiveKind,
        site: &DirectiveSite<'_>,
        given: &Map<String, Value>,
        ty: &TypeDescriptor,
    ) -> Result<Application, CompileError> {
        let params = params::validate(site, &kind.parameters(), given)?;

        let behavior: Arc<dyn Behavior> = match kind {
            DirectiveKind::Upper => Arc::new(UpperBehavior),
            DirectiveKind::Length => Arc::new(LengthBehavior::from_params(site, &params)?),
            DirectiveKind::Date => Arc::new(DateBehavior::from_params(site, &params, &self.date)?),
            DirectiveKind::Fetch => Arc::new(FetchBehavior::from_params(
                site,
                &params,
                Arc::clone(&self.fetcher),
            )?),
            DirectiveKind::Auth => Arc::new(AuthBehavior::from_params(site, &params)?),
            DirectiveKind::Inject => Arc::new(InjectBehavior::from_params(site, &params)?),
            DirectiveKind::Custom(custom) => custom.instantiate(site, &params)?,
            DirectiveKind::UniqueId => {
                return Ok(Application::Replace {
                    field: unique_id::target_field(site, &params, ty)?,
                    resolver: Arc::new(UniqueIdResolver),
                });
            }
        };
        Ok(Application::Wrap(behavior))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;
    use daedalus_core::schema::FieldDescriptor;
    use serde_json::json;

    fn registry() -> DirectiveRegistry {
        DirectiveRegistry::builtin(Arc::new(MockFetcher::new()))
    }

    fn book() -> TypeDescriptor {
        TypeDescriptor::builder("Book")
            .field(FieldDescriptor::property("id"))
            .field(FieldDescriptor::property("title"))
            .build()
            .unwrap()
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_builtin_names() {
        let registry = registry();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            ["upper", "length", "date", "fetch", "auth", "uniqueId", "inject"]
        );
        assert_eq!(registry.get(names::UNIQUE_ID).unwrap().location(), DirectiveLocation::Type);
        assert_eq!(registry.get(names::UPPER).unwrap().location(), DirectiveLocation::Field);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = registry();
        assert!(registry.register(names::UPPER, DirectiveKind::Upper).is_some());
        assert!(registry.register("shout", DirectiveKind::Upper).is_none());
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_instantiate_wraps() {
        let registry = registry();
        let site = DirectiveSite::field(names::LENGTH, "Book", "title");
        let app = registry
            .instantiate(&DirectiveKind::Length, &site, &params(json!({"max": 5})), &book())
            .unwrap();
        assert!(matches!(app, Application::Wrap(b) if b.name() == names::LENGTH));
    }

    #[test]
    fn test_instantiate_validates_parameters() {
        let registry = registry();
        let site = DirectiveSite::field(names::AUTH, "Book", "title");
        let err = registry
            .instantiate(&DirectiveKind::Auth, &site, &Map::new(), &book())
            .err()
            .unwrap();
        assert!(matches!(err, CompileError::MissingParameter { parameter, .. } if parameter == "role"));
    }

    #[test]
    fn test_instantiate_unique_id_replaces() {
        let registry = registry();
        let site = DirectiveSite::on_type(names::UNIQUE_ID, "Book");
        let app = registry
            .instantiate(&DirectiveKind::UniqueId, &site, &params(json!({"field": "id"})), &book())
            .unwrap();
        assert!(matches!(app, Application::Replace { field, .. } if field == "id"));
    }

    #[test]
    fn test_date_settings_reach_behaviors() {
        let mut settings = DateSettings::default();
        settings.patterns.insert("compact".into(), "%Y%m%d".into());
        let registry = registry().with_date_settings(settings);
        let site = DirectiveSite::field(names::DATE, "Book", "title");

        let given = params(json!({"format": "compact"}));
        assert!(registry.instantiate(&DirectiveKind::Date, &site, &given, &book()).is_ok());
        let given = params(json!({"format": "nope"}));
        assert!(registry.instantiate(&DirectiveKind::Date, &site, &given, &book()).is_err());
    }
}
