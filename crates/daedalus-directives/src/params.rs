//! Declared directive parameters and their compile-time validation.
//!
//! Every directive declares the parameters it accepts. When the compiler meets
//! an annotation it checks the supplied literals against that declaration:
//! unknown names, missing required values and wrongly-kinded values are all
//! [`CompileError`]s. Defaults are filled in here, so behaviors only ever see
//! a complete parameter map.

use daedalus_core::CompileError;
use serde_json::{Map, Value};

/// The kind of literal a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON integer `>= 0`.
    NonNegativeInteger,
    /// Any JSON literal.
    Any,
}

impl ParamKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::NonNegativeInteger => value.as_u64().is_some(),
            Self::Any => true,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::NonNegativeInteger => "a non-negative integer",
            Self::Any => "any value",
        }
    }
}

/// Declaration of one directive parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Accepted kind.
    pub kind: ParamKind,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Value used when the parameter is omitted.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A parameter that must be supplied.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    /// A parameter that may be omitted.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    /// An optional parameter with a default value.
    #[must_use]
    pub fn with_default(name: impl Into<String>, kind: ParamKind, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: Some(default),
        }
    }
}

/// Where an annotation was found, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSite<'a> {
    /// The directive name.
    pub directive: &'a str,
    /// The annotated type (or the field's owning type).
    pub type_name: &'a str,
    /// The annotated field, for field annotations.
    pub field: Option<&'a str>,
}

impl<'a> DirectiveSite<'a> {
    /// A field annotation site.
    #[must_use]
    pub const fn field(directive: &'a str, type_name: &'a str, field: &'a str) -> Self {
        Self {
            directive,
            type_name,
            field: Some(field),
        }
    }

    /// A type annotation site.
    #[must_use]
    pub const fn on_type(directive: &'a str, type_name: &'a str) -> Self {
        Self {
            directive,
            type_name,
            field: None,
        }
    }

    /// Returns `Type.field` or `Type`.
    #[must_use]
    pub fn location(&self) -> String {
        match self.field {
            Some(field) => format!("{}.{field}", self.type_name),
            None => self.type_name.to_string(),
        }
    }

    /// Builds an [`CompileError::InvalidParameter`] for this site.
    #[must_use]
    pub fn invalid(&self, parameter: &str, reason: impl Into<String>) -> CompileError {
        CompileError::InvalidParameter {
            directive: self.directive.to_string(),
            location: self.location(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validates supplied parameters against their declarations.
///
/// Returns the complete parameter map with defaults applied.
pub fn validate(
    site: &DirectiveSite<'_>,
    declared: &[ParamSpec],
    given: &Map<String, Value>,
) -> Result<Map<String, Value>, CompileError> {
    if let Some(unknown) = given.keys().find(|k| !declared.iter().any(|s| &s.name == *k)) {
        return Err(CompileError::UnknownParameter {
            directive: site.directive.to_string(),
            location: site.location(),
            parameter: unknown.clone(),
        });
    }

    let mut resolved = Map::new();
    for param in declared {
        match given.get(&param.name) {
            Some(value) if param.kind.accepts(value) => {
                resolved.insert(param.name.clone(), value.clone());
            }
            Some(value) => {
                return Err(site.invalid(
                    &param.name,
                    format!("expected {}, got {value}", param.kind.describe()),
                ));
            }
            None => {
                if let Some(default) = &param.default {
                    resolved.insert(param.name.clone(), default.clone());
                } else if param.required {
                    return Err(CompileError::MissingParameter {
                        directive: site.directive.to_string(),
                        location: site.location(),
                        parameter: param.name.clone(),
                    });
                }
            }
        }
    }

    Ok(resolved)
}

/// Reads a validated string parameter.
pub(crate) fn string_param(
    site: &DirectiveSite<'_>,
    params: &Map<String, Value>,
    name: &str,
) -> Result<String, CompileError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| site.invalid(name, "expected a string"))
}

/// Reads an optional validated non-negative integer parameter.
pub(crate) fn usize_param(
    site: &DirectiveSite<'_>,
    params: &Map<String, Value>,
    name: &str,
) -> Result<Option<usize>, CompileError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| site.invalid(name, "expected a non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> DirectiveSite<'static> {
        DirectiveSite::field("length", "Book", "title")
    }

    fn given(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_site_location() {
        assert_eq!(site().location(), "Book.title");
        assert_eq!(DirectiveSite::on_type("uniqueId", "Book").location(), "Book");
    }

    #[test]
    fn test_defaults_are_applied() {
        let declared = [ParamSpec::with_default("format", ParamKind::String, json!("isoDate"))];
        let resolved = validate(&site(), &declared, &Map::new()).unwrap();
        assert_eq!(resolved.get("format"), Some(&json!("isoDate")));
    }

    #[test]
    fn test_missing_required() {
        let declared = [ParamSpec::required("role", ParamKind::String)];
        let err = validate(&site(), &declared, &Map::new()).unwrap_err();
        assert!(matches!(err, CompileError::MissingParameter { parameter, .. } if parameter == "role"));
    }

    #[test]
    fn test_unknown_parameter() {
        let declared = [ParamSpec::optional("min", ParamKind::NonNegativeInteger)];
        let err = validate(&site(), &declared, &given(json!({"mni": 3}))).unwrap_err();
        assert!(matches!(err, CompileError::UnknownParameter { parameter, .. } if parameter == "mni"));
    }

    #[test]
    fn test_kind_mismatch() {
        let declared = [ParamSpec::optional("min", ParamKind::NonNegativeInteger)];
        for bad in [json!(-1), json!("3"), json!(1.5)] {
            let err = validate(&site(), &declared, &given(json!({ "min": bad }))).unwrap_err();
            assert!(matches!(err, CompileError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn test_optional_absent_is_omitted() {
        let declared = [ParamSpec::optional("max", ParamKind::NonNegativeInteger)];
        let resolved = validate(&site(), &declared, &Map::new()).unwrap();
        assert!(resolved.is_empty());
        assert_eq!(usize_param(&site(), &resolved, "max"), Ok(None));
    }
}
