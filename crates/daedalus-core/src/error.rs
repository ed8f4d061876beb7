//! Error types for Daedalus.
//!
//! Two error families exist and never mix:
//!
//! - [`ResolveError`] is produced at request time by a field's resolver chain.
//!   It is terminal for that one field; sibling fields are unaffected.
//! - [`CompileError`] is produced while compiling a schema. It is fatal to
//!   startup: a schema that fails to compile is never served.
//!
//! # Error Codes
//!
//! | `ErrorCategory` | Code |
//! |---|---|
//! | `Validation` | `VALIDATION_ERROR` |
//! | `Authorization` | `AUTHORIZATION_ERROR` |
//! | `Format` | `FORMAT_ERROR` |
//! | `ArgumentShape` | `ARGUMENT_SHAPE_ERROR` |
//! | `Retrieval` | `RETRIEVAL_ERROR` |
//! | `Internal` | `INTERNAL_ERROR` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type returned by every resolver in a chain.
pub type ResolveResult<T = serde_json::Value> = Result<T, ResolveError>;

/// Categories of request-time errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A value violated a declared constraint (length bounds).
    Validation,
    /// The caller's role did not satisfy the required role.
    Authorization,
    /// A value could not be interpreted as a date/time.
    Format,
    /// The call arguments lacked an expected nested structure.
    ArgumentShape,
    /// A remote retrieval failed.
    Retrieval,
    /// The base resolver or the engine failed.
    Internal,
}

impl ErrorCategory {
    /// Returns the stable machine-readable code for this category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authorization => "AUTHORIZATION_ERROR",
            Self::Format => "FORMAT_ERROR",
            Self::ArgumentShape => "ARGUMENT_SHAPE_ERROR",
            Self::Retrieval => "RETRIEVAL_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Request-time failure of a single field's resolver chain.
///
/// # Example
///
/// ```
/// use daedalus_core::{ErrorCategory, ResolveError};
///
/// let err = ResolveError::validation("title", "must be at least 10 characters");
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// A length (or other) constraint was violated.
    #[error("Validation error on '{field}': {message}")]
    Validation {
        /// The field whose value was rejected.
        field: String,
        /// Human-readable error message.
        message: String,
    },

    /// The caller does not hold the required role.
    #[error("Not authorized: requires role '{required}', caller has {}", .actual.as_deref().unwrap_or("no role"))]
    Authorization {
        /// The role the field requires.
        required: String,
        /// The role the caller claimed, if any.
        actual: Option<String>,
    },

    /// A value could not be parsed or formatted as a date/time.
    #[error("Format error for value {value}: {message}")]
    Format {
        /// The offending value, rendered as JSON.
        value: String,
        /// Human-readable error message.
        message: String,
    },

    /// The call arguments did not have the expected shape.
    #[error("Argument shape error on '{field}': {message}")]
    ArgumentShape {
        /// The field whose arguments were malformed.
        field: String,
        /// Human-readable error message.
        message: String,
    },

    /// A remote retrieval failed.
    #[error("Retrieval from {url} failed: {message}")]
    Retrieval {
        /// The address that was being retrieved.
        url: String,
        /// Human-readable error message.
        message: String,
    },

    /// The base resolver reported a failure.
    #[error("Resolver error: {message}")]
    Resolver {
        /// Human-readable error message.
        message: String,
    },

    /// The engine was asked to resolve a field that does not exist.
    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField {
        /// The type that was looked up.
        type_name: String,
        /// The missing field.
        field: String,
    },
}

impl ResolveError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(required: impl Into<String>, actual: Option<&str>) -> Self {
        Self::Authorization {
            required: required.into(),
            actual: actual.map(ToString::to_string),
        }
    }

    /// Creates a format error for the given value.
    #[must_use]
    pub fn format(value: &serde_json::Value, message: impl Into<String>) -> Self {
        Self::Format {
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Creates an argument shape error.
    #[must_use]
    pub fn argument_shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArgumentShape {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a retrieval error.
    #[must_use]
    pub fn retrieval(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Retrieval {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a base resolver error.
    #[must_use]
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver {
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Format { .. } => ErrorCategory::Format,
            Self::ArgumentShape { .. } => ErrorCategory::ArgumentShape,
            Self::Retrieval { .. } => ErrorCategory::Retrieval,
            Self::Resolver { .. } | Self::UnknownField { .. } => ErrorCategory::Internal,
        }
    }

    /// Converts this error into a field-level failure envelope.
    #[must_use]
    pub fn to_field_error(&self, path: impl Into<String>) -> FieldError {
        FieldError {
            path: path.into(),
            code: self.category().code().to_string(),
            category: self.category(),
            message: self.to_string(),
        }
    }
}

/// Serializable field-level failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// `Type.field` path of the failed field.
    pub path: String,
    /// Machine-readable error code.
    pub code: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
}

/// Schema compilation failure.
///
/// Raised only while compiling; a request never observes one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An annotation names a directive that is not registered.
    #[error("Unknown directive '@{directive}' on {location}")]
    UnknownDirective {
        /// The directive name.
        directive: String,
        /// Where it was attached (`Type` or `Type.field`).
        location: String,
    },

    /// A registered directive is used in the schema but absent from the driver order.
    #[error("Directive '@{directive}' is used on {location} but missing from the compiler order")]
    UnorderedDirective {
        /// The directive name.
        directive: String,
        /// Where it was attached.
        location: String,
    },

    /// The driver order names a directive more than once, or names an unknown one.
    #[error("Invalid compiler order entry '{directive}': {reason}")]
    InvalidOrder {
        /// The offending entry.
        directive: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A field directive was attached to a type, or vice versa.
    #[error("Directive '@{directive}' cannot be applied to {location}")]
    WrongLocation {
        /// The directive name.
        directive: String,
        /// Where it was attached.
        location: String,
    },

    /// A required directive parameter was not supplied.
    #[error("Directive '@{directive}' on {location} is missing required parameter '{parameter}'")]
    MissingParameter {
        /// The directive name.
        directive: String,
        /// Where it was attached.
        location: String,
        /// The missing parameter.
        parameter: String,
    },

    /// A parameter was supplied that the directive does not declare.
    #[error("Directive '@{directive}' on {location} has no parameter '{parameter}'")]
    UnknownParameter {
        /// The directive name.
        directive: String,
        /// Where it was attached.
        location: String,
        /// The undeclared parameter.
        parameter: String,
    },

    /// A parameter value failed validation.
    #[error("Invalid parameter '{parameter}' for '@{directive}' on {location}: {reason}")]
    InvalidParameter {
        /// The directive name.
        directive: String,
        /// Where it was attached.
        location: String,
        /// The parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A type-scoped directive named a field the type does not have.
    #[error("Type '{type_name}' has no field '{field}'")]
    UnknownField {
        /// The annotated type.
        type_name: String,
        /// The missing field.
        field: String,
    },

    /// A type declared the same field twice.
    #[error("Field '{field}' is declared more than once on type '{type_name}'")]
    DuplicateField {
        /// The type.
        type_name: String,
        /// The repeated field.
        field: String,
    },

    /// The schema declared the same type twice.
    #[error("Type '{type_name}' is declared more than once")]
    DuplicateType {
        /// The repeated type.
        type_name: String,
    },
}
