//! `@length(min, max)`: bounds on string length.
//!
//! Length is counted in Unicode scalar values. Non-string and null results
//! are not checked.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::params::{usize_param, DirectiveSite};
use crate::registry::names;
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, ResolveError, ResolveResult,
};
use serde_json::{Map, Value};

/// Rejects string results shorter than `min` or longer than `max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthBehavior {
    field: String,
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthBehavior {
    /// Creates a validator for `field`.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidParameter` when `max < min`.
    pub fn new(
        site: &DirectiveSite<'_>,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<Self, CompileError> {
        if let (Some(min), Some(max)) = (min, max) {
            if max < min {
                return Err(site.invalid("max", format!("{max} is smaller than min {min}")));
            }
        }
        Ok(Self {
            field: site.field.unwrap_or(site.type_name).to_string(),
            min,
            max,
        })
    }

    /// Builds the validator from validated parameters.
    pub(crate) fn from_params(
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
    ) -> Result<Self, CompileError> {
        let min = usize_param(site, params, "min")?;
        let max = usize_param(site, params, "max")?;
        Self::new(site, min, max)
    }

    fn check(&self, value: &Value) -> Result<(), ResolveError> {
        let Value::String(text) = value else {
            return Ok(());
        };
        let length = text.chars().count();

        if let Some(min) = self.min {
            if length < min {
                return Err(ResolveError::validation(
                    &self.field,
                    format!("must be at least {min} characters long, got {length}"),
                ));
            }
        }
        if let Some(max) = self.max {
            if length > max {
                return Err(ResolveError::validation(
                    &self.field,
                    format!("must be no more than {max} characters long, got {length}"),
                ));
            }
        }
        Ok(())
    }
}

impl Behavior for LengthBehavior {
    fn name(&self) -> &str {
        names::LENGTH
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            let result = next
                .run(parent, args, ctx)
                .await
                .and_then(|value| self.check(&value).map(|()| value));
            observed(self.name(), result)
        })
    }
}
