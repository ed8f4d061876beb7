//! `@inject(name, value)`: sets `args.input[name]` before resolving.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::params::{string_param, DirectiveSite};
use crate::registry::names;
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, ResolveError, ResolveResult,
};
use serde_json::{Map, Value};

/// Argument key the injected value is written under.
pub const INPUT_ARGUMENT: &str = "input";

/// Writes a constant into the `input` argument object.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectBehavior {
    field: String,
    name: String,
    value: Value,
}

impl InjectBehavior {
    /// Creates an injector for `field` setting `input[name] = value`.
    #[must_use]
    pub fn new(field: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            value,
        }
    }

    pub(crate) fn from_params(
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
    ) -> Result<Self, CompileError> {
        let name = string_param(site, params, "name")?;
        let value = params.get("value").cloned().unwrap_or(Value::Null);
        Ok(Self::new(site.field.unwrap_or(site.type_name), name, value))
    }

    fn apply(&self, args: &mut Arguments) -> Result<(), ResolveError> {
        let input = args
            .get_mut(INPUT_ARGUMENT)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                ResolveError::argument_shape(
                    &self.field,
                    format!("expected `{INPUT_ARGUMENT}` argument to be an object"),
                )
            })?;
        input.insert(self.name.clone(), self.value.clone());
        Ok(())
    }
}

impl Behavior for InjectBehavior {
    fn name(&self) -> &str {
        names::INJECT
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        mut args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            if let Err(e) = self.apply(&mut args) {
                return observed(self.name(), Err(e));
            }
            let result = next.run(parent, args, ctx).await;
            observed(self.name(), result)
        })
    }
}
