//! `@uniqueId(field)`: type-scoped identifier generation.
//!
//! Unlike the wrapping behaviors this one rewrites the annotated type's field
//! table: the named field's resolver becomes a [`UniqueIdResolver`].

use crate::params::{string_param, DirectiveSite};
use crate::registry::names;
use daedalus_core::resolver::Resolve;
use daedalus_core::schema::TypeDescriptor;
use daedalus_core::{Arguments, BoxFuture, CompileError, ExecutionContext, ResolveResult};
use daedalus_telemetry::{record_directive, Outcome};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Resolver returning a fresh UUID v4 string on every call.
///
/// Parent and arguments are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueIdResolver;

impl Resolve for UniqueIdResolver {
    fn resolve<'a>(
        &'a self,
        _parent: &'a Value,
        _args: Arguments,
        _ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        record_directive(names::UNIQUE_ID, Outcome::Success);
        let id = Uuid::new_v4().to_string();
        Box::pin(async move { Ok(Value::String(id)) })
    }
}

/// Returns the name of the field to replace, checking it exists on `ty`.
pub(crate) fn target_field(
    site: &DirectiveSite<'_>,
    params: &Map<String, Value>,
    ty: &TypeDescriptor,
) -> Result<String, CompileError> {
    let field = string_param(site, params, "field")?;
    if ty.field(&field).is_none() {
        return Err(CompileError::UnknownField {
            type_name: ty.name().to_string(),
            field,
        });
    }
    Ok(field)
}
