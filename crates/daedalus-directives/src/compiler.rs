//! The chain compiler.
//!
//! [`Compiler::compile`] turns an annotated [`Schema`] into a
//! [`CompiledSchema`] in one pass over the driver order:
//!
//! ```text
//! for directive in order:
//!     for every site annotated with directive:
//!         field.resolver = behavior(params).wrap(field.resolver)
//! ```
//!
//! This is a left fold, so the directive applied last is the outermost layer:
//! it runs first at request time and decides whether the layers inside it run
//! at all. With the default order, `@auth` wraps `@fetch`, so an unauthorized
//! caller never triggers a retrieval.
//!
//! Compilation performs no I/O and either yields a complete schema or fails
//! with a [`CompileError`] before any request is served.

use crate::behavior::{Behavior, Next};
use crate::params::DirectiveSite;
use crate::registry::{names, Application, DirectiveLocation, DirectiveRegistry};
use daedalus_core::resolver::Resolve;
use daedalus_core::schema::{Annotation, TypeDescriptor};
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, FieldError, ResolveError, ResolveResult,
    Schema, SharedResolver,
};
use daedalus_telemetry::record_compilation;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Default application order, innermost first.
///
/// `@uniqueId` replaces resolvers, so it goes first and everything else wraps
/// the generator. `@inject` and `@date` sit next to the base resolver, the
/// result checks come next, and `@auth` is outermost so it guards `@fetch`.
pub const DEFAULT_ORDER: &[&str] = &[
    names::UNIQUE_ID,
    names::INJECT,
    names::DATE,
    names::LENGTH,
    names::UPPER,
    names::FETCH,
    names::AUTH,
];

/// Compiles annotated schemas against a registry and an application order.
///
/// # Example
///
/// ```
/// use daedalus_core::schema::{Annotation, FieldDescriptor, Schema, TypeDescriptor};
/// use daedalus_directives::fetch::MockFetcher;
/// use daedalus_directives::{Compiler, DirectiveRegistry};
/// use std::sync::Arc;
///
/// let schema = Schema::builder()
///     .add_type(
///         TypeDescriptor::builder("Query")
///             .field(FieldDescriptor::property("hello").annotate(Annotation::new("upper"))),
///     )
///     .build()
///     .unwrap();
///
/// let registry = DirectiveRegistry::builtin(Arc::new(MockFetcher::new()));
/// let compiled = Compiler::new(registry).compile(&schema).unwrap();
///
/// assert_eq!(compiled.field("Query", "hello").unwrap().layer_names(), ["upper"]);
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: DirectiveRegistry,
    order: Vec<String>,
}

impl Compiler {
    /// Creates a compiler using [`DEFAULT_ORDER`].
    #[must_use]
    pub fn new(registry: DirectiveRegistry) -> Self {
        Self {
            registry,
            order: DEFAULT_ORDER.iter().map(ToString::to_string).collect(),
        }
    }

    /// Sets the application order, innermost first.
    #[must_use]
    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the application order.
    #[must_use]
    pub fn directive_order(&self) -> &[String] {
        &self.order
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    /// Compiles `schema`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] found: an invalid order, an unknown,
    /// unordered or misplaced annotation, or a parameter that fails validation.
    pub fn compile(&self, schema: &Schema) -> Result<CompiledSchema, CompileError> {
        let result = self.try_compile(schema);
        record_compilation(result.is_ok());
        result
    }

    fn try_compile(&self, schema: &Schema) -> Result<CompiledSchema, CompileError> {
        self.check_order()?;
        self.check_annotations(schema)?;

        let mut types: IndexMap<String, CompiledType> = schema
            .types()
            .map(|ty| (ty.name().to_string(), CompiledType::from_descriptor(ty)))
            .collect();

        for directive in &self.order {
            let Some(kind) = self.registry.get(directive) else {
                continue;
            };

            for ty in schema.types() {
                let Some(compiled) = types.get_mut(ty.name()) else {
                    continue;
                };

                match kind.location() {
                    DirectiveLocation::Type => {
                        for annotation in named(ty.annotations(), directive) {
                            let site = DirectiveSite::on_type(directive, ty.name());
                            let application =
                                self.registry.instantiate(kind, &site, annotation.params(), ty)?;
                            compiled.apply(directive, None, application)?;
                        }
                    }
                    DirectiveLocation::Field => {
                        for field in ty.fields() {
                            for annotation in named(field.annotations(), directive) {
                                let site = DirectiveSite::field(directive, ty.name(), field.name());
                                let application = self.registry.instantiate(
                                    kind,
                                    &site,
                                    annotation.params(),
                                    ty,
                                )?;
                                compiled.apply(directive, Some(field.name()), application)?;
                            }
                        }
                    }
                }
            }
        }

        let compiled = CompiledSchema { types };
        info!(
            types = compiled.types.len(),
            fields = compiled.types().map(|t| t.fields.len()).sum::<usize>(),
            layers = compiled.layer_count(),
            order = ?self.order,
            "Schema compiled"
        );
        Ok(compiled)
    }

    fn check_order(&self) -> Result<(), CompileError> {
        let mut seen = IndexSet::with_capacity(self.order.len());
        for directive in &self.order {
            if !self.registry.contains(directive) {
                return Err(CompileError::InvalidOrder {
                    directive: directive.clone(),
                    reason: "not a registered directive".to_string(),
                });
            }
            if !seen.insert(directive.as_str()) {
                return Err(CompileError::InvalidOrder {
                    directive: directive.clone(),
                    reason: "listed more than once".to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_annotations(&self, schema: &Schema) -> Result<(), CompileError> {
        for ty in schema.types() {
            for annotation in ty.annotations() {
                let site = DirectiveSite::on_type(annotation.name(), ty.name());
                self.check_annotation(&site, DirectiveLocation::Type)?;
            }
            for field in ty.fields() {
                for annotation in field.annotations() {
                    let site = DirectiveSite::field(annotation.name(), ty.name(), field.name());
                    self.check_annotation(&site, DirectiveLocation::Field)?;
                }
            }
        }
        Ok(())
    }

    fn check_annotation(
        &self,
        site: &DirectiveSite<'_>,
        location: DirectiveLocation,
    ) -> Result<(), CompileError> {
        let Some(kind) = self.registry.get(site.directive) else {
            return Err(CompileError::UnknownDirective {
                directive: site.directive.to_string(),
                location: site.location(),
            });
        };
        if kind.location() != location {
            return Err(CompileError::WrongLocation {
                directive: site.directive.to_string(),
                location: format!("{location} {}", site.location()),
            });
        }
        if !self.order.iter().any(|d| d == site.directive) {
            return Err(CompileError::UnorderedDirective {
                directive: site.directive.to_string(),
                location: site.location(),
            });
        }
        Ok(())
    }
}

fn named<'a>(
    annotations: &'a [Annotation],
    directive: &'a str,
) -> impl Iterator<Item = &'a Annotation> + 'a {
    annotations.iter().filter(move |a| a.name() == directive)
}

/// A schema whose fields carry their compiled resolver chains.
///
/// Immutable once built and shared by all requests.
#[derive(Debug)]
pub struct CompiledSchema {
    types: IndexMap<String, CompiledType>,
}

impl CompiledSchema {
    /// Returns a compiled type.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&CompiledType> {
        self.types.get(name)
    }

    /// Iterates over compiled types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &CompiledType> {
        self.types.values()
    }

    /// Returns a compiled field.
    #[must_use]
    pub fn field(&self, type_name: &str, field: &str) -> Option<&CompiledField> {
        self.types.get(type_name).and_then(|ty| ty.field(field))
    }

    /// Returns the total number of applied layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.types
            .values()
            .flat_map(|ty| ty.fields.values())
            .map(|f| f.layers.len())
            .sum()
    }

    /// Resolves one field.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownField`] if the field does not exist, or
    /// whatever its chain fails with.
    pub async fn resolve(
        &self,
        type_name: &str,
        field: &str,
        parent: &Value,
        args: Arguments,
        ctx: &mut ExecutionContext,
    ) -> ResolveResult {
        let Some(compiled) = self.field(type_name, field) else {
            return Err(ResolveError::UnknownField {
                type_name: type_name.to_string(),
                field: field.to_string(),
            });
        };
        compiled.resolve(parent, args, ctx).await
    }

    /// Resolves sibling fields of one object, in order.
    ///
    /// A failing field yields `null` in the data and a [`FieldError`]; its
    /// siblings are unaffected.
    pub async fn resolve_object<I, S>(
        &self,
        type_name: &str,
        parent: &Value,
        fields: I,
        ctx: &mut ExecutionContext,
    ) -> ResolvedObject
    where
        I: IntoIterator<Item = (S, Arguments)>,
        S: Into<String>,
    {
        let mut resolved = ResolvedObject::default();
        for (field, args) in fields {
            let field = field.into();
            match self.resolve(type_name, &field, parent, args, ctx).await {
                Ok(value) => {
                    resolved.data.insert(field, value);
                }
                Err(e) => {
                    debug!(
                        request_id = %ctx.request_id(),
                        field_path = %format!("{type_name}.{field}"),
                        error = %e,
                        "Field failed"
                    );
                    resolved.errors.push(e.to_field_error(format!("{type_name}.{field}")));
                    resolved.data.insert(field, Value::Null);
                }
            }
        }
        resolved
    }
}

/// Field results of [`CompiledSchema::resolve_object`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedObject {
    /// Field name to value; `null` for failed fields.
    pub data: Map<String, Value>,
    /// One entry per failed field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ResolvedObject {
    /// Returns `true` if every field resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A compiled record type.
#[derive(Debug)]
pub struct CompiledType {
    name: String,
    fields: IndexMap<String, CompiledField>,
}

impl CompiledType {
    fn from_descriptor(ty: &TypeDescriptor) -> Self {
        let fields = ty
            .fields()
            .map(|field| {
                let compiled = CompiledField {
                    path: format!("{}.{}", ty.name(), field.name()),
                    base: Arc::clone(field.base()),
                    layers: Vec::new(),
                };
                (field.name().to_string(), compiled)
            })
            .collect();
        Self {
            name: ty.name().to_string(),
            fields,
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.get(name)
    }

    /// Iterates over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.values()
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut CompiledField, CompileError> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| CompileError::UnknownField {
                type_name: self.name.clone(),
                field: name.to_string(),
            })
    }

    fn apply(
        &mut self,
        directive: &str,
        annotated_field: Option<&str>,
        application: Application,
    ) -> Result<(), CompileError> {
        match application {
            Application::Wrap(behavior) => {
                let Some(name) = annotated_field else {
                    return Ok(());
                };
                let field = self.field_mut(name)?;
                field.layers.push(behavior);
                debug!(
                    target: "daedalus::compiler",
                    field_path = %field.path,
                    directive,
                    depth = field.layers.len(),
                    "Layer applied"
                );
            }
            Application::Replace { field, resolver } => {
                let field = self.field_mut(&field)?;
                field.base = resolver;
                field.layers.clear();
                debug!(
                    target: "daedalus::compiler",
                    field_path = %field.path,
                    directive,
                    "Resolver replaced"
                );
            }
        }
        Ok(())
    }
}

/// One field's resolver chain: a base resolver and the layers around it.
#[derive(Clone)]
pub struct CompiledField {
    path: String,
    base: SharedResolver,
    layers: Vec<Arc<dyn Behavior>>,
}

impl fmt::Debug for CompiledField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledField")
            .field("path", &self.path)
            .field("layers", &self.layer_names())
            .finish_non_exhaustive()
    }
}

impl CompiledField {
    /// Returns `Type.field`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the directive names of the applied layers, innermost first.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Returns `true` if any layer was applied.
    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        !self.layers.is_empty()
    }

    fn chain(&self) -> Next<'_> {
        self.layers
            .iter()
            .fold(Next::resolver(self.base.as_ref()), |next, layer| {
                Next::new(layer.as_ref(), next)
            })
    }
}

impl Resolve for CompiledField {
    fn resolve<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ResolveResult> {
        self.chain().run(parent, args, ctx)
    }
}
