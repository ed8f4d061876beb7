//! Schema descriptors.
//!
//! A [`Schema`] is a set of record types ([`TypeDescriptor`]), each holding an
//! ordered table of fields ([`FieldDescriptor`]). Fields and types carry the
//! [`Annotation`]s declared on them, in declaration order.
//!
//! Parsing schema text is someone else's job; this module only models the
//! result and offers builders to construct it in code.
//!
//! # Example
//!
//! ```
//! use daedalus_core::schema::{Annotation, FieldDescriptor, Schema, TypeDescriptor};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .add_type(
//!         TypeDescriptor::builder("Book")
//!             .annotate(Annotation::new("uniqueId").param("field", "id"))
//!             .field(FieldDescriptor::property("id"))
//!             .field(
//!                 FieldDescriptor::property("title")
//!                     .annotate(Annotation::new("length").param("max", 30)),
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let book = schema.get_type("Book").unwrap();
//! assert_eq!(book.fields().count(), 2);
//! assert_eq!(book.field("title").unwrap().annotations()[0].get("max"), Some(&json!(30)));
//! ```

use crate::error::CompileError;
use crate::resolver::{PropertyResolver, SharedResolver};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A directive applied to a field or a type, with its literal parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    name: String,
    params: Map<String, Value>,
}

impl Annotation {
    /// Creates an annotation with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns the directive name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all parameters.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns one parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// One declared field of a record type.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    base: SharedResolver,
    annotations: Vec<Annotation>,
}

impl FieldDescriptor {
    /// Creates a field with an explicit base resolver.
    #[must_use]
    pub fn new(name: impl Into<String>, base: SharedResolver) -> Self {
        Self {
            name: name.into(),
            base,
            annotations: Vec::new(),
        }
    }

    /// Creates a field whose base resolver reads the same-named property of the parent.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        let name = name.into();
        let base = Arc::new(PropertyResolver::new(name.clone()));
        Self::new(name, base)
    }

    /// Attaches an annotation. Order of calls is preserved.
    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unannotated resolver.
    #[must_use]
    pub fn base(&self) -> &SharedResolver {
        &self.base
    }

    /// Returns the attached annotations in declaration order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the first annotation with the given directive name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

/// One declared record type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    annotations: Vec<Annotation>,
}

impl TypeDescriptor {
    /// Starts building a type.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Iterates over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Returns the type-level annotations.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    annotations: Vec<Annotation>,
}

impl TypeBuilder {
    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Attaches a type-level annotation.
    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Builds the type, rejecting duplicate field names.
    pub fn build(self) -> Result<TypeDescriptor, CompileError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            if fields.contains_key(field.name()) {
                return Err(CompileError::DuplicateField {
                    type_name: self.name,
                    field: field.name,
                });
            }
            fields.insert(field.name.clone(), field);
        }

        Ok(TypeDescriptor {
            name: self.name,
            fields,
            annotations: self.annotations,
        })
    }
}

/// A set of record types.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: IndexMap<String, TypeDescriptor>,
}

impl Schema {
    /// Starts building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Returns a type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Iterates over types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeBuilder>,
}

impl SchemaBuilder {
    /// Adds a type.
    #[must_use]
    pub fn add_type(mut self, ty: TypeBuilder) -> Self {
        self.types.push(ty);
        self
    }

    /// Builds the schema, rejecting duplicate type or field names.
    pub fn build(self) -> Result<Schema, CompileError> {
        let mut types = IndexMap::with_capacity(self.types.len());
        for builder in self.types {
            let ty = builder.build()?;
            if types.contains_key(ty.name()) {
                return Err(CompileError::DuplicateType { type_name: ty.name });
            }
            types.insert(ty.name.clone(), ty);
        }
        Ok(Schema { types })
    }
}
