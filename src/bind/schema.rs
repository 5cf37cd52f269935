//! Declared target shapes.
//!
//! Binding is driven by an explicit schema rather than by inspecting the
//! target type: every entity lists its fields with their shape and whether
//! they must be present.

use std::fmt;

use serde::de::DeserializeOwned;

/// The declared type of a scalar field.
///
/// `String`, `Integer`, `Float` and `Boolean` are parsed directly. `Named`
/// tags are converted by whatever function is registered for them on the
/// [`Binder`](super::Binder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    Named(&'static str),
}

impl TypeTag {
    /// ISO-8601 date-time with offset, see [`convert_date_time`](super::convert_date_time).
    pub const DATE_TIME: TypeTag = TypeTag::Named("date-time");

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Named(name) => name,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeTag::Named(_))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(TypeTag),
    Entity(EntitySchema),
    /// Keyed by the path segment following the field name.
    Map(Box<Shape>),
    /// Indexed by a numeric path segment, ordered by index.
    List(Box<Shape>),
}

impl Shape {
    pub fn map_of(element: Shape) -> Self {
        Shape::Map(Box::new(element))
    }

    pub fn list_of(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
}

impl FieldSpec {
    pub fn optional(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }

    pub fn required(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }
}

/// The field list of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// A root entity bound from every key under `prefix`.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub prefix: String,
    pub schema: EntitySchema,
}

impl Target {
    pub fn new(prefix: impl Into<String>, schema: EntitySchema) -> Self {
        Self {
            prefix: prefix.into(),
            schema,
        }
    }
}

/// A type that declares the shape it is bound from.
///
/// Field names in the schema must match the names the type deserializes
/// from, since the binder hands its result to serde.
pub trait Bindable: DeserializeOwned {
    fn target() -> Target;
}
