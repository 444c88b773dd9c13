//! Entity metadata: property descriptions, per-entity configuration, and
//! the model store consulted by the statement builders.

mod config;
mod scope;

pub use config::{ColumnType, EntityConfiguration, Model, SqlDataType};
pub use scope::{scoped_properties, StatementKind};
pub(crate) use scope::scoped_slice;

use crate::value::Value;

/// Declared type of an entity property.
///
/// Only primitive, string-like, and nullable-primitive types map to
/// columns; everything else is carried as [`PropertyKind::Other`] and
/// rejected during column scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Int16,
    Int32,
    Int64,
    Float,
    Decimal,
    String,
    Bytes,
    Uuid,
    DateTime,
    /// Any type the compiler cannot bind (navigation properties,
    /// collections, nested objects). Carries the declared type name.
    Other(&'static str),
}

/// A single property of an entity type: name plus declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub kind: PropertyKind,
    /// Whether the host type is nullable (e.g. `Option<i64>`).
    pub nullable: bool,
}

impl Property {
    /// A required property of the given kind.
    pub const fn new(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// A nullable property of the given kind.
    pub const fn nullable(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// The entity-side half of the property-accessor capability: enumerate a
/// type's properties and read their values off an instance.
pub trait Entity {
    /// The entity type name, used to look up configuration and aliases.
    fn entity_name() -> &'static str;

    /// The declared properties, in declaration order.
    fn properties() -> &'static [Property];

    /// Read a property value. `None` means the property does not exist;
    /// a SQL-null value is `Some(Value::Null)`.
    fn get(&self, property: &str) -> Option<Value>;
}
