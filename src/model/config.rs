//! Per-entity configuration and the model store.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// T-SQL column data types the parameter factory can stamp onto a
/// parameter descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDataType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Real,
    Decimal,
    VarChar,
    NVarChar,
    VarBinary,
    Date,
    Time,
    DateTime2,
    UniqueIdentifier,
}

/// An explicit column type override: data type plus optional size,
/// precision, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub data_type: SqlDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

impl ColumnType {
    /// A plain column type with no size or precision.
    pub fn new(data_type: SqlDataType) -> Self {
        Self {
            data_type,
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// Set the size (length) component, e.g. `varchar(50)`.
    pub fn with_size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set precision and scale, e.g. `decimal(18, 2)`.
    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

/// Read-only metadata for one entity type: table identity, column
/// mapping, and per-property flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityConfiguration {
    table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_name: Option<String>,
    /// property -> column
    #[serde(default)]
    column_map: HashMap<String, String>,
    /// column -> property (kept in lockstep with `column_map`)
    #[serde(default)]
    property_map: HashMap<String, String>,
    #[serde(default)]
    excluded: HashSet<String>,
    #[serde(default)]
    computed: HashSet<String>,
    #[serde(default)]
    keys: HashSet<String>,
    #[serde(default)]
    column_types: HashMap<String, ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    concurrency_property: Option<String>,
    #[serde(default)]
    has_identity: bool,
}

impl EntityConfiguration {
    /// Configuration for the given table name.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Set the schema name.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    /// Map a property to a differently named column. The mapping is
    /// bidirectional.
    pub fn map_column(mut self, property: impl Into<String>, column: impl Into<String>) -> Self {
        let property = property.into();
        let column = column.into();
        self.property_map.insert(column.clone(), property.clone());
        self.column_map.insert(property, column);
        self
    }

    /// Exclude a property from every statement.
    pub fn exclude(mut self, property: impl Into<String>) -> Self {
        self.excluded.insert(property.into());
        self
    }

    /// Mark a property as database-computed.
    pub fn computed(mut self, property: impl Into<String>) -> Self {
        self.computed.insert(property.into());
        self
    }

    /// Mark a property as (part of) the key.
    pub fn key(mut self, property: impl Into<String>) -> Self {
        self.keys.insert(property.into());
        self
    }

    /// Give a property an explicit column type.
    pub fn column_type(mut self, property: impl Into<String>, column_type: ColumnType) -> Self {
        self.column_types.insert(property.into(), column_type);
        self
    }

    /// Name the concurrency-token property.
    pub fn concurrency(mut self, property: impl Into<String>) -> Self {
        self.concurrency_property = Some(property.into());
        self
    }

    /// Mark the entity as having an identity column.
    pub fn identity(mut self) -> Self {
        self.has_identity = true;
        self
    }

    /// The configured table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The configured schema name, if any.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Resolve a property to its column name; unmapped properties keep
    /// their own name.
    pub fn column_for<'a>(&'a self, property: &'a str) -> &'a str {
        self.column_map
            .get(property)
            .map(String::as_str)
            .unwrap_or(property)
    }

    /// Resolve a column back to its property name.
    pub fn property_for<'a>(&'a self, column: &'a str) -> &'a str {
        self.property_map
            .get(column)
            .map(String::as_str)
            .unwrap_or(column)
    }

    pub fn is_excluded(&self, property: &str) -> bool {
        self.excluded.contains(property)
    }

    pub fn is_computed(&self, property: &str) -> bool {
        self.computed.contains(property)
    }

    pub fn is_key(&self, property: &str) -> bool {
        self.keys.contains(property)
    }

    /// Explicit column type for a property, if configured.
    pub fn column_data_type(&self, property: &str) -> Option<&ColumnType> {
        self.column_types.get(property)
    }

    /// The concurrency-token property name, if configured.
    pub fn concurrency_property(&self) -> Option<&str> {
        self.concurrency_property.as_deref()
    }

    /// Whether the entity has an identity column.
    pub fn has_identity(&self) -> bool {
        self.has_identity
    }
}

/// The model store: entity name to configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    entities: HashMap<String, EntityConfiguration>,
}

impl Model {
    /// An empty model. Entities without configuration fall back to their
    /// own names for table and columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration for an entity type name.
    pub fn entity(mut self, name: impl Into<String>, config: EntityConfiguration) -> Self {
        self.entities.insert(name.into(), config);
        self
    }

    /// Look up the configuration for an entity type name.
    pub fn config(&self, entity_name: &str) -> Option<&EntityConfiguration> {
        self.entities.get(entity_name)
    }
}
