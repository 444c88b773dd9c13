//! Bound-parameter descriptors and the parameter factory.
//!
//! Generated parameter names are part of the wire contract consumed by the
//! execution layer and by predefined-parameter matching, so the qualifier
//! scheme in [`make_qualified_parameter`] must not drift.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::model::{ColumnType, SqlDataType};
use crate::value::Value;

/// A named, typed bound parameter.
///
/// `value` is never absent: SQL NULL is carried as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    /// The column this parameter binds; required for global parameters
    /// and for predefined-parameter matching.
    pub source_column: String,
    pub sql_type: Option<SqlDataType>,
    pub size: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

/// Which character-string SQL type untyped string values default to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// `varchar`
    Narrow,
    /// `nvarchar`
    Wide,
}

static DEFAULT_STRING_KIND: AtomicU8 = AtomicU8::new(0);

/// Set the process-wide default string SQL type used when a string value
/// has no explicit column type.
pub fn set_default_string_kind(kind: StringKind) {
    let raw = match kind {
        StringKind::Narrow => 0,
        StringKind::Wide => 1,
    };
    DEFAULT_STRING_KIND.store(raw, Ordering::Relaxed);
}

/// The current process-wide default string SQL type.
pub fn default_string_kind() -> StringKind {
    match DEFAULT_STRING_KIND.load(Ordering::Relaxed) {
        0 => StringKind::Narrow,
        _ => StringKind::Wide,
    }
}

/// Build a parameter from a host value and an optional explicit column
/// type. An explicit type copies its data type, size, precision, and
/// scale; otherwise string values take the process-wide default string
/// type.
pub fn make_parameter(value: Value, name: impl Into<String>, explicit: Option<&ColumnType>) -> Parameter {
    let mut parameter = Parameter {
        name: name.into(),
        value,
        source_column: String::new(),
        sql_type: None,
        size: None,
        precision: None,
        scale: None,
    };
    if let Some(column_type) = explicit {
        parameter.sql_type = Some(column_type.data_type);
        parameter.size = column_type.size;
        parameter.precision = column_type.precision;
        parameter.scale = column_type.scale;
    } else if parameter.value.is_string() {
        parameter.sql_type = Some(match default_string_kind() {
            StringKind::Narrow => SqlDataType::VarChar,
            StringKind::Wide => SqlDataType::NVarChar,
        });
    }
    parameter
}

/// Build a positionally qualified parameter.
///
/// The name starts from `base_name` (`"@p"` when empty) and appends, only
/// when each qualifier is present and greater than zero: the batch
/// qualifier verbatim, then `x` + position, then `n` + index. The suffixes
/// are purely additive and independent.
pub fn make_qualified_parameter(
    value: Value,
    source_column: &str,
    explicit: Option<&ColumnType>,
    base_name: &str,
    batch_qualifier: u32,
    position_qualifier: u32,
    index_qualifier: u32,
) -> Parameter {
    let mut name = if base_name.is_empty() {
        String::from("@p")
    } else {
        base_name.to_string()
    };
    if batch_qualifier > 0 {
        name.push_str(&batch_qualifier.to_string());
    }
    if position_qualifier > 0 {
        name.push('x');
        name.push_str(&position_qualifier.to_string());
    }
    if index_qualifier > 0 {
        name.push('n');
        name.push_str(&index_qualifier.to_string());
    }
    let mut parameter = make_parameter(value, name, explicit);
    parameter.source_column = source_column.to_string();
    parameter
}

/// Element-wise, field-by-field duplicate of a parameter sequence.
/// Absent input yields absent output.
pub fn copy_parameters(parameters: Option<&[Parameter]>) -> Option<Vec<Parameter>> {
    parameters.map(|items| items.to_vec())
}
