//! Host values bound into statements or folded out of expression trees.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::QueryResult;

/// Read access to the fields of a captured host object.
///
/// This is the property-accessor seam: member-access chains over captured
/// data are folded by reading fields through this trait, one hop at a time.
pub trait Record: Send + Sync {
    /// Name of the underlying type, used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Read a field by name. `None` means the field does not exist.
    fn field(&self, name: &str) -> Option<Value>;
}

/// A deferred host computation, invoked only when direct constant folding
/// cannot resolve a node. This is the slow escape hatch; correctness over
/// speed by contract.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn() -> QueryResult<Value> + Send + Sync>);

impl Thunk {
    /// Wrap a host closure as a foldable value.
    pub fn new(f: impl Fn() -> QueryResult<Value> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the computation and produce its value.
    pub fn invoke(&self) -> QueryResult<Value> {
        (self.0)()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}

impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A host value that can be bound as a parameter or resolved during
/// constant folding.
#[derive(Clone)]
pub enum Value {
    /// SQL NULL sentinel; parameters never carry an absent value.
    Null,
    /// Boolean (bound as bit).
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Character string.
    String(String),
    /// Binary payload.
    Bytes(Vec<u8>),
    /// UUID value.
    Uuid(Uuid),
    /// Date and time, no offset.
    DateTime(NaiveDateTime),
    /// Exact numeric.
    Decimal(Decimal),
    /// In-memory collection, the receiver of `Contains`.
    List(Vec<Value>),
    /// Captured host object read through the [`Record`] accessor.
    Record(Arc<dyn Record>),
    /// Deferred host computation.
    Thunk(Thunk),
}

impl Value {
    /// Whether this value is the SQL NULL sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value binds as a character string.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Value::Uuid(u) => write!(f, "Uuid({u})"),
            Value::DateTime(t) => write!(f, "DateTime({t})"),
            Value::Decimal(d) => write!(f, "Decimal({d})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Record(r) => write!(f, "Record({})", r.type_name()),
            Value::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Thunk(a), Value::Thunk(b)) => a == b,
            _ => false,
        }
    }
}

/// Renders the value as a T-SQL literal. Used only where the grammar calls
/// for inline text (join `on` clauses); everything else goes through
/// parameters.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Bytes(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            Value::Uuid(u) => write!(f, "'{}'", u),
            Value::DateTime(t) => write!(f, "'{}'", t.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            Value::Record(r) => write!(f, "<{}>", r.type_name()),
            Value::Thunk(_) => write!(f, "<thunk>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::DateTime(t)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(|v| v.into()).collect())
    }
}
