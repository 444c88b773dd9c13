//! Constant folding for right-hand and receiver operands.
//!
//! Direct resolution handles literals and member-access chains over
//! captured objects; a [`Thunk`](crate::value::Thunk) is the compile-and-
//! invoke fallback for shapes the direct path does not special-case.

use crate::ast::Expr;
use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Resolve an operand expression to a host value.
pub fn resolve(expr: &Expr) -> QueryResult<Value> {
    match expr {
        Expr::Value(value) => resolve_value(value),
        Expr::Member { target, name } => {
            let object = resolve(target)?;
            read_field(&object, name)
        }
        Expr::Entity(_) => Err(QueryError::unsupported(
            "entity parameter reference in a value position",
        )),
        other => Err(QueryError::unsupported(format!(
            "operand shape cannot be evaluated: {other:?}"
        ))),
    }
}

fn resolve_value(value: &Value) -> QueryResult<Value> {
    match value {
        // Last-resort general evaluator: run the deferred computation.
        Value::Thunk(thunk) => resolve_value(&thunk.invoke()?),
        other => Ok(other.clone()),
    }
}

fn read_field(object: &Value, name: &str) -> QueryResult<Value> {
    match object {
        Value::Record(record) => record.field(name).ok_or_else(|| {
            QueryError::unsupported(format!(
                "`{}` has no readable field `{name}`",
                record.type_name()
            ))
        }),
        Value::Null => Err(QueryError::unsupported(format!(
            "member `{name}` read on a null object"
        ))),
        other => Err(QueryError::unsupported(format!(
            "member `{name}` read on a non-object value {other:?}"
        ))),
    }
}
