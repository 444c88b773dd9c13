//! Fluent helpers for assembling expression trees.

use std::sync::Arc;

use crate::ast::{CompareOp, Expr};
use crate::value::{Record, Thunk, Value};

/// Property access on the (left) entity parameter.
pub fn col(property: &str) -> Expr {
    Expr::Member {
        target: Box::new(Expr::Entity(0)),
        name: property.to_string(),
    }
}

/// Property access on the joined (right) entity parameter.
pub fn joined_col(property: &str) -> Expr {
    Expr::Member {
        target: Box::new(Expr::Entity(1)),
        name: property.to_string(),
    }
}

/// Property access on an arbitrary target (captured object chains).
pub fn field(target: Expr, name: &str) -> Expr {
    Expr::Member {
        target: Box::new(target),
        name: name.to_string(),
    }
}

/// A captured host object, read through the [`Record`] accessor during
/// constant folding.
pub fn record(r: Arc<dyn Record>) -> Expr {
    Expr::Value(Value::Record(r))
}

/// A deferred host computation; the translator invokes it only when
/// direct folding cannot resolve the operand.
pub fn thunk(f: impl Fn() -> crate::error::QueryResult<Value> + Send + Sync + 'static) -> Expr {
    Expr::Value(Value::Thunk(Thunk::new(f)))
}

fn compare(op: CompareOp, left: Expr, right: impl Into<Expr>) -> Expr {
    Expr::Compare {
        op,
        left: Box::new(left),
        right: Box::new(right.into()),
    }
}

/// `left = right`
pub fn eq(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Eq, left, right)
}

/// `left <> right`
pub fn ne(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Ne, left, right)
}

/// `left > right`
pub fn gt(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Gt, left, right)
}

/// `left >= right`
pub fn ge(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Ge, left, right)
}

/// `left < right`
pub fn lt(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Lt, left, right)
}

/// `left <= right`
pub fn le(left: Expr, right: impl Into<Expr>) -> Expr {
    compare(CompareOp::Le, left, right)
}

/// `(left and right)`
pub fn and(left: Expr, right: Expr) -> Expr {
    Expr::And(Box::new(left), Box::new(right))
}

/// `(left or right)`
pub fn or(left: Expr, right: Expr) -> Expr {
    Expr::Or(Box::new(left), Box::new(right))
}

/// `not expr`
pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

/// Nullable-property check: `entity.Property.HasValue`.
pub fn has_value(property: &str) -> Expr {
    Expr::Member {
        target: Box::new(col(property)),
        name: "HasValue".to_string(),
    }
}

/// Collection membership: `list.Contains(entity.Property)`.
pub fn contains(list: impl Into<Expr>, item: Expr) -> Expr {
    Expr::Call {
        method: "Contains".to_string(),
        target: Some(Box::new(list.into())),
        args: vec![item],
    }
}

/// `String.IsNullOrEmpty(entity.Property)`: a static call with the
/// member access as its single argument.
pub fn is_null_or_empty(property: &str) -> Expr {
    Expr::Call {
        method: "IsNullOrEmpty".to_string(),
        target: None,
        args: vec![col(property)],
    }
}

/// Ascending ordering call shape over the entity and a key selector.
pub fn order_by(property: &str) -> Expr {
    Expr::Call {
        method: "OrderBy".to_string(),
        target: None,
        args: vec![Expr::Entity(0), col(property)],
    }
}

/// Descending ordering call shape.
pub fn order_by_desc(property: &str) -> Expr {
    Expr::Call {
        method: "OrderByDescending".to_string(),
        target: None,
        args: vec![Expr::Entity(0), col(property)],
    }
}
