//! Expression trees over typed entity parameters.
//!
//! The node set is closed: the translator does an exhaustive match over
//! these variants, and anything it does not recognize fails with an
//! unsupported-expression error rather than falling through.

pub mod builders;

use crate::value::Value;

/// Comparison operators supported between a column and an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// The T-SQL symbol for this operator.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    /// The null-comparison text this operator maps to, if any. Only
    /// equality and inequality have a three-valued NULL rendering.
    pub fn null_text(&self) -> Option<&'static str> {
        match self {
            CompareOp::Eq => Some("Is NULL"),
            CompareOp::Ne => Some("Is Not NULL"),
            _ => None,
        }
    }
}

/// A boolean-valued expression tree over one or two entity parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A host value: literal, captured object, or deferred computation.
    Value(Value),
    /// Reference to an entity parameter: 0 is the (left) entity, 1 the
    /// joined (right) entity.
    Entity(usize),
    /// Property access. Over [`Expr::Entity`] this is a column; over a
    /// captured value it is folded; a trailing `HasValue` hop drives the
    /// nullable pattern.
    Member { target: Box<Expr>, name: String },
    /// Binary comparison between a member access and an operand.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Logical conjunction, always rendered parenthesized.
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction, always rendered parenthesized.
    Or(Box<Expr>, Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
    /// Method call. Recognized methods: `Contains` (instance receiver),
    /// `IsNullOrEmpty`, `OrderBy`, `OrderByDescending`. `target: None`
    /// models a static/extension receiver.
    Call {
        method: String,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Whether this node is a compound (AND/OR) node, which supplies its
    /// own parentheses.
    pub fn is_compound(&self) -> bool {
        matches!(self, Expr::And(..) | Expr::Or(..))
    }
}

impl<T: Into<Value>> From<T> for Expr {
    fn from(v: T) -> Self {
        Expr::Value(v.into())
    }
}
