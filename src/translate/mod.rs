//! Predicate translation: expression trees to clause text plus ordered
//! parameters.

pub mod fold;


use std::collections::HashMap;

use crate::ast::{CompareOp, Expr};
use crate::error::{QueryError, QueryResult};
use crate::model::{ColumnType, EntityConfiguration};
use crate::param::{make_qualified_parameter, Parameter};

/// One entity parameter the expression tree may reference, paired with
/// its optional configuration. Index-aligned with [`Expr::Entity`].
#[derive(Debug, Clone, Copy)]
pub struct EntityBinding<'a> {
    pub entity_name: &'a str,
    pub config: Option<&'a EntityConfiguration>,
}

/// A fully resolved column reference.
struct ResolvedColumn {
    /// Mapped column name (predefined-parameter matching key).
    column: String,
    /// `[qualifier].[column]` clause text.
    qualified: String,
    /// Explicit column type from configuration, if any.
    explicit: Option<ColumnType>,
}

/// Walks one boolean expression tree and emits clause text plus the
/// parameters it allocates. One translator instance serves one clause.
pub struct Translator<'a> {
    bindings: Vec<EntityBinding<'a>>,
    aliases: HashMap<String, String>,
    locals: Vec<Parameter>,
    embedded: Vec<(String, String)>,
    batch_qualifier: u32,
    base_name: String,
    /// Increments once per compound node and once per `Contains` element;
    /// feeds parameter-name uniqueness only, never clause shape.
    position: u32,
    /// Parens opened by non-binary NOT, flushed lazily one level per
    /// completed clause segment.
    open_groups: u32,
    pending_has_value: bool,
    sql: String,
    params: Vec<Parameter>,
}

impl<'a> Translator<'a> {
    /// A translator over the given entity bindings.
    pub fn new(bindings: Vec<EntityBinding<'a>>) -> Self {
        Self {
            bindings,
            aliases: HashMap::new(),
            locals: Vec::new(),
            embedded: Vec::new(),
            batch_qualifier: 0,
            base_name: String::new(),
            position: 0,
            open_groups: 0,
            pending_has_value: false,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Register a table alias for an entity type name.
    pub fn with_alias(mut self, entity_name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(entity_name.into(), alias.into());
        self
    }

    /// Supply pre-built local parameters; columns matching one of them by
    /// exact `source_column` reuse its name instead of allocating.
    pub fn with_locals(mut self, locals: Vec<Parameter>) -> Self {
        self.locals = locals;
        self
    }

    /// Supply the batch's embedded-parameter registry (column name to
    /// parameter name, matched case-insensitively).
    pub fn with_embedded(mut self, embedded: Vec<(String, String)>) -> Self {
        self.embedded = embedded;
        self
    }

    /// Qualify allocated parameter names with a batch index.
    pub fn with_batch_qualifier(mut self, batch_qualifier: u32) -> Self {
        self.batch_qualifier = batch_qualifier;
        self
    }

    /// Translate a filter predicate into clause text and its parameters.
    /// `base_name` seeds allocated parameter names (`"@p"` when empty).
    pub fn translate_filter(
        mut self,
        expr: &Expr,
        base_name: &str,
    ) -> QueryResult<(String, Vec<Parameter>)> {
        self.base_name = base_name.to_string();
        self.visit(expr)?;
        // End of traversal is the final closing point.
        while self.open_groups > 0 {
            self.sql.push(')');
            self.open_groups -= 1;
        }
        tracing::debug!(
            clause = %self.sql,
            parameters = self.params.len(),
            "translated filter"
        );
        Ok((self.sql, self.params))
    }

    /// Translate a join `on` predicate: a single binary comparison between
    /// a qualified column and a qualified column, NULL, or literal.
    pub fn translate_on(self, expr: &Expr) -> QueryResult<String> {
        let Expr::Compare { op, left, right } = expr else {
            return Err(QueryError::unsupported(
                "join on-clause must be a single binary comparison",
            ));
        };
        let left = self.resolve_column(left)?;
        match right.as_ref() {
            Expr::Member {
                target, ..
            } if matches!(target.as_ref(), Expr::Entity(_)) => {
                let right = self.resolve_column(right)?;
                Ok(format!(
                    "{} {} {}",
                    left.qualified,
                    op.sql_symbol(),
                    right.qualified
                ))
            }
            other => {
                let value = fold::resolve(other)?;
                if value.is_null() {
                    let text = op.null_text().ok_or_else(|| {
                        QueryError::unsupported("null comparison requires = or <>")
                    })?;
                    Ok(format!("{} {}", left.qualified, text))
                } else {
                    Ok(format!("{} {} {}", left.qualified, op.sql_symbol(), value))
                }
            }
        }
    }

    /// Translate an `OrderBy`/`OrderByDescending` call shape into an
    /// `order by` clause.
    pub fn translate_order(self, expr: &Expr) -> QueryResult<String> {
        let segment = self.order_segment(expr)?;
        Ok(format!("order by {segment}"))
    }

    /// The column segment of an ordering call: `[T].[Col]` plus ` desc`
    /// for descending.
    pub(crate) fn order_segment(&self, expr: &Expr) -> QueryResult<String> {
        let Expr::Call { method, args, .. } = expr else {
            return Err(QueryError::unsupported(
                "ordering must be an OrderBy/OrderByDescending call",
            ));
        };
        let descending = match method.as_str() {
            "OrderBy" => false,
            "OrderByDescending" => true,
            other => {
                return Err(QueryError::unsupported(format!(
                    "ordering call `{other}` is not supported"
                )))
            }
        };
        if args.len() != 2 {
            return Err(QueryError::unsupported(
                "ordering call must take exactly a source and a key selector",
            ));
        }
        let key = self.resolve_column(&args[1])?;
        if descending {
            Ok(format!("{} desc", key.qualified))
        } else {
            Ok(key.qualified)
        }
    }

    /// The qualified column text for a plain member access, for callers
    /// assembling non-predicate clauses (grouping lists).
    pub(crate) fn qualified_column(&self, expr: &Expr) -> QueryResult<String> {
        Ok(self.resolve_column(expr)?.qualified)
    }

    fn visit(&mut self, expr: &Expr) -> QueryResult<()> {
        match expr {
            Expr::And(left, right) => self.visit_compound(left, right, " and "),
            Expr::Or(left, right) => self.visit_compound(left, right, " or "),
            Expr::Not(inner) => {
                if inner.is_compound() {
                    // Compound operands carry their own parens.
                    self.sql.push_str("not ");
                    self.visit(inner)
                } else {
                    self.sql.push_str("not (");
                    self.open_groups += 1;
                    self.visit(inner)
                }
            }
            Expr::Compare { op, left, right } => self.visit_compare(*op, left, right),
            Expr::Member { .. } => self.visit_member(expr),
            Expr::Call {
                method,
                target,
                args,
            } => self.visit_call(method, target.as_deref(), args),
            other => Err(QueryError::unsupported(format!(
                "expression shape is outside the supported grammar: {other:?}"
            ))),
        }
    }

    fn visit_compound(&mut self, left: &Expr, right: &Expr, joiner: &str) -> QueryResult<()> {
        self.sql.push('(');
        self.visit(left)?;
        self.sql.push_str(joiner);
        self.position += 1;
        self.visit(right)?;
        self.sql.push(')');
        Ok(())
    }

    fn visit_compare(&mut self, op: CompareOp, left: &Expr, right: &Expr) -> QueryResult<()> {
        let column = self.resolve_column(left)?;

        if let Some(predefined) = self.find_predefined(&column.column) {
            self.sql.push_str(&column.qualified);
            self.sql.push(' ');
            self.sql.push_str(op.sql_symbol());
            self.sql.push(' ');
            self.sql.push_str(&predefined);
            self.close_segment();
            return Ok(());
        }

        let value = fold::resolve(right)?;
        if value.is_null() {
            let text = op
                .null_text()
                .ok_or_else(|| QueryError::unsupported("null comparison requires = or <>"))?;
            self.sql.push_str(&column.qualified);
            self.sql.push(' ');
            self.sql.push_str(text);
            self.close_segment();
            return Ok(());
        }

        let parameter = make_qualified_parameter(
            value,
            &column.column,
            column.explicit.as_ref(),
            &self.base_name,
            self.batch_qualifier,
            self.position,
            0,
        );
        self.sql.push_str(&column.qualified);
        self.sql.push(' ');
        self.sql.push_str(op.sql_symbol());
        self.sql.push(' ');
        self.sql.push_str(&parameter.name);
        self.params.push(parameter);
        self.close_segment();
        Ok(())
    }

    fn visit_member(&mut self, expr: &Expr) -> QueryResult<()> {
        let Expr::Member { target, name } = expr else {
            unreachable!("visit_member is only dispatched on member nodes");
        };
        if name == "HasValue" {
            // The next member access is the nullable object itself.
            self.pending_has_value = true;
            return self.visit(target);
        }
        if self.pending_has_value {
            let column = self.resolve_column(expr)?;
            self.sql.push_str(&column.qualified);
            self.sql.push_str(" Is Not NULL");
            self.pending_has_value = false;
            self.close_segment();
            return Ok(());
        }
        Err(QueryError::unsupported(format!(
            "bare member access `{name}` in a boolean position"
        )))
    }

    fn visit_call(
        &mut self,
        method: &str,
        target: Option<&Expr>,
        args: &[Expr],
    ) -> QueryResult<()> {
        match method {
            "Contains" => {
                let Some(receiver) = target else {
                    return Err(QueryError::unsupported(
                        "Contains on a static receiver has no collection instance",
                    ));
                };
                let [item] = args else {
                    return Err(QueryError::unsupported(
                        "Contains must take a single member-access argument",
                    ));
                };
                let column = self.resolve_column(item)?;
                let receiver = fold::resolve(receiver)?;
                let crate::value::Value::List(items) = receiver else {
                    return Err(QueryError::unsupported(
                        "Contains receiver is not an in-memory collection",
                    ));
                };
                // `IN ()` is not valid T-SQL.
                if items.is_empty() {
                    return Err(QueryError::unsupported(
                        "Contains receiver is an empty collection",
                    ));
                }
                self.sql.push_str(&column.qualified);
                self.sql.push_str(" IN (");
                for (index, item) in items.into_iter().enumerate() {
                    if index > 0 {
                        self.sql.push_str(", ");
                    }
                    let parameter = make_qualified_parameter(
                        item,
                        &column.column,
                        column.explicit.as_ref(),
                        &self.base_name,
                        self.batch_qualifier,
                        self.position,
                        index as u32,
                    );
                    self.sql.push_str(&parameter.name);
                    self.params.push(parameter);
                    self.position += 1;
                }
                self.sql.push(')');
                self.close_segment();
                Ok(())
            }
            "IsNullOrEmpty" => {
                let [member] = args else {
                    return Err(QueryError::unsupported(
                        "IsNullOrEmpty must take a single member-access argument",
                    ));
                };
                let column = self.resolve_column(member)?;
                self.sql.push_str(&column.qualified);
                self.sql.push_str(" Is NULL OR LEN(");
                self.sql.push_str(&column.qualified);
                self.sql.push_str(") = 0");
                self.close_segment();
                Ok(())
            }
            "OrderBy" | "OrderByDescending" => Err(QueryError::unsupported(
                "ordering calls are not valid inside a filter",
            )),
            other => Err(QueryError::unsupported(format!(
                "method call `{other}` is not supported"
            ))),
        }
    }

    /// Resolve a member access over an entity parameter to a qualified
    /// column reference.
    fn resolve_column(&self, expr: &Expr) -> QueryResult<ResolvedColumn> {
        let Expr::Member { target, name } = expr else {
            return Err(QueryError::unsupported(
                "comparison left side must be a member access",
            ));
        };
        let Expr::Entity(index) = target.as_ref() else {
            if matches!(target.as_ref(), Expr::Member { .. }) {
                return Err(QueryError::unsupported(format!(
                    "multi-level property chain ending in `{name}`"
                )));
            }
            return Err(QueryError::unsupported(format!(
                "member `{name}` is not accessed on an entity parameter"
            )));
        };
        let binding = self.bindings.get(*index).ok_or_else(|| {
            QueryError::unsupported(format!("entity parameter {index} is not bound"))
        })?;
        let column = binding
            .config
            .map(|c| c.column_for(name))
            .unwrap_or(name)
            .to_string();
        let qualifier = self
            .aliases
            .get(binding.entity_name)
            .map(String::as_str)
            .or_else(|| binding.config.map(|c| c.table_name()))
            .unwrap_or(binding.entity_name);
        let explicit = binding.config.and_then(|c| c.column_data_type(name)).copied();
        Ok(ResolvedColumn {
            qualified: format!("[{qualifier}].[{column}]"),
            column,
            explicit,
        })
    }

    /// Reuse a parameter already bound for this column: explicit locals
    /// first (exact case), then the batch's embedded registry (ignoring
    /// case).
    fn find_predefined(&self, column: &str) -> Option<String> {
        if let Some(local) = self.locals.iter().find(|p| p.source_column == column) {
            return Some(local.name.clone());
        }
        self.embedded
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, parameter)| parameter.clone())
    }

    /// A clause segment just completed; flush one deferred NOT paren.
    fn close_segment(&mut self) {
        if self.open_groups > 0 {
            self.sql.push(')');
            self.open_groups -= 1;
        }
    }
}

/// Extract a plain property name from a trivial `entity => entity.Property`
/// selector. Multi-hop chains and non-member bodies are rejected.
pub fn property_name(expr: &Expr) -> QueryResult<&str> {
    match expr {
        Expr::Member { target, name } if matches!(target.as_ref(), Expr::Entity(_)) => Ok(name),
        Expr::Member { name, .. } => Err(QueryError::unsupported(format!(
            "multi-level property chain ending in `{name}`"
        ))),
        other => Err(QueryError::unsupported(format!(
            "selector body must be a member access, got {other:?}"
        ))),
    }
}
