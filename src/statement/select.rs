//! The select builder.

use std::marker::PhantomData;

use crate::ast::Expr;
use crate::batch::QueryBatch;
use crate::command::QueryCommand;
use crate::error::QueryResult;
use crate::model::{scoped_properties, scoped_slice, Entity, Model, Property, StatementKind};
use crate::translate::{EntityBinding, Translator};

use super::{append_option_clause, batch_context, column_qualifier, table_reference};

/// How the joined table participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "Inner Join",
            JoinKind::Left => "Left Join",
            JoinKind::Right => "Right Join",
        }
    }
}

struct JoinSpec {
    kind: JoinKind,
    entity_name: &'static str,
    properties: &'static [Property],
    alias: Option<String>,
    on: Expr,
}

/// Start a select over entity `T`.
pub fn select<T: Entity>() -> Select<T> {
    Select {
        top: None,
        nolock: false,
        alias: None,
        join: None,
        group_by: Vec::new(),
        filter: None,
        order: Vec::new(),
        option: None,
        base_name: "@p".to_string(),
        can_split: true,
        _entity: PhantomData,
    }
}

/// Fluent select statement over one entity, optionally joined to a
/// second.
pub struct Select<T: Entity> {
    top: Option<u64>,
    nolock: bool,
    alias: Option<String>,
    join: Option<JoinSpec>,
    group_by: Vec<Expr>,
    filter: Option<Expr>,
    order: Vec<Expr>,
    option: Option<String>,
    base_name: String,
    can_split: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Select<T> {
    /// Limit the result to the first `n` rows.
    pub fn top(mut self, n: u64) -> Self {
        self.top = Some(n);
        self
    }

    /// Emit the `(nolock)` locking hint after the table reference.
    pub fn nolock(mut self) -> Self {
        self.nolock = true;
        self
    }

    /// Alias the main table; columns qualify with the alias instead of
    /// the table name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Join entity `J` with the given on-clause comparison. The joined
    /// entity binds as entity parameter 1.
    pub fn join<J: Entity>(mut self, kind: JoinKind, on: Expr) -> Self {
        self.join = Some(JoinSpec {
            kind,
            entity_name: J::entity_name(),
            properties: J::properties(),
            alias: None,
            on,
        });
        self
    }

    pub fn inner_join<J: Entity>(self, on: Expr) -> Self {
        self.join::<J>(JoinKind::Inner, on)
    }

    pub fn left_join<J: Entity>(self, on: Expr) -> Self {
        self.join::<J>(JoinKind::Left, on)
    }

    pub fn right_join<J: Entity>(self, on: Expr) -> Self {
        self.join::<J>(JoinKind::Right, on)
    }

    /// Alias the joined table. No effect without a join.
    pub fn joined_alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(join) = self.join.as_mut() {
            join.alias = Some(alias.into());
        }
        self
    }

    /// Add a grouping column from a plain property selector. Repeatable.
    pub fn group_by(mut self, selector: Expr) -> Self {
        self.group_by.push(selector);
        self
    }

    /// Set the where-clause predicate.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(expr);
        self
    }

    /// Add an ordering call shape. Repeatable; segments join with commas.
    pub fn order(mut self, expr: Expr) -> Self {
        self.order.push(expr);
        self
    }

    /// Append a trailing option clause.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    /// Base name for filter-allocated parameters (default `"@p"`).
    pub fn base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    /// Whether the batch packer may size the built command independently
    /// (default true).
    pub fn can_split(mut self, can_split: bool) -> Self {
        self.can_split = can_split;
        self
    }

    /// Render the statement against the model. A batch, when supplied,
    /// contributes the parameter-name qualifier and its embedded-parameter
    /// registry.
    pub fn build(self, model: &Model, batch: Option<&mut QueryBatch>) -> QueryResult<QueryCommand> {
        let (batch_qualifier, embedded) = batch_context(batch);
        let config = model.config(T::entity_name());
        let join_config = self
            .join
            .as_ref()
            .and_then(|join| model.config(join.entity_name));

        let mut bindings = vec![EntityBinding {
            entity_name: T::entity_name(),
            config,
        }];
        if let Some(join) = &self.join {
            bindings.push(EntityBinding {
                entity_name: join.entity_name,
                config: join_config,
            });
        }

        let qualifier = column_qualifier(T::entity_name(), self.alias.as_deref(), config);
        let mut columns: Vec<String> = scoped_properties::<T>(StatementKind::Select, config)?
            .iter()
            .map(|property| {
                let column = config
                    .map(|c| c.column_for(property.name))
                    .unwrap_or(property.name);
                format!("[{qualifier}].[{column}]")
            })
            .collect();
        if let Some(join) = &self.join {
            let joined_qualifier =
                column_qualifier(join.entity_name, join.alias.as_deref(), join_config);
            for property in scoped_slice(StatementKind::Select, join_config, join.properties)? {
                let column = join_config
                    .map(|c| c.column_for(property.name))
                    .unwrap_or(property.name);
                columns.push(format!("[{joined_qualifier}].[{column}]"));
            }
        }

        let mut sql = String::from("select ");
        if let Some(top) = self.top {
            sql.push_str(&format!("TOP {top} "));
        }
        sql.push_str(&columns.join(", "));
        sql.push_str(" from ");
        sql.push_str(&table_reference(T::entity_name(), config));
        if let Some(alias) = &self.alias {
            sql.push_str(&format!(" [{alias}]"));
        }
        if self.nolock {
            sql.push_str(" (nolock)");
        }

        if let Some(join) = &self.join {
            let on = self
                .translator(&bindings, &embedded, batch_qualifier)
                .translate_on(&join.on)?;
            sql.push_str(&format!(
                " {} {}",
                join.kind.keyword(),
                table_reference(join.entity_name, join_config)
            ));
            if let Some(alias) = &join.alias {
                sql.push_str(&format!(" [{alias}]"));
            }
            sql.push_str(&format!(" on {on}"));
        }

        if !self.group_by.is_empty() {
            let translator = self.translator(&bindings, &embedded, batch_qualifier);
            let grouped: Vec<String> = self
                .group_by
                .iter()
                .map(|selector| translator.qualified_column(selector))
                .collect::<QueryResult<_>>()?;
            sql.push_str(" group by ");
            sql.push_str(&grouped.join(", "));
        }

        let mut parameters = Vec::new();
        if let Some(filter) = &self.filter {
            let (clause, filter_parameters) = self
                .translator(&bindings, &embedded, batch_qualifier)
                .translate_filter(filter, &self.base_name)?;
            sql.push_str(" where ");
            sql.push_str(&clause);
            parameters = filter_parameters;
        }

        if !self.order.is_empty() {
            let translator = self.translator(&bindings, &embedded, batch_qualifier);
            let segments: Vec<String> = self
                .order
                .iter()
                .map(|expr| translator.order_segment(expr))
                .collect::<QueryResult<_>>()?;
            sql.push_str(" order by ");
            sql.push_str(&segments.join(", "));
        }

        append_option_clause(&mut sql, self.option.as_deref());
        tracing::debug!(
            entity = T::entity_name(),
            parameters = parameters.len(),
            "built select"
        );
        Ok(QueryCommand::new(sql, parameters, self.can_split))
    }

    fn translator<'a>(
        &self,
        bindings: &[EntityBinding<'a>],
        embedded: &[(String, String)],
        batch_qualifier: u32,
    ) -> Translator<'a> {
        let mut translator = Translator::new(bindings.to_vec())
            .with_embedded(embedded.to_vec())
            .with_batch_qualifier(batch_qualifier);
        if let Some(alias) = &self.alias {
            translator = translator.with_alias(T::entity_name(), alias.clone());
        }
        if let Some(join) = &self.join {
            if let Some(alias) = &join.alias {
                translator = translator.with_alias(join.entity_name, alias.clone());
            }
        }
        translator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{col, eq, joined_col, order_by, order_by_desc};
    use crate::statement::fixtures::{configured_model, Customer, Order};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_select_without_model() {
        let cmd = select::<Customer>().build(&Model::new(), None).unwrap();
        assert_eq!(
            cmd.text(),
            "select [Customer].[CustomerId], [Customer].[Name], [Customer].[Active] from [Customer]"
        );
        assert_eq!(cmd.parameter_count(), 0);
    }

    #[test]
    fn test_top_nolock_and_filter() {
        let cmd = select::<Customer>()
            .top(10)
            .nolock()
            .filter(eq(col("Active"), true))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "select TOP 10 [Customers].[CustomerId], [Customers].[Name], [Customers].[Active] \
             from [Customers] (nolock) where [Customers].[Active] = @p"
        );
        assert_eq!(cmd.parameter_count(), 1);
        assert_eq!(cmd.parameters()[0].value, Value::Bool(true));
    }

    #[test]
    fn test_alias_qualifies_columns() {
        let cmd = select::<Customer>()
            .alias("c")
            .filter(eq(col("CustomerId"), 5))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "select [c].[CustomerId], [c].[Name], [c].[Active] from [Customers] [c] \
             where [c].[CustomerId] = @p"
        );
    }

    #[test]
    fn test_inner_join_projects_both_sides() {
        let cmd = select::<Customer>()
            .inner_join::<Order>(eq(col("CustomerId"), joined_col("CustomerId")))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "select [Customers].[CustomerId], [Customers].[Name], [Customers].[Active], \
             [Orders].[OrderId], [Orders].[CustomerId] from [Customers] \
             Inner Join [Orders] on [Customers].[CustomerId] = [Orders].[CustomerId]"
        );
    }

    #[test]
    fn test_group_by_precedes_where() {
        let cmd = select::<Customer>()
            .group_by(col("Name"))
            .filter(eq(col("Active"), true))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "select [Customers].[CustomerId], [Customers].[Name], [Customers].[Active] \
             from [Customers] group by [Customers].[Name] where [Customers].[Active] = @p"
        );
    }

    #[test]
    fn test_can_split_flag_carries_to_the_command() {
        let cmd = select::<Customer>().build(&Model::new(), None).unwrap();
        assert!(cmd.can_split());

        let cmd = select::<Customer>()
            .can_split(false)
            .build(&Model::new(), None)
            .unwrap();
        assert!(!cmd.can_split());
    }

    #[test]
    fn test_order_segments_and_option() {
        let cmd = select::<Customer>()
            .order(order_by("Name"))
            .order(order_by_desc("CustomerId"))
            .option("(RECOMPILE)")
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "select [Customers].[CustomerId], [Customers].[Name], [Customers].[Active] \
             from [Customers] order by [Customers].[Name], [Customers].[CustomerId] desc \
             OPTION (RECOMPILE)"
        );
    }
}
