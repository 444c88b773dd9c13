//! The update builder.

use crate::ast::Expr;
use crate::batch::QueryBatch;
use crate::command::QueryCommand;
use crate::error::QueryResult;
use crate::model::{scoped_properties, Entity, Model, StatementKind};
use crate::param::make_qualified_parameter;
use crate::translate::{EntityBinding, Translator};
use crate::value::Value;

use super::{append_option_clause, batch_context, table_reference};

/// Start an update of the given entity instance.
pub fn update<T: Entity>(entity: &T) -> Update<'_, T> {
    Update {
        entity,
        filter: None,
        option: None,
        base_name: "@p".to_string(),
        can_split: true,
    }
}

/// Fluent update statement for one entity row.
pub struct Update<'e, T: Entity> {
    entity: &'e T,
    filter: Option<Expr>,
    option: Option<String>,
    base_name: String,
    can_split: bool,
}

impl<T: Entity> Update<'_, T> {
    /// Set the where-clause predicate. Set-list parameters act as
    /// predefined locals, so a filter on an updated column reuses its
    /// parameter instead of allocating a second one.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(expr);
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

    /// Render the statement against the model.
    pub fn build(self, model: &Model, batch: Option<&mut QueryBatch>) -> QueryResult<QueryCommand> {
        let (batch_qualifier, embedded) = batch_context(batch);
        let config = model.config(T::entity_name());

        let mut assignments = Vec::new();
        let mut parameters = Vec::new();
        for property in scoped_properties::<T>(StatementKind::Update, config)? {
            let column = config
                .map(|c| c.column_for(property.name))
                .unwrap_or(property.name);
            let value = self.entity.get(property.name).unwrap_or(Value::Null);
            let parameter = make_qualified_parameter(
                value,
                column,
                config.and_then(|c| c.column_data_type(property.name)),
                &format!("@{column}"),
                batch_qualifier,
                0,
                0,
            );
            assignments.push(format!("[{column}] = {}", parameter.name));
            parameters.push(parameter);
        }

        let mut sql = format!(
            "update {} set {}",
            table_reference(T::entity_name(), config),
            assignments.join(", ")
        );

        if let Some(filter) = &self.filter {
            let translator = Translator::new(vec![EntityBinding {
                entity_name: T::entity_name(),
                config,
            }])
            .with_locals(parameters.clone())
            .with_embedded(embedded)
            .with_batch_qualifier(batch_qualifier);
            let (clause, filter_parameters) = translator.translate_filter(filter, &self.base_name)?;
            sql.push_str(" where ");
            sql.push_str(&clause);
            parameters.extend(filter_parameters);
        }

        append_option_clause(&mut sql, self.option.as_deref());
        tracing::debug!(
            entity = T::entity_name(),
            parameters = parameters.len(),
            "built update"
        );
        Ok(QueryCommand::new(sql, parameters, self.can_split))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{col, eq};
    use crate::statement::fixtures::{configured_model, Customer};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_skips_key_columns() {
        let cmd = update(&Customer::sample())
            .filter(eq(col("CustomerId"), 7))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "update [Customers] set [Name] = @Name, [Active] = @Active \
             where [Customers].[CustomerId] = @p"
        );
        assert_eq!(cmd.parameter_count(), 3);
    }

    #[test]
    fn test_filter_reuses_set_parameter() {
        let cmd = update(&Customer::sample())
            .filter(eq(col("Name"), "Ada"))
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "update [Customers] set [Name] = @Name, [Active] = @Active \
             where [Customers].[Name] = @Name"
        );
        // The reused column contributes no extra parameter.
        assert_eq!(cmd.parameter_count(), 2);
    }

    #[test]
    fn test_unfiltered_update_with_option() {
        let cmd = update(&Customer::sample())
            .option("(MAXDOP 1)")
            .build(&configured_model(), None)
            .unwrap();
        assert_eq!(
            cmd.text(),
            "update [Customers] set [Name] = @Name, [Active] = @Active OPTION (MAXDOP 1)"
        );
    }
}
