//! The insert builder.

use crate::batch::QueryBatch;
use crate::command::QueryCommand;
use crate::error::QueryResult;
use crate::model::{scoped_properties, Entity, Model, StatementKind};
use crate::param::make_qualified_parameter;
use crate::value::Value;

use super::{append_option_clause, batch_context, table_reference};

/// Start an insert of the given entity instance.
pub fn insert<T: Entity>(entity: &T) -> Insert<'_, T> {
    Insert {
        entity,
        option: None,
        can_split: true,
    }
}

/// Fluent insert statement for one entity row.
pub struct Insert<'e, T: Entity> {
    entity: &'e T,
    option: Option<String>,
    can_split: bool,
}

impl<T: Entity> Insert<'_, T> {
    /// Append a trailing option clause.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    /// Whether the batch packer may size the built command independently
    /// (default true).
    pub fn can_split(mut self, can_split: bool) -> Self {
        self.can_split = can_split;
        self
    }

    /// Render the statement. Entities marked with an identity column get
    /// a trailing `select SCOPE_IDENTITY()` statement.
    pub fn build(self, model: &Model, batch: Option<&mut QueryBatch>) -> QueryResult<QueryCommand> {
        let (batch_qualifier, _) = batch_context(batch);
        let config = model.config(T::entity_name());

        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        let mut parameters = Vec::new();
        for property in scoped_properties::<T>(StatementKind::Insert, config)? {
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
            columns.push(format!("[{column}]"));
            placeholders.push(parameter.name.clone());
            parameters.push(parameter);
        }

        let mut sql = format!(
            "insert {} ({}) values({})",
            table_reference(T::entity_name(), config),
            columns.join(", "),
            placeholders.join(", ")
        );
        append_option_clause(&mut sql, self.option.as_deref());
        if config.is_some_and(|c| c.has_identity()) {
            sql.push_str(";select SCOPE_IDENTITY()");
        }
        tracing::debug!(
            entity = T::entity_name(),
            parameters = parameters.len(),
            "built insert"
        );
        Ok(QueryCommand::new(sql, parameters, self.can_split))
    }
}
