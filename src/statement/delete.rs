//! The delete builder.

use std::marker::PhantomData;

use crate::ast::Expr;
use crate::batch::QueryBatch;
use crate::command::QueryCommand;
use crate::error::QueryResult;
use crate::model::{scoped_properties, Entity, Model, StatementKind};
use crate::translate::{EntityBinding, Translator};

use super::{append_option_clause, batch_context, table_reference};

/// Start a delete over entity `T`.
pub fn delete<T: Entity>() -> Delete<T> {
    Delete {
        filter: None,
        option: None,
        base_name: "@p".to_string(),
        can_split: true,
        _entity: PhantomData,
    }
}

/// Fluent delete statement over one entity.
pub struct Delete<T: Entity> {
    filter: Option<Expr>,
    option: Option<String>,
    base_name: String,
    can_split: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Delete<T> {
    /// Set the where-clause predicate.
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

    /// Render the statement. Delete projects no column list, but still
    /// resolves the delete column scope so unsupported property types
    /// fail here rather than at execution.
    pub fn build(self, model: &Model, batch: Option<&mut QueryBatch>) -> QueryResult<QueryCommand> {
        let (batch_qualifier, embedded) = batch_context(batch);
        let config = model.config(T::entity_name());
        scoped_properties::<T>(StatementKind::Delete, config)?;

        let mut sql = format!("delete from {}", table_reference(T::entity_name(), config));
        let mut parameters = Vec::new();
        if let Some(filter) = &self.filter {
            let translator = Translator::new(vec![EntityBinding {
                entity_name: T::entity_name(),
                config,
            }])
            .with_embedded(embedded)
            .with_batch_qualifier(batch_qualifier);
            let (clause, filter_parameters) = translator.translate_filter(filter, &self.base_name)?;
            sql.push_str(" where ");
            sql.push_str(&clause);
            parameters = filter_parameters;
        }

        append_option_clause(&mut sql, self.option.as_deref());
        tracing::debug!(
            entity = T::entity_name(),
            parameters = parameters.len(),
            "built delete"
        );
        Ok(QueryCommand::new(sql, parameters, self.can_split))
    }
}
