//! Statement builders: select, insert, update, and delete over configured
//! entities.

mod delete;
#[cfg(test)]
pub(crate) mod fixtures;
mod insert;
mod select;
mod update;

pub use delete::{delete, Delete};
pub use insert::{insert, Insert};
pub use select::{select, JoinKind, Select};
pub use update::{update, Update};

use crate::batch::QueryBatch;
use crate::model::EntityConfiguration;

/// The bracketed table reference, schema-qualified when the configuration
/// names a schema. Unconfigured entities use their own name.
fn table_reference(entity_name: &str, config: Option<&EntityConfiguration>) -> String {
    match config {
        Some(config) => match config.schema_name() {
            Some(schema) => format!("[{}].[{}]", schema, config.table_name()),
            None => format!("[{}]", config.table_name()),
        },
        None => format!("[{entity_name}]"),
    }
}

/// The qualifier columns are prefixed with: a registered alias wins, then
/// the configured table name, then the entity name.
fn column_qualifier<'a>(
    entity_name: &'a str,
    alias: Option<&'a str>,
    config: Option<&'a EntityConfiguration>,
) -> &'a str {
    alias
        .or_else(|| config.map(|c| c.table_name()))
        .unwrap_or(entity_name)
}

/// Append a trailing option clause. Non-empty text not already starting
/// with `OPTION` (any case) gets the keyword prefixed; the rest of the
/// text keeps its original case.
fn append_option_clause(sql: &mut String, option: Option<&str>) {
    let Some(option) = option else {
        return;
    };
    if option.is_empty() {
        return;
    }
    sql.push(' ');
    let already_prefixed = option
        .get(.."OPTION".len())
        .is_some_and(|head| head.eq_ignore_ascii_case("OPTION"));
    if !already_prefixed {
        sql.push_str("OPTION ");
    }
    sql.push_str(option);
}

/// Pull the per-statement qualifier and the embedded-parameter registry
/// off the owning batch, if any.
fn batch_context(batch: Option<&mut QueryBatch>) -> (u32, Vec<(String, String)>) {
    match batch {
        Some(batch) => (batch.next_batch_index(), batch.embedded_parameters()),
        None => (0, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_reference() {
        assert_eq!(table_reference("Customer", None), "[Customer]");

        let config = EntityConfiguration::new("Customers");
        assert_eq!(table_reference("Customer", Some(&config)), "[Customers]");

        let config = EntityConfiguration::new("Customers").schema("dbo");
        assert_eq!(
            table_reference("Customer", Some(&config)),
            "[dbo].[Customers]"
        );
    }

    #[test]
    fn test_option_clause_prefixing() {
        let mut sql = String::from("select 1");
        append_option_clause(&mut sql, Some("(RECOMPILE)"));
        assert_eq!(sql, "select 1 OPTION (RECOMPILE)");

        let mut sql = String::from("select 1");
        append_option_clause(&mut sql, Some("option (MAXDOP 1)"));
        assert_eq!(sql, "select 1 option (MAXDOP 1)");

        let mut sql = String::from("select 1");
        append_option_clause(&mut sql, Some(""));
        assert_eq!(sql, "select 1");

        let mut sql = String::from("select 1");
        append_option_clause(&mut sql, None);
        assert_eq!(sql, "select 1");
    }
}
