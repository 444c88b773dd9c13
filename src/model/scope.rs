//! Column scope rules: which entity properties participate in each
//! statement kind.

use crate::error::{QueryError, QueryResult};
use crate::model::{Entity, EntityConfiguration, Property, PropertyKind};

/// The statement kind a scope is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Whether a property is in scope for the given statement kind.
///
/// Select takes everything not excluded; Insert additionally drops
/// computed columns; Update and Delete additionally drop key columns.
/// Non-column-eligible property types fail outright.
fn in_scope(
    kind: StatementKind,
    config: Option<&EntityConfiguration>,
    property: &Property,
) -> QueryResult<bool> {
    if let PropertyKind::Other(type_name) = property.kind {
        return Err(QueryError::unsupported_type(
            property.name,
            format!("`{type_name}` is not a primitive, string, or nullable primitive"),
        ));
    }
    let Some(config) = config else {
        return Ok(true);
    };
    if config.is_excluded(property.name) {
        return Ok(false);
    }
    let keep = match kind {
        StatementKind::Select => true,
        StatementKind::Insert => !config.is_computed(property.name),
        StatementKind::Update | StatementKind::Delete => {
            !config.is_computed(property.name) && !config.is_key(property.name)
        }
    };
    Ok(keep)
}

/// Resolve the in-scope properties of `T` for a statement kind, in
/// declaration order.
pub fn scoped_properties<T: Entity>(
    kind: StatementKind,
    config: Option<&EntityConfiguration>,
) -> QueryResult<Vec<&'static Property>> {
    scoped_slice(kind, config, T::properties())
}

/// Slice-based variant for callers holding a property list without the
/// entity type itself (joined entities).
pub(crate) fn scoped_slice(
    kind: StatementKind,
    config: Option<&EntityConfiguration>,
    properties: &'static [Property],
) -> QueryResult<Vec<&'static Property>> {
    let mut scoped = Vec::new();
    for property in properties {
        if in_scope(kind, config, property)? {
            scoped.push(property);
        }
    }
    Ok(scoped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    struct Customer;

    impl Entity for Customer {
        fn entity_name() -> &'static str {
            "Customer"
        }

        fn properties() -> &'static [Property] {
            static PROPERTIES: &[Property] = &[
                Property::new("CustomerId", PropertyKind::Int32),
                Property::new("Name", PropertyKind::String),
                Property::new("RowVersion", PropertyKind::Bytes),
                Property::new("Scratch", PropertyKind::String),
            ];
            PROPERTIES
        }

        fn get(&self, _property: &str) -> Option<Value> {
            None
        }
    }

    struct WithNavigation;

    impl Entity for WithNavigation {
        fn entity_name() -> &'static str {
            "WithNavigation"
        }

        fn properties() -> &'static [Property] {
            static PROPERTIES: &[Property] = &[
                Property::new("Id", PropertyKind::Int32),
                Property::new("Orders", PropertyKind::Other("Vec<Order>")),
            ];
            PROPERTIES
        }

        fn get(&self, _property: &str) -> Option<Value> {
            None
        }
    }

    fn config() -> EntityConfiguration {
        EntityConfiguration::new("Customer")
            .key("CustomerId")
            .computed("RowVersion")
            .exclude("Scratch")
    }

    fn names(props: &[&'static Property]) -> Vec<&'static str> {
        props.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_select_scope_drops_excluded_only() {
        let config = config();
        let props = scoped_properties::<Customer>(StatementKind::Select, Some(&config)).unwrap();
        assert_eq!(names(&props), vec!["CustomerId", "Name", "RowVersion"]);
    }

    #[test]
    fn test_insert_scope_drops_computed() {
        let config = config();
        let props = scoped_properties::<Customer>(StatementKind::Insert, Some(&config)).unwrap();
        assert_eq!(names(&props), vec!["CustomerId", "Name"]);
    }

    #[test]
    fn test_update_scope_drops_keys() {
        let config = config();
        let props = scoped_properties::<Customer>(StatementKind::Update, Some(&config)).unwrap();
        assert_eq!(names(&props), vec!["Name"]);
    }

    #[test]
    fn test_no_config_keeps_everything() {
        let props = scoped_properties::<Customer>(StatementKind::Update, None).unwrap();
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn test_non_primitive_property_rejected() {
        let err = scoped_properties::<WithNavigation>(StatementKind::Select, None).unwrap_err();
        assert!(matches!(
            err,
            crate::error::QueryError::UnsupportedType { .. }
        ));
    }
}
