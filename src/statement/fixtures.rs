//! Shared entity fixtures for the builder tests.

use crate::model::{Entity, EntityConfiguration, Model, Property, PropertyKind};
use crate::value::Value;

pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    pub active: bool,
}

impl Customer {
    pub fn sample() -> Self {
        Self {
            customer_id: 7,
            name: "Ada".to_string(),
            active: true,
        }
    }
}

impl Entity for Customer {
    fn entity_name() -> &'static str {
        "Customer"
    }

    fn properties() -> &'static [Property] {
        static PROPERTIES: &[Property] = &[
            Property::new("CustomerId", PropertyKind::Int64),
            Property::new("Name", PropertyKind::String),
            Property::new("Active", PropertyKind::Bool),
        ];
        PROPERTIES
    }

    fn get(&self, property: &str) -> Option<Value> {
        match property {
            "CustomerId" => Some(Value::Int(self.customer_id)),
            "Name" => Some(Value::from(self.name.clone())),
            "Active" => Some(Value::Bool(self.active)),
            _ => None,
        }
    }
}

pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
}

impl Entity for Order {
    fn entity_name() -> &'static str {
        "Order"
    }

    fn properties() -> &'static [Property] {
        static PROPERTIES: &[Property] = &[
            Property::new("OrderId", PropertyKind::Int64),
            Property::new("CustomerId", PropertyKind::Int64),
        ];
        PROPERTIES
    }

    fn get(&self, property: &str) -> Option<Value> {
        match property {
            "OrderId" => Some(Value::Int(self.order_id)),
            "CustomerId" => Some(Value::Int(self.customer_id)),
            _ => None,
        }
    }
}

/// A model mapping both fixtures onto plural table names, with
/// `CustomerId` as the customer key and identity column.
pub fn configured_model() -> Model {
    Model::new()
        .entity(
            "Customer",
            EntityConfiguration::new("Customers")
                .key("CustomerId")
                .identity(),
        )
        .entity("Order", EntityConfiguration::new("Orders").key("OrderId"))
}
