pub mod ast;
pub mod batch;
pub mod command;
pub mod error;
pub mod model;
pub mod param;
pub mod statement;
pub mod translate;
pub mod value;

pub use batch::QueryBatch;
pub use command::QueryCommand;
pub use error::{QueryError, QueryResult};

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::{CompareOp, Expr};
    pub use crate::batch::{BatchLimits, QueryBatch};
    pub use crate::command::QueryCommand;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::model::{
        ColumnType, Entity, EntityConfiguration, Model, Property, PropertyKind, SqlDataType,
    };
    pub use crate::param::{make_parameter, make_qualified_parameter, Parameter, StringKind};
    pub use crate::statement::{delete, insert, select, update};
    pub use crate::value::{Record, Value};
}
