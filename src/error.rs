//! Error types for statement compilation and batch packing.

use thiserror::Error;

/// The main error type for query compilation operations.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A required argument was null, empty, or otherwise unusable.
    #[error("Invalid argument `{what}`: {reason}")]
    InvalidArgument {
        what: &'static str,
        reason: String,
    },

    /// The expression tree contains a shape outside the supported grammar.
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A property's type cannot be mapped to a column.
    #[error("Unsupported type for property `{property}`: {reason}")]
    UnsupportedType {
        property: String,
        reason: String,
    },

    /// Pending statements cannot be packed within the configured limits.
    #[error("Batch capacity exceeded ({statements} statements, {parameters} parameters): {detail}")]
    CapacityExceeded {
        statements: usize,
        parameters: usize,
        detail: String,
    },
}

impl QueryError {
    /// Create an invalid-argument error.
    pub fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }

    /// Create an unsupported-expression error.
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedExpression(detail.into())
    }

    /// Create an unsupported-type error.
    pub fn unsupported_type(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for query compilation operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::unsupported("method call `Trim`");
        assert_eq!(err.to_string(), "Unsupported expression: method call `Trim`");

        let err = QueryError::invalid("columnName", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid argument `columnName`: must not be empty"
        );
    }
}
