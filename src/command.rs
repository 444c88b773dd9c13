//! The built statement: text plus its ordered parameters.

use std::cell::Cell;
use std::sync::Arc;

use crate::param::Parameter;

/// An immutable built statement (or packed round trip): SQL text, the
/// ordered parameter set, and whether the batch packer may treat it as
/// independently sized.
///
/// The parameter accessor hands out the canonical set on first access and
/// a defensive copy on every later access, so a caller cannot share and
/// mutate the canonical array after first use. The asymmetry is observable
/// through [`Arc::ptr_eq`].
#[derive(Debug, Clone)]
pub struct QueryCommand {
    text: String,
    parameters: Arc<Vec<Parameter>>,
    can_split: bool,
    read: Cell<bool>,
}

impl QueryCommand {
    /// Build a command from statement text and its parameters.
    pub fn new(text: impl Into<String>, parameters: Vec<Parameter>, can_split: bool) -> Self {
        Self {
            text: text.into(),
            parameters: Arc::new(parameters),
            can_split,
            read: Cell::new(false),
        }
    }

    /// A command from raw statement text with no parameters.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new(), true)
    }

    /// The empty sentinel: no text, no parameters.
    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new(), true)
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The statement text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of bound parameters. Does not count as a parameter access.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the batch packer may size this command independently.
    pub fn can_split(&self) -> bool {
        self.can_split
    }

    /// The bound parameters: the canonical set on first access, a deep
    /// copy on every access after that.
    pub fn parameters(&self) -> Arc<Vec<Parameter>> {
        if !self.read.get() {
            self.read.set(true);
            Arc::clone(&self.parameters)
        } else {
            Arc::new(self.parameters.as_ref().clone())
        }
    }
}

impl PartialEq for QueryCommand {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.parameters == other.parameters
            && self.can_split == other.can_split
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::make_parameter;
    use crate::value::Value;
    use std::sync::Arc;

    #[test]
    fn test_empty_sentinel() {
        let empty = QueryCommand::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.parameter_count(), 0);
        assert!(!QueryCommand::raw("select 1").is_empty());
    }

    #[test]
    fn test_parameter_count_matches_len() {
        let cmd = QueryCommand::new(
            "select 1",
            vec![make_parameter(Value::Int(1), "@p", None)],
            true,
        );
        assert_eq!(cmd.parameter_count(), cmd.parameters().len());
    }

    #[test]
    fn test_first_access_live_then_copies() {
        let cmd = QueryCommand::new(
            "select 1",
            vec![make_parameter(Value::Int(1), "@p", None)],
            true,
        );
        let first = cmd.parameters();
        let second = cmd.parameters();
        let third = cmd.parameters();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(*first, *second);
        assert_eq!(*second, *third);
    }
}
