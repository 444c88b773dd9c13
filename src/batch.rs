//! FIFO accumulation of built statements into packed round trips.
//!
//! A batch is a per-unit-of-work accumulator and is not thread-safe;
//! one instance belongs to one logical request.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::command::QueryCommand;
use crate::error::{QueryError, QueryResult};
use crate::param::Parameter;

/// Default ceiling on statements across the remaining queue.
pub const MAX_ALLOWED_STATEMENTS: usize = 1000;

/// Default ceiling on parameters in one packed round trip.
pub const MAX_ALLOWED_PARAMETERS: usize = 2000;

/// Packing ceilings. The defaults reflect one backend's historical
/// limits; override them when targeting different ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_statements: usize,
    pub max_parameters: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_statements: MAX_ALLOWED_STATEMENTS,
            max_parameters: MAX_ALLOWED_PARAMETERS,
        }
    }
}

/// A FIFO queue of built statements plus the shared parameter registries,
/// packed into round trips by [`QueryBatch::next_batch`].
#[derive(Debug)]
pub struct QueryBatch {
    queue: VecDeque<QueryCommand>,
    batch_size: usize,
    limits: BatchLimits,
    statement_counter: u32,
    embedded: Vec<(String, String)>,
    globals: Vec<Arc<Parameter>>,
    globals_read: bool,
    result_types: VecDeque<&'static str>,
    expected_result_sets: usize,
}

impl QueryBatch {
    /// A batch packing at most `batch_size` statements per round trip.
    /// The size is silently clamped to `1..=max_statements`.
    pub fn new(batch_size: usize) -> Self {
        Self::with_limits(batch_size, BatchLimits::default())
    }

    /// A batch with explicit packing ceilings.
    pub fn with_limits(batch_size: usize, limits: BatchLimits) -> Self {
        Self {
            queue: VecDeque::new(),
            batch_size: batch_size.clamp(1, limits.max_statements),
            limits,
            statement_counter: 0,
            embedded: Vec::new(),
            globals: Vec::new(),
            globals_read: false,
            result_types: VecDeque::new(),
            expected_result_sets: 0,
        }
    }

    /// Enqueue a built statement.
    pub fn add(&mut self, command: QueryCommand) -> QueryResult<()> {
        if command.is_empty() {
            return Err(QueryError::invalid("command", "statement text is empty"));
        }
        self.queue.push_back(command);
        Ok(())
    }

    /// Enqueue a statement expected to produce a result set of type `R`.
    pub fn add_typed<R: 'static>(&mut self, command: QueryCommand) -> QueryResult<()> {
        self.add(command)?;
        self.result_types.push_back(std::any::type_name::<R>());
        self.expected_result_sets += 1;
        Ok(())
    }

    /// Whether any statements remain queued.
    pub fn has_batch(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pre-increment and return the statement counter. Feeds
    /// parameter-name qualification only.
    pub fn next_batch_index(&mut self) -> u32 {
        self.statement_counter += 1;
        self.statement_counter
    }

    /// Register a column-to-parameter-name mapping so later filters reuse
    /// the name instead of allocating a duplicate.
    pub fn add_embedded_parameter(
        &mut self,
        column: impl Into<String>,
        parameter_name: impl Into<String>,
    ) -> QueryResult<()> {
        let column = column.into();
        let parameter_name = parameter_name.into();
        if column.is_empty() {
            return Err(QueryError::invalid("column", "embedded-parameter column name is empty"));
        }
        if parameter_name.is_empty() {
            return Err(QueryError::invalid(
                "parameter_name",
                "embedded-parameter name is empty",
            ));
        }
        self.embedded.push((column, parameter_name));
        Ok(())
    }

    /// The embedded-parameter registry contents.
    pub fn embedded_parameters(&self) -> Vec<(String, String)> {
        self.embedded.clone()
    }

    /// Register a fully built parameter shared by every round trip this
    /// batch produces.
    pub fn add_global_parameter(&mut self, parameter: Arc<Parameter>) -> QueryResult<()> {
        if parameter.source_column.is_empty() {
            return Err(QueryError::invalid(
                "parameter",
                "global parameter has no source column",
            ));
        }
        self.globals.push(parameter);
        Ok(())
    }

    /// The global-parameter registry: the live stored descriptors on the
    /// first call, fresh deep copies on every call after that. The first
    /// consumer may mutate its round's copies; later reads stay
    /// independent.
    pub fn global_parameters(&mut self) -> Vec<Arc<Parameter>> {
        if !self.globals_read {
            self.globals_read = true;
            self.globals.iter().map(Arc::clone).collect()
        } else {
            self.globals
                .iter()
                .map(|parameter| Arc::new(parameter.as_ref().clone()))
                .collect()
        }
    }

    /// Reset both parameter registries.
    pub fn clear_globals(&mut self) {
        self.embedded.clear();
        self.globals.clear();
        self.globals_read = false;
    }

    /// Result-set types still expected, front first.
    pub fn current_result(&self) -> Option<&'static str> {
        self.result_types.front().copied()
    }

    pub fn has_result(&self) -> bool {
        !self.result_types.is_empty()
    }

    /// Advance past the front result type.
    pub fn move_to_next_result_type(&mut self) {
        self.result_types.pop_front();
    }

    /// Number of result sets the queued statements are expected to yield.
    pub fn expected_result_set_count(&self) -> usize {
        self.expected_result_sets
    }

    /// Pack the next round trip: dequeue in FIFO order while the
    /// statement count stays within `batch_size` and the parameter count
    /// (own plus globals) stays within the parameter ceiling. Texts
    /// concatenate verbatim with no separators; parameters concatenate in
    /// dequeue order with globals appended last. An empty queue yields
    /// the empty command.
    pub fn next_batch(&mut self) -> QueryResult<QueryCommand> {
        if self.queue.is_empty() {
            return Ok(QueryCommand::empty());
        }
        if self.queue.len() > self.limits.max_statements
            && !self.queue.iter().any(QueryCommand::can_split)
        {
            return Err(QueryError::CapacityExceeded {
                statements: self.queue.len(),
                parameters: 0,
                detail: format!(
                    "{} queued statements exceed the ceiling of {} and none may split",
                    self.queue.len(),
                    self.limits.max_statements
                ),
            });
        }

        let globals = self.global_parameters();
        let global_count = globals.len();

        let mut text = String::new();
        let mut parameters: Vec<Parameter> = Vec::new();
        let mut statements = 0usize;
        loop {
            let Some(front) = self.queue.front() else {
                break;
            };
            let own = front.parameter_count();
            if own > self.limits.max_parameters && !front.can_split() {
                // Raise only when the offender heads a fresh round trip;
                // otherwise emit what is packed so far and let the next
                // call fail without dropping dequeued statements.
                if statements == 0 {
                    return Err(QueryError::CapacityExceeded {
                        statements: 1,
                        parameters: own,
                        detail: format!(
                            "a single statement carries {own} parameters, over the ceiling of {}, \
                             and may not split",
                            self.limits.max_parameters
                        ),
                    });
                }
                break;
            }
            if statements + 1 > self.batch_size {
                break;
            }
            if parameters.len() + own + global_count > self.limits.max_parameters {
                if statements == 0 {
                    return Err(QueryError::CapacityExceeded {
                        statements: 1,
                        parameters: own + global_count,
                        detail: format!(
                            "statement plus global parameters total {}, over the ceiling of {}",
                            own + global_count,
                            self.limits.max_parameters
                        ),
                    });
                }
                break;
            }
            let Some(command) = self.queue.pop_front() else {
                break;
            };
            text.push_str(command.text());
            parameters.extend(command.parameters().iter().cloned());
            statements += 1;
        }

        for global in &globals {
            parameters.push(global.as_ref().clone());
        }
        tracing::debug!(
            statements,
            parameters = parameters.len(),
            remaining = self.queue.len(),
            "packed round trip"
        );
        Ok(QueryCommand::new(text, parameters, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{make_parameter, make_qualified_parameter};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn command(text: &str, parameters: usize, can_split: bool) -> QueryCommand {
        let params = (0..parameters)
            .map(|i| make_parameter(Value::Int(i as i64), format!("@p{i}"), None))
            .collect();
        QueryCommand::new(text, params, can_split)
    }

    #[test]
    fn test_six_commands_pack_in_order() {
        let mut batch = QueryBatch::new(3);
        for i in 0..6 {
            batch.add(command(&format!("s{i};"), 1, true)).unwrap();
        }
        let first = batch.next_batch().unwrap();
        assert_eq!(first.text(), "s0;s1;s2;");
        assert_eq!(first.parameter_count(), 3);
        assert!(batch.has_batch());

        let second = batch.next_batch().unwrap();
        assert_eq!(second.text(), "s3;s4;s5;");
        assert!(!batch.has_batch());
        assert!(batch.next_batch().unwrap().is_empty());
    }

    #[test]
    fn test_parameter_values_keep_dequeue_order() {
        let mut batch = QueryBatch::new(2);
        batch
            .add(QueryCommand::new(
                "a;",
                vec![make_parameter(Value::Int(1), "@a", None)],
                true,
            ))
            .unwrap();
        batch
            .add(QueryCommand::new(
                "b;",
                vec![make_parameter(Value::Int(2), "@b", None)],
                true,
            ))
            .unwrap();
        let packed = batch.next_batch().unwrap();
        let names: Vec<_> = packed.parameters().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["@a", "@b"]);
    }

    #[test]
    fn test_too_many_unsplittable_statements_fail() {
        let limits = BatchLimits {
            max_statements: 2,
            max_parameters: 100,
        };
        let mut batch = QueryBatch::with_limits(2, limits);
        for i in 0..3 {
            batch.add(command(&format!("s{i};"), 0, false)).unwrap();
        }
        assert!(matches!(
            batch.next_batch(),
            Err(QueryError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_splittable_overflow_packs_in_rounds() {
        let limits = BatchLimits {
            max_statements: 2,
            max_parameters: 100,
        };
        let mut batch = QueryBatch::with_limits(2, limits);
        for i in 0..3 {
            batch.add(command(&format!("s{i};"), 0, true)).unwrap();
        }
        assert_eq!(batch.next_batch().unwrap().text(), "s0;s1;");
        assert_eq!(batch.next_batch().unwrap().text(), "s2;");
    }

    #[test]
    fn test_oversized_unsplittable_command_fails() {
        let limits = BatchLimits {
            max_statements: 10,
            max_parameters: 3,
        };
        let mut batch = QueryBatch::with_limits(5, limits);
        batch.add(command("big;", 4, false)).unwrap();
        assert!(matches!(
            batch.next_batch(),
            Err(QueryError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_oversized_command_behind_packed_ones_keeps_the_queue_intact() {
        let limits = BatchLimits {
            max_statements: 10,
            max_parameters: 3,
        };
        let mut batch = QueryBatch::with_limits(5, limits);
        batch.add(command("a;", 1, true)).unwrap();
        batch.add(command("big;", 4, false)).unwrap();

        // The fitting statement packs; nothing already dequeued is lost.
        assert_eq!(batch.next_batch().unwrap().text(), "a;");
        assert!(batch.has_batch());

        // The offender now heads a fresh round trip and fails there.
        assert!(matches!(
            batch.next_batch(),
            Err(QueryError::CapacityExceeded { .. })
        ));
        assert!(batch.has_batch());
    }

    #[test]
    fn test_parameter_ceiling_splits_round_trips() {
        let limits = BatchLimits {
            max_statements: 10,
            max_parameters: 3,
        };
        let mut batch = QueryBatch::with_limits(5, limits);
        batch.add(command("a;", 2, true)).unwrap();
        batch.add(command("b;", 2, true)).unwrap();
        assert_eq!(batch.next_batch().unwrap().text(), "a;");
        assert_eq!(batch.next_batch().unwrap().text(), "b;");
    }

    #[test]
    fn test_globals_append_after_own_parameters() {
        let mut batch = QueryBatch::new(2);
        batch
            .add_global_parameter(Arc::new(make_qualified_parameter(
                Value::Int(9),
                "TenantId",
                None,
                "@tenant",
                0,
                0,
                0,
            )))
            .unwrap();
        batch.add(command("a;", 1, true)).unwrap();
        let packed = batch.next_batch().unwrap();
        let names: Vec<_> = packed.parameters().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["@p0", "@tenant"]);
    }

    #[test]
    fn test_global_parameters_first_read_is_live() {
        let shared = Arc::new(make_qualified_parameter(
            Value::Int(9),
            "TenantId",
            None,
            "@tenant",
            0,
            0,
            0,
        ));
        let mut batch = QueryBatch::new(1);
        batch.add_global_parameter(Arc::clone(&shared)).unwrap();

        let first = batch.global_parameters();
        assert!(Arc::ptr_eq(&first[0], &shared));

        let second = batch.global_parameters();
        assert!(!Arc::ptr_eq(&second[0], &shared));
        assert_eq!(*second[0], *shared);
    }

    #[test]
    fn test_clear_globals_resets_registries_and_read_flag() {
        let shared = Arc::new(make_qualified_parameter(
            Value::Int(9),
            "TenantId",
            None,
            "@tenant",
            0,
            0,
            0,
        ));
        let mut batch = QueryBatch::new(1);
        batch.add_global_parameter(Arc::clone(&shared)).unwrap();
        batch.add_embedded_parameter("TenantId", "@tenant").unwrap();
        let _ = batch.global_parameters();

        batch.clear_globals();
        assert!(batch.embedded_parameters().is_empty());

        // Re-adding after the reset: the next read is a first read again,
        // so it hands out the live descriptor.
        batch.add_global_parameter(Arc::clone(&shared)).unwrap();
        let reread = batch.global_parameters();
        assert_eq!(reread.len(), 1);
        assert!(Arc::ptr_eq(&reread[0], &shared));
    }

    #[test]
    fn test_registry_argument_validation() {
        let mut batch = QueryBatch::new(1);
        assert!(batch.add_embedded_parameter("", "@p").is_err());
        assert!(batch.add_embedded_parameter("Col", "").is_err());

        let unbound = Arc::new(make_parameter(Value::Int(1), "@p", None));
        assert!(batch.add_global_parameter(unbound).is_err());

        assert!(batch.add(QueryCommand::empty()).is_err());
    }

    #[test]
    fn test_result_type_queue() {
        let mut batch = QueryBatch::new(2);
        batch.add_typed::<i64>(command("a;", 0, true)).unwrap();
        batch.add(command("b;", 0, true)).unwrap();
        assert_eq!(batch.expected_result_set_count(), 1);
        assert!(batch.has_result());
        assert_eq!(batch.current_result(), Some("i64"));

        batch.move_to_next_result_type();
        assert!(!batch.has_result());
        assert_eq!(batch.current_result(), None);
    }

    #[test]
    fn test_batch_size_clamps_to_one() {
        let mut batch = QueryBatch::new(0);
        batch.add(command("a;", 0, true)).unwrap();
        batch.add(command("b;", 0, true)).unwrap();
        assert_eq!(batch.next_batch().unwrap().text(), "a;");
    }

    #[test]
    fn test_next_batch_index_pre_increments() {
        let mut batch = QueryBatch::new(1);
        assert_eq!(batch.next_batch_index(), 1);
        assert_eq!(batch.next_batch_index(), 2);
    }
}
