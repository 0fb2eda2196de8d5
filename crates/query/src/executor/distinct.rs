//! Duplicate elimination executor.

use crate::executor::{BoxedOperator, ExecutionResult, Operator};
use hashbrown::HashSet;
use roster_core::Row;

/// Emits each distinct row once, at its first occurrence.
///
/// Rows compare by value equality, so two nulls in the same position are
/// duplicates.
pub struct DistinctExecutor<'a> {
    input: BoxedOperator<'a>,
    seen: HashSet<Row>,
}

impl<'a> DistinctExecutor<'a> {
    /// Creates a new distinct executor.
    pub fn new(input: BoxedOperator<'a>) -> Self {
        Self {
            input,
            seen: HashSet::new(),
        }
    }
}

impl Operator for DistinctExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        while let Some(row) = self.input.next()? {
            if !self.seen.contains(&row) {
                self.seen.insert(row.clone());
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
