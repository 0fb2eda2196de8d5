//! Operator trait for query execution.

use crate::executor::ExecutionResult;
use alloc::boxed::Box;
use alloc::vec::Vec;
use roster_core::Row;

/// A pull-based query operator.
///
/// Each call to `next` produces the next output row, or `None` once the
/// operator is exhausted. Operators pull from their inputs only as far as
/// needed to produce the row being asked for.
pub trait Operator {
    /// Produces the next row.
    fn next(&mut self) -> ExecutionResult<Option<Row>>;
}

/// A type-erased operator borrowing plan data for `'a`.
pub type BoxedOperator<'a> = Box<dyn Operator + 'a>;

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        (**self).next()
    }
}

/// Pulls every remaining row out of an operator.
pub fn drain(op: &mut dyn Operator) -> ExecutionResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(row) = op.next()? {
        rows.push(row);
    }
    Ok(rows)
}

/// Emits a fixed sequence of rows.
pub struct ValuesExecutor {
    rows: alloc::vec::IntoIter<Row>,
}

impl ValuesExecutor {
    /// Creates an operator over the given rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Operator for ValuesExecutor {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        Ok(self.rows.next())
    }
}
