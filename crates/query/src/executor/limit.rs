//! Limit executor.

use crate::executor::{BoxedOperator, ExecutionResult, Operator};
use roster_core::Row;

/// Skips `offset` rows, then emits at most `limit` rows.
///
/// Once the limit is reached the input is never pulled again.
pub struct LimitExecutor<'a> {
    input: BoxedOperator<'a>,
    limit: usize,
    offset: usize,
    emitted: usize,
}

impl<'a> LimitExecutor<'a> {
    /// Creates a new limit executor.
    pub fn new(input: BoxedOperator<'a>, limit: usize, offset: usize) -> Self {
        Self {
            input,
            limit,
            offset,
            emitted: 0,
        }
    }
}

impl Operator for LimitExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        if self.emitted >= self.limit {
            return Ok(None);
        }
        while self.offset > 0 {
            if self.input.next()?.is_none() {
                self.offset = 0;
                self.limit = 0;
                return Ok(None);
            }
            self.offset -= 1;
        }
        let row = self.input.next()?;
        if row.is_some() {
            self.emitted += 1;
        }
        Ok(row)
    }
}
