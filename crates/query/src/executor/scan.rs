//! Relation scan executor.

use crate::executor::{ExecutionResult, Operator};
use roster_core::Row;

/// Emits the rows of a catalog relation in load order.
pub struct TableScanExecutor<'a> {
    rows: &'a [Row],
    position: usize,
}

impl<'a> TableScanExecutor<'a> {
    /// Creates a scan over the given rows.
    pub fn new(rows: &'a [Row]) -> Self {
        Self { rows, position: 0 }
    }
}

impl Operator for TableScanExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }
}
