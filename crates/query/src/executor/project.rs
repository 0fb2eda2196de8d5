//! Projection executor.

use crate::executor::{BoxedOperator, ExecutionResult, ExprEvaluator, Operator};
use crate::planner::physical::BoundExpr;
use alloc::vec::Vec;
use roster_core::Row;

/// Evaluates the output expressions for each input row.
pub struct ProjectExecutor<'a> {
    input: BoxedOperator<'a>,
    columns: &'a [BoundExpr],
    evaluator: ExprEvaluator<'a>,
}

impl<'a> ProjectExecutor<'a> {
    /// Creates a new project executor.
    pub fn new(input: BoxedOperator<'a>, columns: &'a [BoundExpr], evaluator: ExprEvaluator<'a>) -> Self {
        Self {
            input,
            columns,
            evaluator,
        }
    }
}

impl Operator for ProjectExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        let row = match self.input.next()? {
            Some(row) => row,
            None => return Ok(None),
        };
        let values = self
            .columns
            .iter()
            .map(|expr| self.evaluator.eval(expr, row.values()))
            .collect::<ExecutionResult<Vec<_>>>()?;
        Ok(Some(Row::new(values)))
    }
}
