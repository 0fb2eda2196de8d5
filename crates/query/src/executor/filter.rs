//! Filter executor.

use crate::executor::{BoxedOperator, ExecutionResult, ExprEvaluator, Operator};
use crate::planner::physical::BoundExpr;
use roster_core::Row;

/// Passes through rows whose predicate evaluates to exactly true.
pub struct FilterExecutor<'a> {
    input: BoxedOperator<'a>,
    predicate: &'a BoundExpr,
    evaluator: ExprEvaluator<'a>,
}

impl<'a> FilterExecutor<'a> {
    /// Creates a new filter executor.
    pub fn new(input: BoxedOperator<'a>, predicate: &'a BoundExpr, evaluator: ExprEvaluator<'a>) -> Self {
        Self {
            input,
            predicate,
            evaluator,
        }
    }
}

impl Operator for FilterExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        while let Some(row) = self.input.next()? {
            if self.evaluator.eval_predicate(self.predicate, row.values())? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
