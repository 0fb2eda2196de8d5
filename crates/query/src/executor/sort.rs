//! Sort executor.

use crate::ast::SortOrder;
use crate::executor::{drain, BoxedOperator, ExecutionResult, ExprEvaluator, Operator};
use crate::planner::physical::BoundExpr;
use alloc::vec::Vec;
use core::cmp::Ordering;
use roster_core::{Row, Value};

/// Stable multi-key sort.
///
/// Keys compare with the total order on `Value`: null sorts lowest, so it
/// comes first ascending and last descending. Rows with equal keys keep
/// their input order. The input is consumed on the first pull.
pub struct SortExecutor<'a> {
    input: BoxedOperator<'a>,
    order_by: &'a [(BoundExpr, SortOrder)],
    evaluator: ExprEvaluator<'a>,
    sorted: Option<alloc::vec::IntoIter<Row>>,
}

impl<'a> SortExecutor<'a> {
    /// Creates a new sort executor.
    pub fn new(
        input: BoxedOperator<'a>,
        order_by: &'a [(BoundExpr, SortOrder)],
        evaluator: ExprEvaluator<'a>,
    ) -> Self {
        Self {
            input,
            order_by,
            evaluator,
            sorted: None,
        }
    }

    fn sort_input(&mut self) -> ExecutionResult<Vec<Row>> {
        let rows = drain(&mut self.input)?;
        let mut keyed = rows
            .into_iter()
            .map(|row| {
                let keys = self
                    .order_by
                    .iter()
                    .map(|(expr, _)| self.evaluator.eval(expr, row.values()))
                    .collect::<ExecutionResult<Vec<Value>>>()?;
                Ok((keys, row))
            })
            .collect::<ExecutionResult<Vec<(Vec<Value>, Row)>>>()?;

        keyed.sort_by(|(a, _), (b, _)| compare_keys(self.order_by, a, b));
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

fn compare_keys(order_by: &[(BoundExpr, SortOrder)], a: &[Value], b: &[Value]) -> Ordering {
    for ((_, order), (av, bv)) in order_by.iter().zip(a.iter().zip(b)) {
        let cmp = av.cmp(bv);
        if cmp != Ordering::Equal {
            return match order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            };
        }
    }
    Ordering::Equal
}

impl Operator for SortExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        if self.sorted.is_none() {
            let rows = self.sort_input()?;
            self.sorted = Some(rows.into_iter());
        }
        Ok(self.sorted.as_mut().and_then(|rows| rows.next()))
    }
}
