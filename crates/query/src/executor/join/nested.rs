//! Nested Loop Join implementation.

use crate::executor::{drain, BoxedOperator, ExecutionResult, ExprEvaluator, Operator};
use crate::planner::physical::BoundExpr;
use crate::planner::JoinType;
use alloc::vec::Vec;
use roster_core::Row;

/// Nested Loop Join executor.
///
/// Compares every pair of rows, so any condition works, including joins of a
/// relation with itself under two aliases. The right input is materialized on
/// the first pull and the left input is streamed. Output rows follow left
/// input order, then right input order.
pub struct NestedLoopJoin<'a> {
    left: BoxedOperator<'a>,
    right: BoxedOperator<'a>,
    condition: &'a BoundExpr,
    join_type: JoinType,
    right_width: usize,
    evaluator: ExprEvaluator<'a>,
    right_rows: Option<Vec<Row>>,
    current: Option<Row>,
    position: usize,
    matched: bool,
    emitted: usize,
}

impl<'a> NestedLoopJoin<'a> {
    /// Creates a new nested loop join executor.
    pub fn new(
        left: BoxedOperator<'a>,
        right: BoxedOperator<'a>,
        condition: &'a BoundExpr,
        join_type: JoinType,
        right_width: usize,
        evaluator: ExprEvaluator<'a>,
    ) -> Self {
        Self {
            left,
            right,
            condition,
            join_type,
            right_width,
            evaluator,
            right_rows: None,
            current: None,
            position: 0,
            matched: false,
            emitted: 0,
        }
    }

    /// Creates an inner nested loop join.
    pub fn inner(
        left: BoxedOperator<'a>,
        right: BoxedOperator<'a>,
        condition: &'a BoundExpr,
        right_width: usize,
        evaluator: ExprEvaluator<'a>,
    ) -> Self {
        Self::new(left, right, condition, JoinType::Inner, right_width, evaluator)
    }

    /// Creates a left outer nested loop join.
    pub fn left_outer(
        left: BoxedOperator<'a>,
        right: BoxedOperator<'a>,
        condition: &'a BoundExpr,
        right_width: usize,
        evaluator: ExprEvaluator<'a>,
    ) -> Self {
        Self::new(left, right, condition, JoinType::LeftOuter, right_width, evaluator)
    }
}

impl Operator for NestedLoopJoin<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        if self.right_rows.is_none() {
            let rows = drain(&mut self.right)?;
            log::trace!("nested loop join buffered {} right rows", rows.len());
            self.right_rows = Some(rows);
        }

        loop {
            if self.current.is_none() {
                match self.left.next()? {
                    Some(row) => {
                        self.position = 0;
                        self.matched = false;
                        self.current = Some(row);
                    }
                    None => {
                        log::trace!("nested loop join emitted {} rows", self.emitted);
                        return Ok(None);
                    }
                }
            }
            let left = match &self.current {
                Some(row) => row,
                None => return Ok(None),
            };

            let right_rows = self.right_rows.as_deref().unwrap_or(&[]);
            while let Some(right) = right_rows.get(self.position) {
                self.position += 1;
                let combined = Row::concat(left, right);
                if self.evaluator.eval_predicate(self.condition, combined.values())? {
                    self.matched = true;
                    self.emitted += 1;
                    return Ok(Some(combined));
                }
            }

            let padded = (self.join_type == JoinType::LeftOuter && !self.matched)
                .then(|| Row::concat(left, &Row::nulls(self.right_width)));
            self.current = None;
            if let Some(row) = padded {
                self.emitted += 1;
                return Ok(Some(row));
            }
        }
    }
}
