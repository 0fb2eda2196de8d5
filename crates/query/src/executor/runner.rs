//! Physical plan runner.
//!
//! Turns a `PhysicalPlan` into a tree of pull-based operators. Every node
//! gets its own evaluator sharing the execution context, so subqueries
//! anywhere in the tree use the same memo cache.

use crate::context::ExecutionContext;
use crate::executor::{
    drain, AggregateExecutor, BoxedOperator, DistinctExecutor, ExecutionResult, ExprEvaluator,
    FilterExecutor, LimitExecutor, NestedLoopJoin, ProjectExecutor, SortExecutor,
    TableScanExecutor,
};
use crate::planner::PhysicalPlan;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use roster_core::{Row, Value};

/// Builds and runs operator trees for physical plans.
pub struct PhysicalPlanRunner<'a> {
    ctx: Rc<ExecutionContext<'a>>,
}

impl<'a> PhysicalPlanRunner<'a> {
    /// Creates a runner over an execution context.
    pub fn new(ctx: Rc<ExecutionContext<'a>>) -> Self {
        Self { ctx }
    }

    /// Returns the execution context.
    pub fn context(&self) -> &Rc<ExecutionContext<'a>> {
        &self.ctx
    }

    /// Builds the operator tree for `plan`. `params` are the correlation
    /// values visible to `Param` expressions in the plan.
    pub fn build<'p>(
        &self,
        plan: &'p PhysicalPlan,
        params: Rc<[Value]>,
    ) -> ExecutionResult<BoxedOperator<'p>>
    where
        'a: 'p,
    {
        let ctx: Rc<ExecutionContext<'p>> = Rc::clone(&self.ctx);
        build_operator(&ctx, plan, &params)
    }

    /// Executes `plan` to completion.
    pub fn execute<'p>(&self, plan: &'p PhysicalPlan, params: Rc<[Value]>) -> ExecutionResult<Vec<Row>>
    where
        'a: 'p,
    {
        let mut root = self.build(plan, params)?;
        drain(&mut root)
    }
}

fn build_operator<'p>(
    ctx: &Rc<ExecutionContext<'p>>,
    plan: &'p PhysicalPlan,
    params: &Rc<[Value]>,
) -> ExecutionResult<BoxedOperator<'p>> {
    let evaluator = || ExprEvaluator::new(Rc::clone(ctx), Rc::clone(params));

    let op: BoxedOperator<'p> = match plan {
        PhysicalPlan::TableScan { table } => {
            let relation = ctx.catalog().relation(table)?;
            Box::new(TableScanExecutor::new(relation.rows()))
        }

        PhysicalPlan::Filter { input, predicate } => Box::new(FilterExecutor::new(
            build_operator(ctx, input, params)?,
            predicate,
            evaluator(),
        )),

        PhysicalPlan::Project { input, columns } => Box::new(ProjectExecutor::new(
            build_operator(ctx, input, params)?,
            columns,
            evaluator(),
        )),

        PhysicalPlan::NestedLoopJoin {
            left,
            right,
            condition,
            join_type,
            right_width,
        } => Box::new(NestedLoopJoin::new(
            build_operator(ctx, left, params)?,
            build_operator(ctx, right, params)?,
            condition,
            *join_type,
            *right_width,
            evaluator(),
        )),

        PhysicalPlan::HashAggregate {
            input,
            group_by,
            accumulators,
            outputs,
            having,
        } => Box::new(AggregateExecutor::new(
            build_operator(ctx, input, params)?,
            group_by,
            accumulators,
            outputs,
            having.as_ref(),
            evaluator(),
        )),

        PhysicalPlan::Distinct { input } => {
            Box::new(DistinctExecutor::new(build_operator(ctx, input, params)?))
        }

        PhysicalPlan::Sort { input, order_by } => Box::new(SortExecutor::new(
            build_operator(ctx, input, params)?,
            order_by,
            evaluator(),
        )),

        PhysicalPlan::Limit {
            input,
            limit,
            offset,
        } => Box::new(LimitExecutor::new(
            build_operator(ctx, input, params)?,
            *limit,
            *offset,
        )),
    };
    Ok(op)
}
