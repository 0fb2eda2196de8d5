//! Query executor: binds a logical plan and runs it against a catalog.

use crate::context::{ExecutionConfig, ExecutionContext, ExecutionStats};
use crate::executor::{
    BoxedOperator, ExecutionError, ExecutionResult, Operator, PhysicalPlanRunner, ResultColumn,
    ResultSet,
};
use crate::planner::{BoundQuery, LogicalPlan, PhysicalPlan, QueryPlanner};
use alloc::rc::Rc;
use alloc::vec::Vec;
use roster_core::{Catalog, Row};

/// Entry point for running queries against a catalog.
///
/// # Example
///
/// ```rust
/// use roster_core::{Catalog, Row, Value};
/// use roster_query::ast::Expr;
/// use roster_query::executor::QueryExecutor;
/// use roster_query::planner::LogicalPlan;
///
/// let regions = vec![
///     Row::new(vec!["Oregon".into(), "OR".into(), "West".into(), "Pacific".into()]),
///     Row::new(vec!["Ohio".into(), "OH".into(), "Midwest".into(), Value::Null]),
/// ];
/// let catalog = Catalog::with_builtin(vec![], regions).unwrap();
///
/// let plan = LogicalPlan::project(
///     LogicalPlan::filter(
///         LogicalPlan::scan("regions"),
///         Expr::eq(Expr::col("region"), Expr::literal("West")),
///     ),
///     vec![Expr::col("state_name").into()],
/// );
///
/// let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();
/// assert_eq!(result.column_names(), vec!["state_name"]);
/// assert_eq!(result.rows, vec![Row::new(vec!["Oregon".into()])]);
/// ```
pub struct QueryExecutor<'a> {
    catalog: &'a Catalog,
    config: ExecutionConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor with the default configuration.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, ExecutionConfig::default())
    }

    /// Creates an executor with the given configuration.
    pub fn with_config(catalog: &'a Catalog, config: ExecutionConfig) -> Self {
        Self { catalog, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Binds a plan without running it. Binding errors surface here, before
    /// any row is read.
    pub fn prepare(&self, plan: &LogicalPlan) -> ExecutionResult<PreparedQuery<'a>> {
        let bound = QueryPlanner::new(self.catalog).plan(plan)?;
        log::debug!(
            "bound {} plan with {} output columns",
            bound.plan.name(),
            bound.columns.len()
        );
        Ok(PreparedQuery {
            catalog: self.catalog,
            config: self.config,
            bound,
        })
    }

    /// Binds and runs a plan, materializing every row.
    pub fn execute(&self, plan: &LogicalPlan) -> ExecutionResult<ResultSet> {
        self.prepare(plan)?.execute()
    }
}

/// A bound plan that can be executed any number of times.
///
/// Every execution gets a fresh `ExecutionContext`, so subquery results are
/// never shared between runs.
#[derive(Clone, Debug)]
pub struct PreparedQuery<'a> {
    catalog: &'a Catalog,
    config: ExecutionConfig,
    bound: BoundQuery,
}

impl<'a> PreparedQuery<'a> {
    /// Returns the output columns.
    pub fn columns(&self) -> &[ResultColumn] {
        &self.bound.columns
    }

    /// Returns the bound physical plan.
    pub fn physical_plan(&self) -> &PhysicalPlan {
        &self.bound.plan
    }

    /// Runs the query to completion.
    pub fn execute(&self) -> ExecutionResult<ResultSet> {
        self.execute_with_stats().map(|(result, _)| result)
    }

    /// Runs the query to completion and also returns the execution counters.
    pub fn execute_with_stats(&self) -> ExecutionResult<(ResultSet, ExecutionStats)> {
        let ctx = Rc::new(ExecutionContext::new(self.catalog, self.config));
        let rows = PhysicalPlanRunner::new(Rc::clone(&ctx)).execute(&self.bound.plan, Rc::from(Vec::new()))?;
        let stats = ctx.stats();
        log::debug!(
            "query produced {} rows ({} subquery runs, {} cache hits)",
            rows.len(),
            stats.subquery_runs,
            stats.subquery_hits
        );
        Ok((ResultSet::new(self.bound.columns.clone(), rows), stats))
    }

    /// Starts a lazy execution. Rows are produced as the stream is pulled;
    /// dropping the stream stops the query.
    pub fn stream(&self) -> QueryStream<'_> {
        let ctx = Rc::new(ExecutionContext::new(self.catalog, self.config));
        let root = PhysicalPlanRunner::new(ctx).build(&self.bound.plan, Rc::from(Vec::new()));
        QueryStream {
            columns: &self.bound.columns,
            state: match root {
                Ok(root) => StreamState::Running(root),
                Err(err) => StreamState::Failed(Some(err)),
            },
        }
    }
}

enum StreamState<'a> {
    Running(BoxedOperator<'a>),
    Failed(Option<ExecutionError>),
    Done,
}

/// Lazy row iterator over a prepared query.
///
/// Yields `Err` at most once; the stream is finished afterwards.
pub struct QueryStream<'a> {
    columns: &'a [ResultColumn],
    state: StreamState<'a>,
}

impl QueryStream<'_> {
    /// Returns the output columns.
    pub fn columns(&self) -> &[ResultColumn] {
        self.columns
    }
}

impl Iterator for QueryStream<'_> {
    type Item = ExecutionResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            StreamState::Running(root) => match root.next() {
                Ok(Some(row)) => Some(Ok(row)),
                Ok(None) => {
                    self.state = StreamState::Done;
                    None
                }
                Err(err) => {
                    self.state = StreamState::Done;
                    Some(Err(err))
                }
            },
            StreamState::Failed(err) => {
                let err = err.take();
                self.state = StreamState::Done;
                err.map(Err)
            }
            StreamState::Done => None,
        }
    }
}
