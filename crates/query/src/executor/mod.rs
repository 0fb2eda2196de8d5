//! Query executor module.
//!
//! Operators are pull-based: each one implements [`Operator`] and asks its
//! input for rows only as it needs them. [`PhysicalPlanRunner`] assembles an
//! operator tree from a bound plan and [`QueryExecutor`] is the public entry
//! point that binds, builds and drives it.

mod aggregate;
mod distinct;
mod error;
mod eval;
mod filter;
mod functions;
pub mod join;
mod limit;
mod operator;
mod project;
mod query;
mod result;
mod runner;
mod scan;
mod sort;

pub use aggregate::AggregateExecutor;
pub use distinct::DistinctExecutor;
pub use error::{ErrorKind, ExecutionError, ExecutionResult};
pub use eval::ExprEvaluator;
pub use filter::FilterExecutor;
pub use join::NestedLoopJoin;
pub use limit::LimitExecutor;
pub use operator::{drain, BoxedOperator, Operator, ValuesExecutor};
pub use project::ProjectExecutor;
pub use query::{PreparedQuery, QueryExecutor, QueryStream};
pub use result::{ResultColumn, ResultSet};
pub use runner::PhysicalPlanRunner;
pub use scan::TableScanExecutor;
pub use sort::SortExecutor;
