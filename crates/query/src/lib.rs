//! Roster Query - planner and executor for the Roster query engine.
//!
//! This crate provides:
//!
//! - `ast`: Expression and subquery AST definitions
//! - `planner`: Logical plans, the binder and bound physical plans
//! - `executor`: Pull-based operators (scan, filter, join, aggregate, sort,
//!   limit, project, distinct), the expression evaluator and the query
//!   executor
//! - `context`: Execution configuration and per-query state

#![no_std]

extern crate alloc;

pub mod ast;
pub mod context;
pub mod executor;
pub mod planner;

pub use context::{ExecutionConfig, ExecutionContext, ExecutionStats};
pub use executor::{
    ErrorKind, ExecutionError, ExecutionResult, PreparedQuery, QueryExecutor, QueryStream,
    ResultColumn, ResultSet,
};
pub use planner::{JoinType, LogicalPlan};
