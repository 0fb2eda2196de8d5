//! Query planner module.
//!
//! A [`LogicalPlan`] names relations and columns; [`QueryPlanner`] binds it
//! against a catalog into a [`PhysicalPlan`] whose expressions address row
//! slots by position.

mod logical;
pub mod physical;
mod query_planner;
mod scope;

pub use logical::{JoinType, LogicalPlan};
pub use physical::{AggregateSpec, BoundExpr, BoundSubquery, PhysicalPlan};
pub use query_planner::{BoundQuery, QueryPlanner};
pub use scope::{Scope, ScopeColumn};
