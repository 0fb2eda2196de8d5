//! Logical query plan definitions.
//!
//! A `LogicalPlan` is the structured query descriptor handed to the engine.
//! Names in it are unresolved; `QueryPlanner` binds them against a catalog.

use crate::ast::{Expr, NamedExpr, SortOrder};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Join type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Rows where the condition is exactly true.
    #[default]
    Inner,
    /// Inner rows plus unmatched left rows padded with nulls.
    LeftOuter,
}

/// Logical query plan node.
#[derive(Clone, Debug)]
pub enum LogicalPlan {
    /// Relation scan, optionally under an alias.
    Scan {
        table: String,
        alias: Option<String>,
    },

    /// Filter (WHERE clause).
    Filter {
        input: Box<LogicalPlan>,
        predicate: Expr,
    },

    /// Projection (SELECT columns).
    Project {
        input: Box<LogicalPlan>,
        columns: Vec<NamedExpr>,
    },

    /// Join two inputs.
    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        condition: Expr,
        join_type: JoinType,
    },

    /// Grouping with aggregate outputs and an optional HAVING predicate.
    ///
    /// Output columns are the group keys followed by `aggregates`.
    Aggregate {
        input: Box<LogicalPlan>,
        group_by: Vec<NamedExpr>,
        aggregates: Vec<NamedExpr>,
        having: Option<Expr>,
    },

    /// Duplicate elimination.
    Distinct { input: Box<LogicalPlan> },

    /// Sort (ORDER BY).
    Sort {
        input: Box<LogicalPlan>,
        order_by: Vec<(Expr, SortOrder)>,
    },

    /// Limit and offset.
    Limit {
        input: Box<LogicalPlan>,
        limit: usize,
        offset: usize,
    },
}

impl LogicalPlan {
    /// Creates a relation scan plan.
    pub fn scan(table: impl Into<String>) -> Self {
        LogicalPlan::Scan {
            table: table.into(),
            alias: None,
        }
    }

    /// Creates a relation scan under an alias.
    pub fn scan_as(table: impl Into<String>, alias: impl Into<String>) -> Self {
        LogicalPlan::Scan {
            table: table.into(),
            alias: Some(alias.into()),
        }
    }

    /// Creates a filter plan.
    pub fn filter(input: LogicalPlan, predicate: Expr) -> Self {
        LogicalPlan::Filter {
            input: Box::new(input),
            predicate,
        }
    }

    /// Creates a projection plan.
    pub fn project(input: LogicalPlan, columns: Vec<NamedExpr>) -> Self {
        LogicalPlan::Project {
            input: Box::new(input),
            columns,
        }
    }

    /// Creates a join plan.
    pub fn join(
        left: LogicalPlan,
        right: LogicalPlan,
        condition: Expr,
        join_type: JoinType,
    ) -> Self {
        LogicalPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            condition,
            join_type,
        }
    }

    /// Creates an inner join plan.
    pub fn inner_join(left: LogicalPlan, right: LogicalPlan, condition: Expr) -> Self {
        Self::join(left, right, condition, JoinType::Inner)
    }

    /// Creates a left outer join plan.
    pub fn left_join(left: LogicalPlan, right: LogicalPlan, condition: Expr) -> Self {
        Self::join(left, right, condition, JoinType::LeftOuter)
    }

    /// Creates an aggregation plan.
    pub fn aggregate(
        input: LogicalPlan,
        group_by: Vec<NamedExpr>,
        aggregates: Vec<NamedExpr>,
    ) -> Self {
        LogicalPlan::Aggregate {
            input: Box::new(input),
            group_by,
            aggregates,
            having: None,
        }
    }

    /// Creates an aggregation plan with a HAVING predicate.
    pub fn aggregate_having(
        input: LogicalPlan,
        group_by: Vec<NamedExpr>,
        aggregates: Vec<NamedExpr>,
        having: Expr,
    ) -> Self {
        LogicalPlan::Aggregate {
            input: Box::new(input),
            group_by,
            aggregates,
            having: Some(having),
        }
    }

    /// Creates a duplicate-eliminating plan.
    pub fn distinct(input: LogicalPlan) -> Self {
        LogicalPlan::Distinct {
            input: Box::new(input),
        }
    }

    /// Creates a sort plan.
    pub fn sort(input: LogicalPlan, order_by: Vec<(Expr, SortOrder)>) -> Self {
        LogicalPlan::Sort {
            input: Box::new(input),
            order_by,
        }
    }

    /// Creates a limit plan.
    pub fn limit(input: LogicalPlan, limit: usize, offset: usize) -> Self {
        LogicalPlan::Limit {
            input: Box::new(input),
            limit,
            offset,
        }
    }

    /// Returns the input plan(s) of this node.
    pub fn inputs(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => alloc::vec![],
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Project { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::Distinct { input }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Limit { input, .. } => alloc::vec![input.as_ref()],
            LogicalPlan::Join { left, right, .. } => alloc::vec![left.as_ref(), right.as_ref()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_logical_plan_builders() {
        let scan = LogicalPlan::scan("participants");
        assert!(matches!(
            scan,
            LogicalPlan::Scan { ref table, alias: None } if table == "participants"
        ));

        let scan = LogicalPlan::scan_as("participants", "p1");
        assert!(matches!(scan, LogicalPlan::Scan { alias: Some(ref a), .. } if a == "p1"));

        let filter = LogicalPlan::filter(
            LogicalPlan::scan("participants"),
            Expr::eq(Expr::col("quiz_points"), Expr::literal(300i64)),
        );
        assert!(matches!(filter, LogicalPlan::Filter { .. }));

        let project = LogicalPlan::project(
            LogicalPlan::scan("participants"),
            vec![Expr::col("first_name").into()],
        );
        assert!(matches!(project, LogicalPlan::Project { .. }));
    }

    #[test]
    fn test_logical_plan_inputs() {
        let scan = LogicalPlan::scan("participants");
        assert!(scan.inputs().is_empty());

        let agg = LogicalPlan::aggregate_having(
            LogicalPlan::scan("participants"),
            vec![Expr::col("team").into()],
            vec![Expr::count_star().alias("n")],
            Expr::gt(Expr::count_star(), Expr::literal(1)),
        );
        assert_eq!(agg.inputs().len(), 1);

        let join = LogicalPlan::left_join(
            LogicalPlan::scan("regions"),
            LogicalPlan::scan("participants"),
            Expr::eq(
                Expr::column("regions", "state_abbrev"),
                Expr::column("participants", "state_code"),
            ),
        );
        assert_eq!(join.inputs().len(), 2);
        assert!(matches!(
            join,
            LogicalPlan::Join {
                join_type: JoinType::LeftOuter,
                ..
            }
        ));
    }
}
