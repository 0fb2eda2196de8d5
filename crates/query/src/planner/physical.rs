//! Bound (physical) plan definitions.
//!
//! The planner lowers a `LogicalPlan` into a `PhysicalPlan` whose
//! expressions address input columns by position. Every name in a physical
//! plan has already been resolved, so execution never fails on a lookup.

use crate::ast::{AggregateFunc, BinaryOp, ScalarFunc, SortOrder, UnaryOp};
use crate::planner::JoinType;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use roster_core::Value;

/// An expression with every column reference resolved to a slot.
#[derive(Clone, Debug)]
pub enum BoundExpr {
    /// Value at the given position of the input row.
    Column(usize),
    /// The i-th correlation value of the enclosing subquery.
    Param(usize),
    Literal(Value),
    Binary {
        left: Box<BoundExpr>,
        op: BinaryOp,
        right: Box<BoundExpr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<BoundExpr>,
    },
    Function {
        func: ScalarFunc,
        args: Vec<BoundExpr>,
    },
    Between {
        expr: Box<BoundExpr>,
        low: Box<BoundExpr>,
        high: Box<BoundExpr>,
        negated: bool,
    },
    InList {
        expr: Box<BoundExpr>,
        list: Vec<BoundExpr>,
        negated: bool,
    },
    InSubquery {
        exprs: Vec<BoundExpr>,
        subquery: BoundSubquery,
        negated: bool,
    },
    Like {
        expr: Box<BoundExpr>,
        pattern: Box<BoundExpr>,
        negated: bool,
    },
    Case {
        branches: Vec<(BoundExpr, BoundExpr)>,
        default: Option<Box<BoundExpr>>,
    },
    ScalarSubquery(BoundSubquery),
    Exists {
        subquery: BoundSubquery,
        negated: bool,
    },
}

impl BoundExpr {
    /// Creates a column slot reference.
    pub fn column(index: usize) -> Self {
        BoundExpr::Column(index)
    }

    /// Creates a literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        BoundExpr::Literal(value.into())
    }

    /// Creates a binary operation.
    pub fn binary(left: BoundExpr, op: BinaryOp, right: BoundExpr) -> Self {
        BoundExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary operation.
    pub fn unary(op: UnaryOp, expr: BoundExpr) -> Self {
        BoundExpr::Unary {
            op,
            expr: Box::new(expr),
        }
    }
}

/// A subquery ready for execution.
#[derive(Clone, Debug)]
pub struct BoundSubquery {
    /// Identifies this subquery within its query; part of the memo key.
    pub id: usize,
    /// The inner plan.
    pub plan: Box<PhysicalPlan>,
    /// Correlation expressions, evaluated against the outer row.
    pub outer: Vec<BoundExpr>,
    /// Number of output columns of `plan`.
    pub width: usize,
}

/// One accumulator of an aggregate node.
#[derive(Clone, Debug)]
pub struct AggregateSpec {
    pub func: AggregateFunc,
    /// The argument; `None` for COUNT(*).
    pub arg: Option<BoundExpr>,
    pub distinct: bool,
}

/// Physical query plan node.
#[derive(Clone, Debug)]
pub enum PhysicalPlan {
    /// Full scan of a catalog relation.
    TableScan { table: String },

    /// Filter rows whose predicate is exactly true.
    Filter {
        input: Box<PhysicalPlan>,
        predicate: BoundExpr,
    },

    /// Projection.
    Project {
        input: Box<PhysicalPlan>,
        columns: Vec<BoundExpr>,
    },

    /// Nested loop join. The condition sees the left row followed by the
    /// right row.
    NestedLoopJoin {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
        condition: BoundExpr,
        join_type: JoinType,
        /// Column count of the right input, used for null padding.
        right_width: usize,
    },

    /// Hash grouping.
    ///
    /// `group_by` and accumulator arguments are evaluated on input rows.
    /// `outputs` and `having` are evaluated on the group row: the key values
    /// followed by one finished value per accumulator. The emitted row is the
    /// key values followed by `outputs`.
    HashAggregate {
        input: Box<PhysicalPlan>,
        group_by: Vec<BoundExpr>,
        accumulators: Vec<AggregateSpec>,
        outputs: Vec<BoundExpr>,
        having: Option<BoundExpr>,
    },

    /// Duplicate elimination keeping first occurrences.
    Distinct { input: Box<PhysicalPlan> },

    /// Stable sort.
    Sort {
        input: Box<PhysicalPlan>,
        order_by: Vec<(BoundExpr, SortOrder)>,
    },

    /// Limit and offset.
    Limit {
        input: Box<PhysicalPlan>,
        limit: usize,
        offset: usize,
    },
}

impl PhysicalPlan {
    /// Creates a table scan plan.
    pub fn table_scan(table: impl Into<String>) -> Self {
        PhysicalPlan::TableScan {
            table: table.into(),
        }
    }

    /// Creates a filter plan.
    pub fn filter(input: PhysicalPlan, predicate: BoundExpr) -> Self {
        PhysicalPlan::Filter {
            input: Box::new(input),
            predicate,
        }
    }

    /// Creates a projection plan.
    pub fn project(input: PhysicalPlan, columns: Vec<BoundExpr>) -> Self {
        PhysicalPlan::Project {
            input: Box::new(input),
            columns,
        }
    }

    /// Creates a nested loop join plan.
    pub fn nested_loop_join(
        left: PhysicalPlan,
        right: PhysicalPlan,
        condition: BoundExpr,
        join_type: JoinType,
        right_width: usize,
    ) -> Self {
        PhysicalPlan::NestedLoopJoin {
            left: Box::new(left),
            right: Box::new(right),
            condition,
            join_type,
            right_width,
        }
    }

    /// Creates a sort plan.
    pub fn sort(input: PhysicalPlan, order_by: Vec<(BoundExpr, SortOrder)>) -> Self {
        PhysicalPlan::Sort {
            input: Box::new(input),
            order_by,
        }
    }

    /// Creates a limit plan.
    pub fn limit(input: PhysicalPlan, limit: usize, offset: usize) -> Self {
        PhysicalPlan::Limit {
            input: Box::new(input),
            limit,
            offset,
        }
    }

    /// Returns the input plan(s) of this node.
    pub fn inputs(&self) -> Vec<&PhysicalPlan> {
        match self {
            PhysicalPlan::TableScan { .. } => alloc::vec![],
            PhysicalPlan::Filter { input, .. }
            | PhysicalPlan::Project { input, .. }
            | PhysicalPlan::HashAggregate { input, .. }
            | PhysicalPlan::Distinct { input }
            | PhysicalPlan::Sort { input, .. }
            | PhysicalPlan::Limit { input, .. } => alloc::vec![input.as_ref()],
            PhysicalPlan::NestedLoopJoin { left, right, .. } => {
                alloc::vec![left.as_ref(), right.as_ref()]
            }
        }
    }

    /// Returns the operator name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalPlan::TableScan { .. } => "TableScan",
            PhysicalPlan::Filter { .. } => "Filter",
            PhysicalPlan::Project { .. } => "Project",
            PhysicalPlan::NestedLoopJoin { .. } => "NestedLoopJoin",
            PhysicalPlan::HashAggregate { .. } => "HashAggregate",
            PhysicalPlan::Distinct { .. } => "Distinct",
            PhysicalPlan::Sort { .. } => "Sort",
            PhysicalPlan::Limit { .. } => "Limit",
        }
    }
}
