//! AST module for plan expressions.

mod expr;

pub use expr::{
    AggregateFunc, BinaryOp, ColumnRef, Expr, NamedExpr, ScalarFunc, SortOrder, Subquery, UnaryOp,
};
