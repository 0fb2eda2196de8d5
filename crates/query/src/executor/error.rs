//! Errors raised while binding or executing a plan.

use alloc::string::{String, ToString};
use core::fmt;

/// Result type for plan binding and execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Broad classification of an `ExecutionError`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised by the planner before any row is pulled.
    Binding,
    /// Incompatible operand types.
    Type,
    DivisionByZero,
    /// A scalar subquery produced more than one row.
    Cardinality,
    Overflow,
    /// A function argument outside its accepted range.
    InvalidArgument,
}

/// Plan binding and evaluation errors.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionError {
    /// Relation not found in the catalog.
    RelationNotFound(String),
    /// Column not found in scope.
    ColumnNotFound { qualifier: Option<String>, column: String },
    /// A qualifier names no relation in scope.
    AliasNotFound(String),
    /// An unqualified column matches more than one input column.
    AmbiguousColumn(String),
    /// The same alias or output name is declared twice.
    DuplicateAlias(String),
    /// An aggregate used outside an aggregate list or HAVING, or nested
    /// inside another aggregate.
    MisplacedAggregate(String),
    /// A column used after grouping that is neither a group key nor inside
    /// an aggregate.
    NotGrouped(String),
    /// A subquery returns the wrong number of columns for its position.
    SubqueryColumns { expected: usize, got: usize },
    /// `Expr::Outer` index outside the subquery's declared outer list.
    UnboundOuterReference(usize),
    /// Any other malformed plan.
    InvalidPlan(String),
    /// Type mismatch during evaluation.
    TypeMismatch(String),
    DivisionByZero,
    NumericOverflow,
    /// A scalar subquery returned more than one row.
    SubqueryCardinality { rows: usize },
    /// A function argument outside its accepted range.
    InvalidArgument(String),
}

impl ExecutionError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::RelationNotFound(_)
            | ExecutionError::ColumnNotFound { .. }
            | ExecutionError::AliasNotFound(_)
            | ExecutionError::AmbiguousColumn(_)
            | ExecutionError::DuplicateAlias(_)
            | ExecutionError::MisplacedAggregate(_)
            | ExecutionError::NotGrouped(_)
            | ExecutionError::SubqueryColumns { .. }
            | ExecutionError::UnboundOuterReference(_)
            | ExecutionError::InvalidPlan(_) => ErrorKind::Binding,
            ExecutionError::TypeMismatch(_) => ErrorKind::Type,
            ExecutionError::DivisionByZero => ErrorKind::DivisionByZero,
            ExecutionError::NumericOverflow => ErrorKind::Overflow,
            ExecutionError::SubqueryCardinality { .. } => ErrorKind::Cardinality,
            ExecutionError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        ExecutionError::TypeMismatch(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ExecutionError::InvalidArgument(message.into())
    }

    pub fn invalid_plan(message: impl Into<String>) -> Self {
        ExecutionError::InvalidPlan(message.into())
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::RelationNotFound(t) => write!(f, "Relation not found: {}", t),
            ExecutionError::ColumnNotFound {
                qualifier: Some(q),
                column,
            } => write!(f, "Column {}.{} not found", q, column),
            ExecutionError::ColumnNotFound {
                qualifier: None,
                column,
            } => write!(f, "Column {} not found", column),
            ExecutionError::AliasNotFound(a) => write!(f, "Relation alias not found: {}", a),
            ExecutionError::AmbiguousColumn(c) => write!(f, "Column reference {} is ambiguous", c),
            ExecutionError::DuplicateAlias(a) => write!(f, "Duplicate alias: {}", a),
            ExecutionError::MisplacedAggregate(msg) => write!(f, "Misplaced aggregate: {}", msg),
            ExecutionError::NotGrouped(c) => write!(
                f,
                "Column {} must appear in the group keys or inside an aggregate",
                c
            ),
            ExecutionError::SubqueryColumns { expected, got } => write!(
                f,
                "Subquery returns {} columns, expected {}",
                got, expected
            ),
            ExecutionError::UnboundOuterReference(i) => {
                write!(f, "Outer reference {} is not declared by the subquery", i)
            }
            ExecutionError::InvalidPlan(msg) => write!(f, "Invalid plan: {}", msg),
            ExecutionError::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            ExecutionError::DivisionByZero => f.write_str("Division by zero"),
            ExecutionError::NumericOverflow => f.write_str("Numeric overflow"),
            ExecutionError::SubqueryCardinality { rows } => write!(
                f,
                "Scalar subquery returned {} rows, expected at most one",
                rows
            ),
            ExecutionError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl From<roster_core::Error> for ExecutionError {
    fn from(err: roster_core::Error) -> Self {
        use roster_core::Error;
        match err {
            Error::TableNotFound { name } => ExecutionError::RelationNotFound(name),
            Error::ColumnNotFound { table, column } => ExecutionError::ColumnNotFound {
                qualifier: Some(table),
                column,
            },
            other @ (Error::IncompatibleTypes { .. } | Error::TypeMismatch { .. }) => {
                ExecutionError::TypeMismatch(other.to_string())
            }
            other => ExecutionError::InvalidArgument(other.to_string()),
        }
    }
}
