//! Expression AST definitions.

use crate::planner::LogicalPlan;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use roster_core::Value;

/// Reference to a column, optionally qualified by a relation name or alias.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Relation name or alias.
    pub qualifier: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a qualified column reference.
    pub fn new(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            column: column.into(),
        }
    }

    /// Creates an unqualified column reference.
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
        }
    }

    /// Returns the normalized name (qualifier.column, or column).
    pub fn normalized_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.column),
            None => self.column.clone(),
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // String
    Concat,
}

impl BinaryOp {
    /// Returns true for `= != < <= > >=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Returns true for `+ - * / %`.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// Returns the operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "||",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    IsNull,
    IsNotNull,
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    /// Returns the lowercase function name.
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }
}

/// Scalar (row-level) functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarFunc {
    /// Concatenates the text form of every argument.
    Concat,
    /// Character count of a text value.
    Length,
    /// 1-based substring: `SUBSTR(text, start[, length])`.
    Substr,
    Upper,
    Lower,
    Trim,
    /// First non-null argument.
    Coalesce,
    /// `ROUND(x[, digits])`.
    Round,
    Abs,
    /// Adds a signed number of days to a date.
    DateAdd,
    /// Days from the second date to the first.
    DateDiff,
    Year,
    Month,
    Day,
}

impl ScalarFunc {
    /// Returns the accepted argument count range (inclusive).
    pub fn arity(&self) -> (usize, usize) {
        match self {
            ScalarFunc::Concat | ScalarFunc::Coalesce => (1, usize::MAX),
            ScalarFunc::Substr => (2, 3),
            ScalarFunc::Round => (1, 2),
            ScalarFunc::DateAdd | ScalarFunc::DateDiff => (2, 2),
            ScalarFunc::Length
            | ScalarFunc::Upper
            | ScalarFunc::Lower
            | ScalarFunc::Trim
            | ScalarFunc::Abs
            | ScalarFunc::Year
            | ScalarFunc::Month
            | ScalarFunc::Day => (1, 1),
        }
    }

    /// Returns the uppercase function name.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarFunc::Concat => "CONCAT",
            ScalarFunc::Length => "LENGTH",
            ScalarFunc::Substr => "SUBSTR",
            ScalarFunc::Upper => "UPPER",
            ScalarFunc::Lower => "LOWER",
            ScalarFunc::Trim => "TRIM",
            ScalarFunc::Coalesce => "COALESCE",
            ScalarFunc::Round => "ROUND",
            ScalarFunc::Abs => "ABS",
            ScalarFunc::DateAdd => "DATE_ADD",
            ScalarFunc::DateDiff => "DATE_DIFF",
            ScalarFunc::Year => "YEAR",
            ScalarFunc::Month => "MONTH",
            ScalarFunc::Day => "DAY",
        }
    }
}

/// Sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A nested query used as an expression operand.
///
/// Correlated subqueries list the outer expressions they depend on in
/// `outer`; inside `plan` the i-th entry is read with `Expr::Outer(i)`.
#[derive(Clone, Debug)]
pub struct Subquery {
    /// The inner plan.
    pub plan: Box<LogicalPlan>,
    /// Outer expressions, evaluated against the enclosing row.
    pub outer: Vec<Expr>,
}

impl Subquery {
    /// Creates an uncorrelated subquery.
    pub fn new(plan: LogicalPlan) -> Self {
        Self {
            plan: Box::new(plan),
            outer: Vec::new(),
        }
    }

    /// Creates a correlated subquery over the given outer expressions.
    pub fn correlated(plan: LogicalPlan, outer: Vec<Expr>) -> Self {
        Self {
            plan: Box::new(plan),
            outer,
        }
    }

    /// Returns true if the subquery depends on the enclosing row.
    pub fn is_correlated(&self) -> bool {
        !self.outer.is_empty()
    }
}

/// Expression AST node.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Column reference.
    Column(ColumnRef),
    /// The i-th outer value of the enclosing correlated subquery.
    Outer(usize),
    /// Literal value.
    Literal(Value),
    /// Binary operation.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// Scalar function call.
    Function { func: ScalarFunc, args: Vec<Expr> },
    /// Aggregate function.
    Aggregate {
        func: AggregateFunc,
        expr: Option<Box<Expr>>,
        distinct: bool,
    },
    /// `[NOT] BETWEEN low AND high`, inclusive.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    /// `[NOT] IN (list)`.
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `(exprs) [NOT] IN (subquery)`; the subquery yields one column per probe.
    InSubquery {
        exprs: Vec<Expr>,
        subquery: Box<Subquery>,
        negated: bool,
    },
    /// `[NOT] LIKE pattern`.
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
    /// Searched CASE.
    Case {
        branches: Vec<(Expr, Expr)>,
        default: Option<Box<Expr>>,
    },
    /// Single-column subquery producing at most one row.
    ScalarSubquery(Box<Subquery>),
    /// `[NOT] EXISTS (subquery)`.
    Exists {
        subquery: Box<Subquery>,
        negated: bool,
    },
}

impl Expr {
    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }

    fn aggregate(func: AggregateFunc, expr: Option<Expr>, distinct: bool) -> Self {
        Expr::Aggregate {
            func,
            expr: expr.map(Box::new),
            distinct,
        }
    }

    /// Creates a qualified column reference expression.
    pub fn column(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(qualifier, column))
    }

    /// Creates an unqualified column reference expression.
    pub fn col(column: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::bare(column))
    }

    /// Reads the i-th outer value inside a correlated subquery.
    pub fn outer(index: usize) -> Self {
        Expr::Outer(index)
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Creates a null literal.
    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    /// Creates an equality expression.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Eq, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ne, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Le, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ge, right)
    }

    /// Creates an AND expression.
    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::And, right)
    }

    /// Creates an OR expression.
    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Or, right)
    }

    /// Creates a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Self::unary(UnaryOp::Not, expr)
    }

    /// Creates a unary minus expression.
    pub fn neg(expr: Expr) -> Self {
        Self::unary(UnaryOp::Neg, expr)
    }

    /// Creates an IS NULL expression.
    pub fn is_null(expr: Expr) -> Self {
        Self::unary(UnaryOp::IsNull, expr)
    }

    /// Creates an IS NOT NULL expression.
    pub fn is_not_null(expr: Expr) -> Self {
        Self::unary(UnaryOp::IsNotNull, expr)
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Add, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Sub, right)
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Mul, right)
    }

    pub fn div(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Div, right)
    }

    pub fn modulo(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Mod, right)
    }

    /// Creates a `left || right` string concatenation.
    pub fn concat(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Concat, right)
    }

    /// Creates a COUNT(*) aggregate.
    pub fn count_star() -> Self {
        Self::aggregate(AggregateFunc::Count, None, false)
    }

    /// Creates a COUNT(expr) aggregate.
    pub fn count(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Count, Some(expr), false)
    }

    /// Creates a COUNT(DISTINCT expr) aggregate.
    pub fn count_distinct(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Count, Some(expr), true)
    }

    /// Creates a SUM aggregate.
    pub fn sum(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Sum, Some(expr), false)
    }

    /// Creates an AVG aggregate.
    pub fn avg(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Avg, Some(expr), false)
    }

    /// Creates a MIN aggregate.
    pub fn min(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Min, Some(expr), false)
    }

    /// Creates a MAX aggregate.
    pub fn max(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Max, Some(expr), false)
    }

    /// Creates an aggregate over the distinct non-null values of `expr`.
    pub fn distinct_aggregate(func: AggregateFunc, expr: Expr) -> Self {
        Self::aggregate(func, Some(expr), true)
    }

    /// Creates a BETWEEN expression.
    pub fn between(expr: Expr, low: Expr, high: Expr) -> Self {
        Expr::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    /// Creates a NOT BETWEEN expression.
    pub fn not_between(expr: Expr, low: Expr, high: Expr) -> Self {
        Expr::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated: true,
        }
    }

    /// Creates an IN expression over literal values.
    pub fn in_list(expr: Expr, values: Vec<Value>) -> Self {
        Expr::In {
            expr: Box::new(expr),
            list: values.into_iter().map(Expr::Literal).collect(),
            negated: false,
        }
    }

    /// Creates a NOT IN expression over literal values.
    pub fn not_in_list(expr: Expr, values: Vec<Value>) -> Self {
        Expr::In {
            expr: Box::new(expr),
            list: values.into_iter().map(Expr::Literal).collect(),
            negated: true,
        }
    }

    /// Creates an IN expression over a subquery result.
    pub fn in_subquery(expr: Expr, subquery: Subquery) -> Self {
        Expr::InSubquery {
            exprs: alloc::vec![expr],
            subquery: Box::new(subquery),
            negated: false,
        }
    }

    /// Creates a NOT IN expression over a subquery result.
    pub fn not_in_subquery(expr: Expr, subquery: Subquery) -> Self {
        Expr::InSubquery {
            exprs: alloc::vec![expr],
            subquery: Box::new(subquery),
            negated: true,
        }
    }

    /// Creates a LIKE expression.
    pub fn like(expr: Expr, pattern: &str) -> Self {
        Expr::Like {
            expr: Box::new(expr),
            pattern: Box::new(Expr::literal(pattern)),
            negated: false,
        }
    }

    /// Creates a NOT LIKE expression.
    pub fn not_like(expr: Expr, pattern: &str) -> Self {
        Expr::Like {
            expr: Box::new(expr),
            pattern: Box::new(Expr::literal(pattern)),
            negated: true,
        }
    }

    /// Creates a searched CASE expression.
    pub fn case(branches: Vec<(Expr, Expr)>, default: Option<Expr>) -> Self {
        Expr::Case {
            branches,
            default: default.map(Box::new),
        }
    }

    /// Creates a scalar function call.
    pub fn function(func: ScalarFunc, args: Vec<Expr>) -> Self {
        Expr::Function { func, args }
    }

    /// Creates a scalar subquery expression.
    pub fn scalar_subquery(subquery: Subquery) -> Self {
        Expr::ScalarSubquery(Box::new(subquery))
    }

    /// Creates an EXISTS expression.
    pub fn exists(subquery: Subquery) -> Self {
        Expr::Exists {
            subquery: Box::new(subquery),
            negated: false,
        }
    }

    /// Creates a NOT EXISTS expression.
    pub fn not_exists(subquery: Subquery) -> Self {
        Expr::Exists {
            subquery: Box::new(subquery),
            negated: true,
        }
    }

    /// Names this expression for use in a projection or aggregate list.
    pub fn alias(self, name: impl Into<String>) -> NamedExpr {
        NamedExpr {
            expr: self,
            alias: Some(name.into()),
        }
    }

    /// Returns true if this expression contains an aggregate call outside of
    /// any nested subquery.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Column(_) | Expr::Outer(_) | Expr::Literal(_) => false,
            Expr::ScalarSubquery(_) | Expr::Exists { .. } => false,
            Expr::BinaryOp { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expr::UnaryOp { expr, .. } => expr.contains_aggregate(),
            Expr::Function { args, .. } => args.iter().any(Expr::contains_aggregate),
            Expr::Between { expr, low, high, .. } => {
                expr.contains_aggregate() || low.contains_aggregate() || high.contains_aggregate()
            }
            Expr::In { expr, list, .. } => {
                expr.contains_aggregate() || list.iter().any(Expr::contains_aggregate)
            }
            Expr::InSubquery { exprs, .. } => exprs.iter().any(Expr::contains_aggregate),
            Expr::Like { expr, pattern, .. } => {
                expr.contains_aggregate() || pattern.contains_aggregate()
            }
            Expr::Case { branches, default } => {
                branches
                    .iter()
                    .any(|(c, r)| c.contains_aggregate() || r.contains_aggregate())
                    || default.as_ref().map_or(false, |d| d.contains_aggregate())
            }
        }
    }

    /// Returns the output name used when no alias is given.
    ///
    /// Plain columns keep their column name and aggregates over a column read
    /// like `max(age)`; anything else is named after its position.
    pub fn default_name(&self, position: usize) -> String {
        match self {
            Expr::Column(c) => c.column.clone(),
            Expr::Aggregate { func, expr, distinct } => match expr.as_deref() {
                None => format!("{}(*)", func.name()),
                Some(Expr::Column(c)) if *distinct => {
                    format!("{}(distinct {})", func.name(), c.column)
                }
                Some(Expr::Column(c)) => format!("{}({})", func.name(), c.column),
                Some(_) => format!("{}_{}", func.name(), position),
            },
            _ => format!("column_{}", position),
        }
    }
}

/// An expression with an optional output name.
#[derive(Clone, Debug)]
pub struct NamedExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl NamedExpr {
    /// Returns the output name at the given position.
    pub fn output_name(&self, position: usize) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expr.default_name(position),
        }
    }
}

impl From<Expr> for NamedExpr {
    fn from(expr: Expr) -> Self {
        NamedExpr { expr, alias: None }
    }
}
