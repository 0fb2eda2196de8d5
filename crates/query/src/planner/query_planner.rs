//! Query planner: binds a logical plan against a catalog.
//!
//! Binding resolves every relation, alias and column name, checks aggregate
//! placement and subquery shapes, and lowers expressions to slot-addressed
//! `BoundExpr`s. All of this happens before a single row is read, so a plan
//! that binds successfully can only fail at run time on data-dependent
//! conditions (type errors, division by zero, subquery cardinality).
//!
//! ## Aggregates
//!
//! An `Aggregate` node is lowered in two layers. Group keys and aggregate
//! arguments are bound against the input scope. Every aggregate call found in
//! the output list or HAVING becomes an accumulator; the surrounding
//! expression is then bound against the *group row*, which holds the key
//! values followed by the finished accumulators. Columns referenced outside
//! an aggregate call must therefore match a group key.

use crate::ast::{AggregateFunc, BinaryOp, ColumnRef, Expr, NamedExpr, ScalarFunc, Subquery, UnaryOp};
use crate::executor::{ExecutionError, ExecutionResult, ResultColumn};
use crate::planner::physical::{AggregateSpec, BoundExpr, BoundSubquery};
use crate::planner::scope::{Scope, ScopeColumn};
use crate::planner::{LogicalPlan, PhysicalPlan};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use roster_core::{Catalog, DataType};

/// A bound plan together with its output schema.
#[derive(Clone, Debug)]
pub struct BoundQuery {
    pub plan: PhysicalPlan,
    pub columns: Vec<ResultColumn>,
}

/// Binds logical plans against a catalog.
pub struct QueryPlanner<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryPlanner<'a> {
    /// Creates a planner for the given catalog.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Binds a logical plan, producing an executable physical plan.
    pub fn plan(&self, plan: &LogicalPlan) -> ExecutionResult<BoundQuery> {
        let mut binder = Binder {
            catalog: self.catalog,
            next_subquery_id: 0,
            params: Vec::new(),
        };
        let (plan, scope) = binder.bind_plan(plan)?;
        let columns = scope
            .columns()
            .iter()
            .map(|c| {
                let column = ResultColumn::new(c.name.clone(), c.data_type);
                match &c.qualifier {
                    Some(q) => column.with_qualifier(q.clone()),
                    None => column,
                }
            })
            .collect();
        Ok(BoundQuery { plan, columns })
    }
}

/// A bound expression and its inferred type.
struct Typed {
    expr: BoundExpr,
    data_type: Option<DataType>,
}

impl Typed {
    fn new(expr: BoundExpr, data_type: Option<DataType>) -> Self {
        Self { expr, data_type }
    }
}

/// State for binding expressions that run after grouping.
struct Grouping<'s> {
    /// Scope of the aggregate's input rows.
    input: &'s Scope,
    /// Group keys bound against `input`.
    keys: &'s [BoundExpr],
    /// Named view of the key columns of the group row.
    key_scope: &'s Scope,
    accumulators: Vec<AggregateSpec>,
    accumulator_types: Vec<Option<DataType>>,
    /// Already bound outputs, addressable by name from HAVING.
    outputs: &'s [(String, Typed)],
}

impl Grouping<'_> {
    fn resolve(&self, col: &ColumnRef) -> ExecutionResult<Typed> {
        if let Ok(k) = self.key_scope.resolve(col) {
            let data_type = self.key_scope.get(k).and_then(|c| c.data_type);
            return Ok(Typed::new(BoundExpr::Column(k), data_type));
        }

        let input_err = match self.input.resolve(col) {
            Ok(j) => {
                let key = self
                    .keys
                    .iter()
                    .position(|k| matches!(k, BoundExpr::Column(i) if *i == j));
                return match key {
                    Some(k) => Ok(Typed::new(
                        BoundExpr::Column(k),
                        self.input.get(j).and_then(|c| c.data_type),
                    )),
                    // An output alias may shadow an ungrouped input column.
                    None => self
                        .output(col)
                        .ok_or_else(|| ExecutionError::NotGrouped(col.normalized_name())),
                };
            }
            Err(e) => e,
        };

        self.output(col).ok_or(input_err)
    }

    /// Looks up an already bound output by bare name.
    fn output(&self, col: &ColumnRef) -> Option<Typed> {
        if col.qualifier.is_some() {
            return None;
        }
        self.outputs
            .iter()
            .find(|(name, _)| *name == col.column)
            .map(|(_, out)| Typed::new(out.expr.clone(), out.data_type))
    }

    fn add_accumulator(&mut self, spec: AggregateSpec, data_type: Option<DataType>) -> Typed {
        let slot = self.keys.len() + self.accumulators.len();
        self.accumulators.push(spec);
        self.accumulator_types.push(data_type);
        Typed::new(BoundExpr::Column(slot), data_type)
    }
}

/// Where an expression is being bound.
enum Context<'c, 's> {
    /// Plain row expression over one scope; aggregates are not allowed.
    Row(&'c Scope),
    /// Aggregate output or HAVING expression.
    Grouped(&'c mut Grouping<'s>),
}

struct Binder<'a> {
    catalog: &'a Catalog,
    next_subquery_id: usize,
    /// Types of the correlation values of the subquery being bound.
    params: Vec<Option<DataType>>,
}

impl Binder<'_> {
    fn bind_plan(&mut self, plan: &LogicalPlan) -> ExecutionResult<(PhysicalPlan, Scope)> {
        match plan {
            LogicalPlan::Scan { table, alias } => {
                let relation = self
                    .catalog
                    .get(table)
                    .ok_or_else(|| ExecutionError::RelationNotFound(table.clone()))?;
                let qualifier = alias.as_deref().unwrap_or(table);
                let scope = Scope::from_table(relation.schema(), qualifier);
                Ok((PhysicalPlan::table_scan(table.clone()), scope))
            }

            LogicalPlan::Filter { input, predicate } => {
                let (input, scope) = self.bind_plan(input)?;
                let predicate = self.bind_row_expr(predicate, &scope, "filter predicate")?;
                Ok((PhysicalPlan::filter(input, predicate.expr), scope))
            }

            LogicalPlan::Join {
                left,
                right,
                condition,
                join_type,
            } => {
                let (left, left_scope) = self.bind_plan(left)?;
                let (right, right_scope) = self.bind_plan(right)?;
                let right_width = right_scope.len();
                let scope = Scope::join(left_scope, right_scope)?;
                let condition = self.bind_row_expr(condition, &scope, "join condition")?;
                Ok((
                    PhysicalPlan::nested_loop_join(
                        left,
                        right,
                        condition.expr,
                        *join_type,
                        right_width,
                    ),
                    scope,
                ))
            }

            LogicalPlan::Project { input, columns } => {
                let (input, scope) = self.bind_plan(input)?;
                let mut bound = Vec::with_capacity(columns.len());
                let mut out = Vec::with_capacity(columns.len());
                for (i, column) in columns.iter().enumerate() {
                    let typed = self.bind_row_expr(&column.expr, &scope, "projection")?;
                    let qualifier = passthrough_qualifier(column, &typed, &scope);
                    out.push(ScopeColumn::new(qualifier, column.output_name(i), typed.data_type));
                    bound.push(typed.expr);
                }
                check_distinct_names(&out)?;
                Ok((PhysicalPlan::project(input, bound), Scope::new(out)))
            }

            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
                having,
            } => self.bind_aggregate(input, group_by, aggregates, having.as_ref()),

            LogicalPlan::Distinct { input } => {
                let (input, scope) = self.bind_plan(input)?;
                Ok((
                    PhysicalPlan::Distinct {
                        input: Box::new(input),
                    },
                    scope,
                ))
            }

            LogicalPlan::Sort { input, order_by } => {
                let (input, scope) = self.bind_plan(input)?;
                let mut keys = Vec::with_capacity(order_by.len());
                for (expr, order) in order_by {
                    let typed = self.bind_row_expr(expr, &scope, "sort key")?;
                    keys.push((typed.expr, *order));
                }
                Ok((PhysicalPlan::sort(input, keys), scope))
            }

            LogicalPlan::Limit {
                input,
                limit,
                offset,
            } => {
                let (input, scope) = self.bind_plan(input)?;
                Ok((PhysicalPlan::limit(input, *limit, *offset), scope))
            }
        }
    }

    fn bind_aggregate(
        &mut self,
        input: &LogicalPlan,
        group_by: &[NamedExpr],
        aggregates: &[NamedExpr],
        having: Option<&Expr>,
    ) -> ExecutionResult<(PhysicalPlan, Scope)> {
        let (input, input_scope) = self.bind_plan(input)?;

        let mut keys = Vec::with_capacity(group_by.len());
        let mut key_columns = Vec::with_capacity(group_by.len());
        for (i, key) in group_by.iter().enumerate() {
            let typed = self.bind_row_expr(&key.expr, &input_scope, "group key")?;
            let qualifier = passthrough_qualifier(key, &typed, &input_scope);
            key_columns.push(ScopeColumn::new(qualifier, key.output_name(i), typed.data_type));
            keys.push(typed.expr);
        }
        let key_scope = Scope::new(key_columns);

        let mut outputs: Vec<(String, Typed)> = Vec::with_capacity(aggregates.len());
        let mut grouping = Grouping {
            input: &input_scope,
            keys: &keys,
            key_scope: &key_scope,
            accumulators: Vec::new(),
            accumulator_types: Vec::new(),
            outputs: &[],
        };
        for (i, agg) in aggregates.iter().enumerate() {
            let typed = self.bind_expr(&agg.expr, &mut Context::Grouped(&mut grouping))?;
            outputs.push((agg.output_name(group_by.len() + i), typed));
        }

        let having = match having {
            Some(predicate) => {
                grouping.outputs = &outputs;
                let typed = self.bind_expr(predicate, &mut Context::Grouped(&mut grouping))?;
                Some(typed.expr)
            }
            None => None,
        };
        let accumulators = grouping.accumulators;

        let mut columns: Vec<ScopeColumn> = key_scope.columns().to_vec();
        columns.extend(
            outputs
                .iter()
                .map(|(name, typed)| ScopeColumn::new(None, name.clone(), typed.data_type)),
        );
        check_distinct_names(&columns)?;

        let plan = PhysicalPlan::HashAggregate {
            input: Box::new(input),
            group_by: keys,
            accumulators,
            outputs: outputs.into_iter().map(|(_, typed)| typed.expr).collect(),
            having,
        };
        Ok((plan, Scope::new(columns)))
    }

    fn bind_row_expr(&mut self, expr: &Expr, scope: &Scope, position: &str) -> ExecutionResult<Typed> {
        if expr.contains_aggregate() {
            return Err(ExecutionError::MisplacedAggregate(format!(
                "aggregate functions are not allowed in a {}",
                position
            )));
        }
        self.bind_expr(expr, &mut Context::Row(scope))
    }

    fn bind_subquery(
        &mut self,
        subquery: &Subquery,
        ctx: &mut Context<'_, '_>,
    ) -> ExecutionResult<(BoundSubquery, Scope)> {
        let mut outer = Vec::with_capacity(subquery.outer.len());
        let mut outer_types = Vec::with_capacity(subquery.outer.len());
        for expr in &subquery.outer {
            let typed = self.bind_expr(expr, ctx)?;
            outer_types.push(typed.data_type);
            outer.push(typed.expr);
        }

        let id = self.next_subquery_id;
        self.next_subquery_id += 1;

        let saved = core::mem::replace(&mut self.params, outer_types);
        let bound = self.bind_plan(&subquery.plan);
        self.params = saved;
        let (plan, scope) = bound?;

        Ok((
            BoundSubquery {
                id,
                plan: Box::new(plan),
                outer,
                width: scope.len(),
            },
            scope,
        ))
    }

    fn bind_exprs(&mut self, exprs: &[Expr], ctx: &mut Context<'_, '_>) -> ExecutionResult<Vec<Typed>> {
        exprs.iter().map(|e| self.bind_expr(e, ctx)).collect()
    }

    fn bind_expr(&mut self, expr: &Expr, ctx: &mut Context<'_, '_>) -> ExecutionResult<Typed> {
        match expr {
            Expr::Column(col) => match ctx {
                Context::Row(scope) => {
                    let i = scope.resolve(col)?;
                    Ok(Typed::new(BoundExpr::Column(i), scope.get(i).and_then(|c| c.data_type)))
                }
                Context::Grouped(grouping) => grouping.resolve(col),
            },

            Expr::Outer(i) => match self.params.get(*i) {
                Some(data_type) => Ok(Typed::new(BoundExpr::Param(*i), *data_type)),
                None => Err(ExecutionError::UnboundOuterReference(*i)),
            },

            Expr::Literal(value) => Ok(Typed::new(BoundExpr::Literal(value.clone()), value.data_type())),

            Expr::BinaryOp { left, op, right } => {
                let left = self.bind_expr(left, ctx)?;
                let right = self.bind_expr(right, ctx)?;
                let data_type = binary_type(*op, left.data_type, right.data_type);
                Ok(Typed::new(BoundExpr::binary(left.expr, *op, right.expr), data_type))
            }

            Expr::UnaryOp { op, expr } => {
                let inner = self.bind_expr(expr, ctx)?;
                let data_type = match op {
                    UnaryOp::Neg => inner.data_type,
                    UnaryOp::Not | UnaryOp::IsNull | UnaryOp::IsNotNull => Some(DataType::Boolean),
                };
                Ok(Typed::new(BoundExpr::unary(*op, inner.expr), data_type))
            }

            Expr::Function { func, args } => {
                let (min, max) = func.arity();
                if args.len() < min || args.len() > max {
                    return Err(ExecutionError::invalid_plan(format!(
                        "{} takes {} arguments, got {}",
                        func.name(),
                        arity_text(min, max),
                        args.len()
                    )));
                }
                let args = self.bind_exprs(args, ctx)?;
                let data_type = function_type(*func, &args);
                Ok(Typed::new(
                    BoundExpr::Function {
                        func: *func,
                        args: args.into_iter().map(|a| a.expr).collect(),
                    },
                    data_type,
                ))
            }

            Expr::Aggregate {
                func,
                expr: arg,
                distinct,
            } => {
                let grouping = match ctx {
                    Context::Grouped(grouping) => grouping,
                    Context::Row(_) => {
                        return Err(ExecutionError::MisplacedAggregate(format!(
                            "{} outside an aggregate list",
                            func.name()
                        )))
                    }
                };
                let arg = match arg {
                    Some(arg) if arg.contains_aggregate() => {
                        return Err(ExecutionError::MisplacedAggregate(format!(
                            "{} nested inside another aggregate",
                            func.name()
                        )))
                    }
                    Some(arg) => Some(self.bind_expr(arg, &mut Context::Row(grouping.input))?),
                    None if *func != AggregateFunc::Count => {
                        return Err(ExecutionError::invalid_plan(format!(
                            "{} requires an argument",
                            func.name()
                        )))
                    }
                    None => None,
                };
                let data_type = aggregate_type(*func, arg.as_ref().and_then(|a| a.data_type));
                let spec = AggregateSpec {
                    func: *func,
                    arg: arg.map(|a| a.expr),
                    distinct: *distinct,
                };
                Ok(grouping.add_accumulator(spec, data_type))
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let expr = self.bind_expr(expr, ctx)?;
                let low = self.bind_expr(low, ctx)?;
                let high = self.bind_expr(high, ctx)?;
                Ok(Typed::new(
                    BoundExpr::Between {
                        expr: Box::new(expr.expr),
                        low: Box::new(low.expr),
                        high: Box::new(high.expr),
                        negated: *negated,
                    },
                    Some(DataType::Boolean),
                ))
            }

            Expr::In {
                expr,
                list,
                negated,
            } => {
                let expr = self.bind_expr(expr, ctx)?;
                let list = self.bind_exprs(list, ctx)?;
                Ok(Typed::new(
                    BoundExpr::InList {
                        expr: Box::new(expr.expr),
                        list: list.into_iter().map(|t| t.expr).collect(),
                        negated: *negated,
                    },
                    Some(DataType::Boolean),
                ))
            }

            Expr::InSubquery {
                exprs,
                subquery,
                negated,
            } => {
                let exprs = self.bind_exprs(exprs, ctx)?;
                let (subquery, _) = self.bind_subquery(subquery, ctx)?;
                if subquery.width != exprs.len() {
                    return Err(ExecutionError::SubqueryColumns {
                        expected: exprs.len(),
                        got: subquery.width,
                    });
                }
                Ok(Typed::new(
                    BoundExpr::InSubquery {
                        exprs: exprs.into_iter().map(|t| t.expr).collect(),
                        subquery,
                        negated: *negated,
                    },
                    Some(DataType::Boolean),
                ))
            }

            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                let expr = self.bind_expr(expr, ctx)?;
                let pattern = self.bind_expr(pattern, ctx)?;
                Ok(Typed::new(
                    BoundExpr::Like {
                        expr: Box::new(expr.expr),
                        pattern: Box::new(pattern.expr),
                        negated: *negated,
                    },
                    Some(DataType::Boolean),
                ))
            }

            Expr::Case { branches, default } => {
                let mut bound = Vec::with_capacity(branches.len());
                let mut data_type = None;
                for (condition, result) in branches {
                    let condition = self.bind_expr(condition, ctx)?;
                    let result = self.bind_expr(result, ctx)?;
                    data_type = data_type.or(result.data_type);
                    bound.push((condition.expr, result.expr));
                }
                let default = match default {
                    Some(d) => {
                        let d = self.bind_expr(d, ctx)?;
                        data_type = data_type.or(d.data_type);
                        Some(Box::new(d.expr))
                    }
                    None => None,
                };
                Ok(Typed::new(
                    BoundExpr::Case {
                        branches: bound,
                        default,
                    },
                    data_type,
                ))
            }

            Expr::ScalarSubquery(subquery) => {
                let (subquery, scope) = self.bind_subquery(subquery, ctx)?;
                if subquery.width != 1 {
                    return Err(ExecutionError::SubqueryColumns {
                        expected: 1,
                        got: subquery.width,
                    });
                }
                let data_type = scope.get(0).and_then(|c| c.data_type);
                Ok(Typed::new(BoundExpr::ScalarSubquery(subquery), data_type))
            }

            Expr::Exists { subquery, negated } => {
                let (subquery, _) = self.bind_subquery(subquery, ctx)?;
                Ok(Typed::new(
                    BoundExpr::Exists {
                        subquery,
                        negated: *negated,
                    },
                    Some(DataType::Boolean),
                ))
            }
        }
    }
}

/// Plain column pass-throughs keep their relation qualifier so later nodes
/// can still refer to them as `alias.column`.
fn passthrough_qualifier(column: &NamedExpr, typed: &Typed, scope: &Scope) -> Option<String> {
    match (&column.alias, &typed.expr) {
        (None, BoundExpr::Column(i)) => scope.get(*i).and_then(|c| c.qualifier.clone()),
        _ => None,
    }
}

fn check_distinct_names(columns: &[ScopeColumn]) -> ExecutionResult<()> {
    for (i, column) in columns.iter().enumerate() {
        let clash = columns[..i]
            .iter()
            .any(|c| c.name == column.name && c.qualifier == column.qualifier);
        if clash {
            return Err(ExecutionError::DuplicateAlias(column.name.clone()));
        }
    }
    Ok(())
}

fn arity_text(min: usize, max: usize) -> String {
    if min == max {
        format!("{}", min)
    } else if max == usize::MAX {
        format!("at least {}", min)
    } else {
        format!("{} to {}", min, max)
    }
}

fn binary_type(op: BinaryOp, left: Option<DataType>, right: Option<DataType>) -> Option<DataType> {
    match op {
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::And
        | BinaryOp::Or => Some(DataType::Boolean),
        BinaryOp::Concat => Some(DataType::Text),
        BinaryOp::Mod => Some(DataType::Integer),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => match (left, right) {
            (Some(l), Some(r)) => l.numeric_promotion(r),
            (Some(t), None) | (None, Some(t)) if t.is_numeric() => Some(t),
            _ => None,
        },
    }
}

fn function_type(func: ScalarFunc, args: &[Typed]) -> Option<DataType> {
    let first = args.first().and_then(|a| a.data_type);
    match func {
        ScalarFunc::Concat
        | ScalarFunc::Substr
        | ScalarFunc::Upper
        | ScalarFunc::Lower
        | ScalarFunc::Trim => Some(DataType::Text),
        ScalarFunc::Length
        | ScalarFunc::DateDiff
        | ScalarFunc::Year
        | ScalarFunc::Month
        | ScalarFunc::Day => Some(DataType::Integer),
        ScalarFunc::DateAdd => Some(DataType::Date),
        ScalarFunc::Round | ScalarFunc::Abs => first,
        ScalarFunc::Coalesce => args.iter().find_map(|a| a.data_type),
    }
}

fn aggregate_type(func: AggregateFunc, arg: Option<DataType>) -> Option<DataType> {
    match func {
        AggregateFunc::Count => Some(DataType::Integer),
        AggregateFunc::Avg => Some(DataType::Real),
        AggregateFunc::Sum | AggregateFunc::Min | AggregateFunc::Max => arg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SortOrder;
    use alloc::vec;
    use roster_core::Value;

    fn catalog() -> Catalog {
        Catalog::with_builtin(vec![], vec![]).unwrap()
    }

    fn plan(plan: LogicalPlan) -> ExecutionResult<BoundQuery> {
        let catalog = catalog();
        QueryPlanner::new(&catalog).plan(&plan)
    }

    #[test]
    fn test_unknown_relation() {
        let result = plan(LogicalPlan::scan("teams"));
        assert_eq!(
            result.unwrap_err(),
            ExecutionError::RelationNotFound("teams".into())
        );
    }

    #[test]
    fn test_unknown_column() {
        let result = plan(LogicalPlan::filter(
            LogicalPlan::scan("participants"),
            Expr::eq(Expr::col("points"), Expr::literal(300)),
        ));
        assert!(matches!(
            result,
            Err(ExecutionError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_unbound_alias_in_join() {
        let result = plan(LogicalPlan::inner_join(
            LogicalPlan::scan_as("participants", "p1"),
            LogicalPlan::scan_as("participants", "p2"),
            Expr::lt(
                Expr::column("p1", "id_number"),
                Expr::column("p3", "id_number"),
            ),
        ));
        assert_eq!(
            result.unwrap_err(),
            ExecutionError::AliasNotFound("p3".into())
        );
    }

    #[test]
    fn test_self_join_without_alias_is_rejected() {
        let result = plan(LogicalPlan::inner_join(
            LogicalPlan::scan("participants"),
            LogicalPlan::scan("participants"),
            Expr::literal(true),
        ));
        assert_eq!(
            result.unwrap_err(),
            ExecutionError::DuplicateAlias("participants".into())
        );
    }

    #[test]
    fn test_duplicate_projection_alias() {
        let result = plan(LogicalPlan::project(
            LogicalPlan::scan("participants"),
            vec![
                Expr::col("first_name").alias("name"),
                Expr::col("last_name").alias("name"),
            ],
        ));
        assert_eq!(result.unwrap_err(), ExecutionError::DuplicateAlias("name".into()));
    }

    #[test]
    fn test_aggregate_in_filter_rejected() {
        let result = plan(LogicalPlan::filter(
            LogicalPlan::scan("participants"),
            Expr::gt(Expr::count_star(), Expr::literal(1)),
        ));
        assert!(matches!(result, Err(ExecutionError::MisplacedAggregate(_))));
    }

    #[test]
    fn test_nested_aggregate_rejected() {
        let result = plan(LogicalPlan::aggregate(
            LogicalPlan::scan("participants"),
            vec![],
            vec![Expr::max(Expr::count_star()).into()],
        ));
        assert!(matches!(result, Err(ExecutionError::MisplacedAggregate(_))));
    }

    #[test]
    fn test_ungrouped_column_rejected() {
        let result = plan(LogicalPlan::aggregate(
            LogicalPlan::scan("participants"),
            vec![Expr::col("team").into()],
            vec![Expr::col("age").into()],
        ));
        assert_eq!(result.unwrap_err(), ExecutionError::NotGrouped("age".into()));
    }

    #[test]
    fn test_aggregate_layout() {
        let bound = plan(LogicalPlan::aggregate_having(
            LogicalPlan::scan_as("participants", "p"),
            vec![Expr::column("p", "team").into()],
            vec![
                Expr::count_star().alias("members"),
                Expr::div(
                    Expr::add(Expr::max(Expr::col("age")), Expr::min(Expr::col("age"))),
                    Expr::literal(2),
                )
                .alias("midpoint"),
            ],
            Expr::gt(Expr::col("members"), Expr::literal(1)),
        ))
        .unwrap();

        let names: Vec<&str> = bound.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["team", "members", "midpoint"]);
        assert_eq!(bound.columns[1].data_type, Some(DataType::Integer));

        match bound.plan {
            PhysicalPlan::HashAggregate {
                group_by,
                accumulators,
                having,
                ..
            } => {
                assert_eq!(group_by.len(), 1);
                assert_eq!(accumulators.len(), 3);
                assert!(having.is_some());
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_having_alias_shadows_input_column() {
        let bound = plan(LogicalPlan::aggregate_having(
            LogicalPlan::scan("participants"),
            vec![Expr::col("team").into()],
            vec![Expr::max(Expr::col("age")).alias("age")],
            Expr::gt(Expr::col("age"), Expr::literal(30)),
        ))
        .unwrap();
        let names: Vec<&str> = bound.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["team", "age"]);

        // Without a matching alias the input column is still ungrouped.
        let result = plan(LogicalPlan::aggregate_having(
            LogicalPlan::scan("participants"),
            vec![Expr::col("team").into()],
            vec![Expr::max(Expr::col("age")).alias("oldest")],
            Expr::gt(Expr::col("age"), Expr::literal(30)),
        ));
        assert_eq!(result.unwrap_err(), ExecutionError::NotGrouped("age".into()));
    }

    #[test]
    fn test_group_key_matched_by_bare_name() {
        let bound = plan(LogicalPlan::aggregate(
            LogicalPlan::scan_as("participants", "p"),
            vec![Expr::column("p", "team").into()],
            vec![Expr::concat(Expr::col("team"), Expr::literal("!")).alias("shout")],
        ));
        assert!(bound.is_ok());
    }

    #[test]
    fn test_scalar_subquery_width_checked() {
        let sub = Subquery::new(LogicalPlan::scan("regions"));
        let result = plan(LogicalPlan::filter(
            LogicalPlan::scan("participants"),
            Expr::eq(Expr::col("state_code"), Expr::scalar_subquery(sub)),
        ));
        assert_eq!(
            result.unwrap_err(),
            ExecutionError::SubqueryColumns {
                expected: 1,
                got: 4
            }
        );
    }

    #[test]
    fn test_outer_reference_must_be_declared() {
        let inner = LogicalPlan::filter(
            LogicalPlan::scan_as("participants", "inner_p"),
            Expr::eq(Expr::column("inner_p", "team"), Expr::outer(0)),
        );
        let sub = Subquery::new(LogicalPlan::project(inner, vec![Expr::col("age").into()]));
        let result = plan(LogicalPlan::filter(
            LogicalPlan::scan("participants"),
            Expr::in_subquery(Expr::col("age"), sub),
        ));
        assert_eq!(result.unwrap_err(), ExecutionError::UnboundOuterReference(0));
    }

    #[test]
    fn test_correlated_subquery_binds() {
        let inner = LogicalPlan::aggregate(
            LogicalPlan::filter(
                LogicalPlan::scan_as("participants", "p2"),
                Expr::eq(Expr::column("p2", "team"), Expr::outer(0)),
            ),
            vec![],
            vec![Expr::max(Expr::column("p2", "age")).into()],
        );
        let sub = Subquery::correlated(inner, vec![Expr::column("p1", "team")]);
        let bound = plan(LogicalPlan::sort(
            LogicalPlan::filter(
                LogicalPlan::scan_as("participants", "p1"),
                Expr::eq(Expr::column("p1", "age"), Expr::scalar_subquery(sub)),
            ),
            vec![(Expr::column("p1", "id_number"), SortOrder::Asc)],
        ))
        .unwrap();
        assert_eq!(bound.columns.len(), 11);
    }

    #[test]
    fn test_function_arity_checked() {
        let result = plan(LogicalPlan::project(
            LogicalPlan::scan("participants"),
            vec![Expr::function(ScalarFunc::Length, vec![]).into()],
        ));
        assert!(matches!(result, Err(ExecutionError::InvalidPlan(_))));
    }

    #[test]
    fn test_result_column_types() {
        let bound = plan(LogicalPlan::project(
            LogicalPlan::scan("participants"),
            vec![
                Expr::col("first_name").into(),
                Expr::add(Expr::col("age"), Expr::literal(Value::Real(0.5))).alias("age_plus"),
                Expr::function(ScalarFunc::DateAdd, vec![Expr::col("signup"), Expr::literal(30)])
                    .alias("renewal"),
            ],
        ))
        .unwrap();
        let types: Vec<Option<DataType>> = bound.columns.iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                Some(DataType::Text),
                Some(DataType::Real),
                Some(DataType::Date)
            ]
        );
    }
}
