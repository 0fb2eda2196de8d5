//! Expression evaluation.
//!
//! Predicates use three-valued logic: a boolean result is `Value::Boolean`
//! and *unknown* is `Value::Null`. Operators that see a null operand yield
//! null unless noted otherwise (`IS [NOT] NULL`, `EXISTS`, `COALESCE`, and
//! the short-circuit rules of AND/OR).

use crate::ast::{BinaryOp, UnaryOp};
use crate::context::ExecutionContext;
use crate::executor::functions;
use crate::executor::{ExecutionError, ExecutionResult, PhysicalPlanRunner};
use crate::planner::physical::{BoundExpr, BoundSubquery};
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use roster_core::pattern_match;
use roster_core::{Error, Row, Value};

/// Evaluates bound expressions for one operator.
///
/// Carries the execution context (for subqueries) and the correlation values
/// of the plan it belongs to.
#[derive(Clone)]
pub struct ExprEvaluator<'a> {
    ctx: Rc<ExecutionContext<'a>>,
    params: Rc<[Value]>,
}

impl<'a> ExprEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(ctx: Rc<ExecutionContext<'a>>, params: Rc<[Value]>) -> Self {
        Self { ctx, params }
    }

    /// Returns the execution context.
    pub fn context(&self) -> &Rc<ExecutionContext<'a>> {
        &self.ctx
    }

    /// Evaluates a predicate. Only an exactly-true result passes.
    pub fn eval_predicate(&self, expr: &BoundExpr, row: &[Value]) -> ExecutionResult<bool> {
        Ok(truth(&self.eval(expr, row)?)? == Some(true))
    }

    /// Evaluates an expression against a row.
    pub fn eval(&self, expr: &BoundExpr, row: &[Value]) -> ExecutionResult<Value> {
        match expr {
            BoundExpr::Column(i) => row.get(*i).cloned().ok_or_else(|| {
                ExecutionError::invalid_plan(format!(
                    "column slot {} out of range for a row of {}",
                    i,
                    row.len()
                ))
            }),

            BoundExpr::Param(i) => self.params.get(*i).cloned().ok_or_else(|| {
                ExecutionError::invalid_plan(format!("correlation value {} is not bound", i))
            }),

            BoundExpr::Literal(value) => Ok(value.clone()),

            BoundExpr::Binary { left, op, right } => match op {
                BinaryOp::And => {
                    let l = truth(&self.eval(left, row)?)?;
                    if l == Some(false) {
                        return Ok(Value::Boolean(false));
                    }
                    let r = truth(&self.eval(right, row)?)?;
                    Ok(from_truth(and3(l, r)))
                }
                BinaryOp::Or => {
                    let l = truth(&self.eval(left, row)?)?;
                    if l == Some(true) {
                        return Ok(Value::Boolean(true));
                    }
                    let r = truth(&self.eval(right, row)?)?;
                    Ok(from_truth(or3(l, r)))
                }
                _ => {
                    let l = self.eval(left, row)?;
                    let r = self.eval(right, row)?;
                    binary(*op, &l, &r)
                }
            },

            BoundExpr::Unary { op, expr } => {
                let value = self.eval(expr, row)?;
                match op {
                    UnaryOp::Not => Ok(from_truth(truth(&value)?.map(|b| !b))),
                    UnaryOp::Neg => negate(&value),
                    UnaryOp::IsNull => Ok(Value::Boolean(value.is_null())),
                    UnaryOp::IsNotNull => Ok(Value::Boolean(!value.is_null())),
                }
            }

            BoundExpr::Function { func, args } => {
                let args = self.eval_all(args, row)?;
                functions::call(*func, &args)
            }

            BoundExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let value = self.eval(expr, row)?;
                let low = self.eval(low, row)?;
                let high = self.eval(high, row)?;
                let above = value.sql_cmp(&low)?.map(|o| o != Ordering::Less);
                let below = value.sql_cmp(&high)?.map(|o| o != Ordering::Greater);
                Ok(from_truth(negate_if(and3(above, below), *negated)))
            }

            BoundExpr::InList {
                expr,
                list,
                negated,
            } => {
                let probe = self.eval(expr, row)?;
                let list = self.eval_all(list, row)?;
                let found = tuple_in(
                    core::slice::from_ref(&probe),
                    list.iter().map(core::slice::from_ref),
                )?;
                Ok(from_truth(negate_if(found, *negated)))
            }

            BoundExpr::InSubquery {
                exprs,
                subquery,
                negated,
            } => {
                let probe = self.eval_all(exprs, row)?;
                let rows = self.subquery_rows(subquery, row)?;
                let found = tuple_in(&probe, rows.iter().map(Row::values))?;
                Ok(from_truth(negate_if(found, *negated)))
            }

            BoundExpr::Like {
                expr,
                pattern,
                negated,
            } => {
                let value = self.eval(expr, row)?;
                let pattern = self.eval(pattern, row)?;
                let matched = match (&value, &pattern) {
                    (Value::Null, _) | (_, Value::Null) => None,
                    (Value::Text(v), Value::Text(p)) => Some(pattern_match::like(v, p)),
                    (v, p) => {
                        return Err(Error::incompatible_types("match", v.data_type(), p.data_type()).into())
                    }
                };
                Ok(from_truth(negate_if(matched, *negated)))
            }

            BoundExpr::Case { branches, default } => {
                for (condition, result) in branches {
                    if truth(&self.eval(condition, row)?)? == Some(true) {
                        return self.eval(result, row);
                    }
                }
                match default {
                    Some(d) => self.eval(d, row),
                    None => Ok(Value::Null),
                }
            }

            BoundExpr::ScalarSubquery(subquery) => {
                let rows = self.subquery_rows(subquery, row)?;
                match rows.len() {
                    0 => Ok(Value::Null),
                    1 => Ok(rows[0].get(0).cloned().unwrap_or(Value::Null)),
                    n => Err(ExecutionError::SubqueryCardinality { rows: n }),
                }
            }

            BoundExpr::Exists { subquery, negated } => {
                let rows = self.subquery_rows(subquery, row)?;
                Ok(Value::Boolean(rows.is_empty() == *negated))
            }
        }
    }

    fn eval_all(&self, exprs: &[BoundExpr], row: &[Value]) -> ExecutionResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e, row)).collect()
    }

    /// Runs (or recalls) a subquery for the correlation values of `row`.
    fn subquery_rows(&self, subquery: &BoundSubquery, row: &[Value]) -> ExecutionResult<Rc<[Row]>> {
        let params = self.eval_all(&subquery.outer, row)?;
        if let Some(rows) = self.ctx.cached_subquery(subquery, &params) {
            log::trace!("subquery {} cache hit", subquery.id);
            return Ok(rows);
        }

        log::trace!("subquery {} running with {} outer values", subquery.id, params.len());
        let runner = PhysicalPlanRunner::new(Rc::clone(&self.ctx));
        let rows: Rc<[Row]> = runner
            .execute(&subquery.plan, Rc::from(params.clone()))?
            .into();
        self.ctx.store_subquery(subquery, params, Rc::clone(&rows));
        Ok(rows)
    }
}

/// Interprets a value as a truth value; null is *unknown*.
fn truth(value: &Value) -> ExecutionResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(ExecutionError::type_mismatch(format!(
            "expected a boolean, got {}",
            other.data_type().map_or("null", |t| t.name())
        ))),
    }
}

fn from_truth(t: Option<bool>) -> Value {
    t.map_or(Value::Null, Value::Boolean)
}

fn and3(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or3(l: Option<bool>, r: Option<bool>) -> Option<bool> {
    match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn negate_if(t: Option<bool>, negated: bool) -> Option<bool> {
    if negated {
        t.map(|b| !b)
    } else {
        t
    }
}

/// SQL membership: true on any match, otherwise unknown if any comparison
/// was unknown, otherwise false.
fn tuple_in<'v>(
    probe: &[Value],
    candidates: impl Iterator<Item = &'v [Value]>,
) -> ExecutionResult<Option<bool>> {
    let mut unknown = false;
    for candidate in candidates {
        match tuple_eq(probe, candidate)? {
            Some(true) => return Ok(Some(true)),
            Some(false) => {}
            None => unknown = true,
        }
    }
    Ok(if unknown { None } else { Some(false) })
}

fn tuple_eq(left: &[Value], right: &[Value]) -> ExecutionResult<Option<bool>> {
    let mut result = Some(true);
    for (l, r) in left.iter().zip(right) {
        let eq = l.sql_cmp(r)?.map(|o| o == Ordering::Equal);
        result = and3(result, eq);
        if result == Some(false) {
            break;
        }
    }
    Ok(result)
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> ExecutionResult<Value> {
    if op.is_comparison() {
        let ord = l.sql_cmp(r)?;
        return Ok(from_truth(ord.map(|o| match op {
            BinaryOp::Eq => o == Ordering::Equal,
            BinaryOp::Ne => o != Ordering::Equal,
            BinaryOp::Lt => o == Ordering::Less,
            BinaryOp::Le => o != Ordering::Greater,
            BinaryOp::Gt => o == Ordering::Greater,
            _ => o != Ordering::Less,
        })));
    }
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    match op {
        BinaryOp::Concat => Ok(Value::Text(format!("{}{}", l, r))),
        _ => arithmetic(op, l, r),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> ExecutionResult<Value> {
    let name = match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "subtract",
        BinaryOp::Mul => "multiply",
        BinaryOp::Div => "divide",
        BinaryOp::Mod => "take the modulo of",
        _ => {
            return Err(ExecutionError::invalid_plan(format!(
                "{} is not an arithmetic operator",
                op.symbol()
            )))
        }
    };

    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0 {
                return Err(ExecutionError::DivisionByZero);
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div => a.checked_div(b),
                // i64::MIN % -1 is 0.
                _ => Some(a.wrapping_rem(b)),
            };
            result.map(Value::Integer).ok_or(ExecutionError::NumericOverflow)
        }
        (a, b) => match (a.to_f64(), b.to_f64()) {
            (Some(_), Some(_)) if op == BinaryOp::Mod => Err(ExecutionError::type_mismatch(
                "modulo is only defined for integers",
            )),
            (Some(_), Some(y)) if op == BinaryOp::Div && y == 0.0 => {
                Err(ExecutionError::DivisionByZero)
            }
            (Some(x), Some(y)) => Ok(Value::Real(match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                _ => x / y,
            })),
            _ => Err(Error::incompatible_types(name, a.data_type(), b.data_type()).into()),
        },
    }
}

fn negate(value: &Value) -> ExecutionResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or(ExecutionError::NumericOverflow),
        Value::Real(r) => Ok(Value::Real(-r)),
        other => Err(ExecutionError::type_mismatch(format!(
            "cannot negate {}",
            other.data_type().map_or("null", |t| t.name())
        ))),
    }
}
