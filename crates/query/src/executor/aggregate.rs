//! Aggregate executor.

use crate::ast::AggregateFunc;
use crate::executor::{BoxedOperator, ExecutionError, ExecutionResult, ExprEvaluator, Operator};
use crate::planner::physical::{AggregateSpec, BoundExpr};
use alloc::format;
use alloc::vec::Vec;
use core::cmp::Ordering;
use hashbrown::{HashMap, HashSet};
use roster_core::{Row, Value};

/// Running state of one aggregate function.
#[derive(Clone, Debug)]
enum Accumulator {
    Count(i64),
    Sum(Sum),
    Avg { sum: f64, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
}

/// SUM stays integral until it meets a real.
#[derive(Clone, Copy, Debug)]
enum Sum {
    Empty,
    Integer(i64),
    Real(f64),
}

/// Accumulator plus the values already seen, for DISTINCT aggregates.
#[derive(Clone, Debug)]
struct AggregateState {
    accumulator: Accumulator,
    seen: Option<HashSet<Value>>,
}

impl AggregateState {
    fn new(spec: &AggregateSpec) -> Self {
        let accumulator = match spec.func {
            AggregateFunc::Count => Accumulator::Count(0),
            AggregateFunc::Sum => Accumulator::Sum(Sum::Empty),
            AggregateFunc::Avg => Accumulator::Avg { sum: 0.0, count: 0 },
            AggregateFunc::Min => Accumulator::Min(None),
            AggregateFunc::Max => Accumulator::Max(None),
        };
        Self {
            accumulator,
            seen: spec.distinct.then(HashSet::new),
        }
    }

    /// Feeds one input value. `None` stands for the row itself (COUNT(*)).
    fn update(&mut self, value: Option<Value>) -> ExecutionResult<()> {
        let value = match value {
            None => {
                if let Accumulator::Count(n) = &mut self.accumulator {
                    *n += 1;
                }
                return Ok(());
            }
            Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };
        if let Some(seen) = &mut self.seen {
            if seen.contains(&value) {
                return Ok(());
            }
            seen.insert(value.clone());
        }

        match &mut self.accumulator {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(sum) => *sum = add_to_sum(*sum, &value)?,
            Accumulator::Avg { sum, count } => {
                let x = value.to_f64().ok_or_else(|| not_numeric("avg", &value))?;
                *sum += x;
                *count += 1;
            }
            Accumulator::Min(current) => replace_if(current, value, Ordering::Less)?,
            Accumulator::Max(current) => replace_if(current, value, Ordering::Greater)?,
        }
        Ok(())
    }

    fn finish(self) -> Value {
        match self.accumulator {
            Accumulator::Count(n) => Value::Integer(n),
            Accumulator::Sum(Sum::Empty) => Value::Null,
            Accumulator::Sum(Sum::Integer(i)) => Value::Integer(i),
            Accumulator::Sum(Sum::Real(r)) => Value::Real(r),
            Accumulator::Avg { count: 0, .. } => Value::Null,
            Accumulator::Avg { sum, count } => Value::Real(sum / count as f64),
            Accumulator::Min(v) | Accumulator::Max(v) => v.unwrap_or(Value::Null),
        }
    }
}

fn not_numeric(func: &str, value: &Value) -> ExecutionError {
    ExecutionError::type_mismatch(format!(
        "{} expects numeric values, got {}",
        func,
        value.data_type().map_or("null", |t| t.name())
    ))
}

fn add_to_sum(sum: Sum, value: &Value) -> ExecutionResult<Sum> {
    match (sum, value) {
        (Sum::Empty, Value::Integer(i)) => Ok(Sum::Integer(*i)),
        (Sum::Integer(acc), Value::Integer(i)) => acc
            .checked_add(*i)
            .map(Sum::Integer)
            .ok_or(ExecutionError::NumericOverflow),
        (Sum::Empty, Value::Real(r)) => Ok(Sum::Real(*r)),
        (Sum::Integer(acc), Value::Real(r)) => Ok(Sum::Real(acc as f64 + r)),
        (Sum::Real(acc), v) => match v.to_f64() {
            Some(x) => Ok(Sum::Real(acc + x)),
            None => Err(not_numeric("sum", v)),
        },
        (_, v) => Err(not_numeric("sum", v)),
    }
}

/// Keeps the smaller (`Less`) or larger (`Greater`) of the current value and
/// `value`. Mixing incomparable types is a type error.
fn replace_if(current: &mut Option<Value>, value: Value, wanted: Ordering) -> ExecutionResult<()> {
    let replace = match current {
        None => true,
        Some(existing) => {
            let ord = value.sql_cmp(existing).map_err(ExecutionError::from)?;
            ord == Some(wanted)
        }
    };
    if replace {
        *current = Some(value);
    }
    Ok(())
}

/// Hash grouping with aggregate outputs and HAVING.
///
/// The whole input is consumed on the first pull. Groups are emitted in the
/// order their first row arrived. With no group keys exactly one row is
/// produced, even for empty input.
pub struct AggregateExecutor<'a> {
    input: BoxedOperator<'a>,
    group_by: &'a [BoundExpr],
    accumulators: &'a [AggregateSpec],
    outputs: &'a [BoundExpr],
    having: Option<&'a BoundExpr>,
    evaluator: ExprEvaluator<'a>,
    results: Option<alloc::vec::IntoIter<Row>>,
}

impl<'a> AggregateExecutor<'a> {
    /// Creates a new aggregate executor.
    pub fn new(
        input: BoxedOperator<'a>,
        group_by: &'a [BoundExpr],
        accumulators: &'a [AggregateSpec],
        outputs: &'a [BoundExpr],
        having: Option<&'a BoundExpr>,
        evaluator: ExprEvaluator<'a>,
    ) -> Self {
        Self {
            input,
            group_by,
            accumulators,
            outputs,
            having,
            evaluator,
            results: None,
        }
    }

    fn new_states(&self) -> Vec<AggregateState> {
        self.accumulators.iter().map(AggregateState::new).collect()
    }

    fn compute(&mut self) -> ExecutionResult<Vec<Row>> {
        let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<Value>, Vec<AggregateState>)> = Vec::new();
        let mut input_rows = 0usize;

        while let Some(row) = self.input.next()? {
            input_rows += 1;
            let key = self
                .group_by
                .iter()
                .map(|expr| self.evaluator.eval(expr, row.values()))
                .collect::<ExecutionResult<Vec<Value>>>()?;

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = groups.len();
                    index.insert(key.clone(), slot);
                    groups.push((key, self.new_states()));
                    slot
                }
            };

            for (state, spec) in groups[slot].1.iter_mut().zip(self.accumulators) {
                let value = match &spec.arg {
                    Some(expr) => Some(self.evaluator.eval(expr, row.values())?),
                    None => None,
                };
                state.update(value)?;
            }
        }

        if groups.is_empty() && self.group_by.is_empty() {
            groups.push((Vec::new(), self.new_states()));
        }
        log::trace!(
            "aggregate grouped {} rows into {} groups",
            input_rows,
            groups.len()
        );

        let mut results = Vec::with_capacity(groups.len());
        for (key, states) in groups {
            let mut group_row = key.clone();
            group_row.extend(states.into_iter().map(AggregateState::finish));

            if let Some(having) = self.having {
                if !self.evaluator.eval_predicate(having, &group_row)? {
                    continue;
                }
            }

            let mut values = key;
            for expr in self.outputs {
                values.push(self.evaluator.eval(expr, &group_row)?);
            }
            results.push(Row::new(values));
        }
        Ok(results)
    }
}

impl Operator for AggregateExecutor<'_> {
    fn next(&mut self) -> ExecutionResult<Option<Row>> {
        if self.results.is_none() {
            let rows = self.compute()?;
            self.results = Some(rows.into_iter());
        }
        Ok(self.results.as_mut().and_then(|rows| rows.next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use alloc::boxed::Box;
    use crate::context::{ExecutionConfig, ExecutionContext};
    use crate::executor::{drain, ValuesExecutor};
    use alloc::rc::Rc;
    use alloc::vec;
    use roster_core::Catalog;

    fn spec(func: AggregateFunc, arg: Option<usize>, distinct: bool) -> AggregateSpec {
        AggregateSpec {
            func,
            arg: arg.map(BoundExpr::column),
            distinct,
        }
    }

    fn run(
        rows: Vec<Row>,
        group_by: &[BoundExpr],
        accumulators: &[AggregateSpec],
        having: Option<&BoundExpr>,
    ) -> ExecutionResult<Vec<Row>> {
        let catalog = Catalog::default();
        let ctx = Rc::new(ExecutionContext::new(&catalog, ExecutionConfig::default()));
        let evaluator = ExprEvaluator::new(ctx, Rc::from(vec![]));
        let outputs: Vec<BoundExpr> = (0..accumulators.len())
            .map(|i| BoundExpr::column(group_by.len() + i))
            .collect();
        let mut agg = AggregateExecutor::new(
            Box::new(ValuesExecutor::new(rows)),
            group_by,
            accumulators,
            &outputs,
            having,
            evaluator,
        );
        drain(&mut agg)
    }

    fn member(team: &str, age: Value) -> Row {
        Row::new(vec![Value::from(team), age])
    }

    #[test]
    fn test_integral_real_groups_with_integer() {
        let rows = vec![
            member("Red", Value::Integer(1)),
            member("Red", Value::Real(1.0)),
            member("Red", Value::Integer(2)),
        ];
        let grouped = run(
            rows.clone(),
            &[BoundExpr::column(1)],
            &[spec(AggregateFunc::Count, None, false)],
            None,
        )
        .unwrap();
        assert_eq!(
            grouped,
            vec![
                Row::new(vec![Value::Integer(1), Value::Integer(2)]),
                Row::new(vec![Value::Integer(2), Value::Integer(1)]),
            ]
        );

        let distinct = run(rows, &[], &[spec(AggregateFunc::Count, Some(1), true)], None).unwrap();
        assert_eq!(distinct, vec![Row::new(vec![Value::Integer(2)])]);
    }

    #[test]
    fn test_group_by_in_first_appearance_order() {
        let rows = vec![
            member("Red", Value::Integer(30)),
            member("Blue", Value::Integer(20)),
            member("Red", Value::Integer(40)),
        ];
        let out = run(
            rows,
            &[BoundExpr::column(0)],
            &[spec(AggregateFunc::Count, None, false), spec(AggregateFunc::Max, Some(1), false)],
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![
                Row::new(vec![Value::from("Red"), Value::Integer(2), Value::Integer(40)]),
                Row::new(vec![Value::from("Blue"), Value::Integer(1), Value::Integer(20)]),
            ]
        );
    }

    #[test]
    fn test_having_filters_groups() {
        let rows = vec![
            member("A", Value::Integer(1)),
            member("A", Value::Integer(2)),
            member("B", Value::Integer(1)),
        ];
        let having = BoundExpr::binary(BoundExpr::column(1), BinaryOp::Gt, BoundExpr::literal(1));
        let out = run(
            rows,
            &[BoundExpr::column(0)],
            &[spec(AggregateFunc::Count, None, false)],
            Some(&having),
        )
        .unwrap();
        assert_eq!(out, vec![Row::new(vec![Value::from("A"), Value::Integer(2)])]);
    }

    #[test]
    fn test_empty_input_without_keys() {
        let out = run(
            vec![],
            &[],
            &[
                spec(AggregateFunc::Count, None, false),
                spec(AggregateFunc::Sum, Some(1), false),
                spec(AggregateFunc::Avg, Some(1), false),
                spec(AggregateFunc::Min, Some(1), false),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![Row::new(vec![
                Value::Integer(0),
                Value::Null,
                Value::Null,
                Value::Null
            ])]
        );
    }

    #[test]
    fn test_empty_input_with_keys() {
        let out = run(
            vec![],
            &[BoundExpr::column(0)],
            &[spec(AggregateFunc::Count, None, false)],
            None,
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nulls_ignored_and_grouped_together() {
        let rows = vec![
            Row::new(vec![Value::Null, Value::Integer(10)]),
            Row::new(vec![Value::Null, Value::Null]),
            Row::new(vec![Value::from("Red"), Value::Null]),
        ];
        let out = run(
            rows,
            &[BoundExpr::column(0)],
            &[
                spec(AggregateFunc::Count, None, false),
                spec(AggregateFunc::Count, Some(1), false),
                spec(AggregateFunc::Sum, Some(1), false),
                spec(AggregateFunc::Avg, Some(1), false),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![
                Row::new(vec![
                    Value::Null,
                    Value::Integer(2),
                    Value::Integer(1),
                    Value::Integer(10),
                    Value::Real(10.0)
                ]),
                Row::new(vec![
                    Value::from("Red"),
                    Value::Integer(1),
                    Value::Integer(0),
                    Value::Null,
                    Value::Null
                ]),
            ]
        );
    }

    #[test]
    fn test_distinct_aggregates() {
        let rows = vec![
            member("Red", Value::Integer(1)),
            member("Blue", Value::Integer(1)),
            member("Red", Value::Integer(3)),
            member("Red", Value::Null),
        ];
        let out = run(
            rows,
            &[],
            &[
                spec(AggregateFunc::Count, Some(0), true),
                spec(AggregateFunc::Sum, Some(1), true),
                spec(AggregateFunc::Sum, Some(1), false),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![Row::new(vec![
                Value::Integer(2),
                Value::Integer(4),
                Value::Integer(5)
            ])]
        );
    }

    #[test]
    fn test_sum_promotes_to_real() {
        let rows = vec![
            Row::new(vec![Value::Integer(1)]),
            Row::new(vec![Value::Real(0.5)]),
        ];
        let out = run(rows, &[], &[spec(AggregateFunc::Sum, Some(0), false)], None).unwrap();
        assert_eq!(out, vec![Row::new(vec![Value::Real(1.5)])]);
    }

    #[test]
    fn test_type_errors() {
        let rows = vec![Row::new(vec![Value::from("x")])];
        let result = run(rows, &[], &[spec(AggregateFunc::Avg, Some(0), false)], None);
        assert!(matches!(result, Err(ExecutionError::TypeMismatch(_))));

        let rows = vec![
            Row::new(vec![Value::from("x")]),
            Row::new(vec![Value::Integer(1)]),
        ];
        let result = run(rows, &[], &[spec(AggregateFunc::Max, Some(0), false)], None);
        assert!(matches!(result, Err(ExecutionError::TypeMismatch(_))));
    }

    #[test]
    fn test_min_max_over_text_and_dates() {
        let rows = vec![
            Row::new(vec![Value::from("Lee"), Value::date(2021, 5, 1).unwrap()]),
            Row::new(vec![Value::from("Adams"), Value::date(2020, 1, 9).unwrap()]),
        ];
        let out = run(
            rows,
            &[],
            &[
                spec(AggregateFunc::Min, Some(0), false),
                spec(AggregateFunc::Max, Some(1), false),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![Row::new(vec![
                Value::from("Adams"),
                Value::date(2021, 5, 1).unwrap()
            ])]
        );
    }
}
