//! Property-based tests for evaluation and operator invariants.
//!
//! Inputs are random rosters over a small set of teams and states so that
//! groups, ties and unmatched join rows all show up regularly.

use proptest::prelude::*;
use roster_core::{Catalog, Row, Value};
use roster_query::ast::{BinaryOp, Expr, SortOrder, UnaryOp};
use roster_query::context::{ExecutionConfig, ExecutionContext};
use roster_query::executor::{ExprEvaluator, QueryExecutor};
use roster_query::planner::BoundExpr;
use roster_query::LogicalPlan;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

const TEAMS: [&str; 3] = ["Red", "Blue", "Green"];
const STATES: [&str; 4] = ["OR", "OH", "TX", "WA"];

#[derive(Clone, Debug)]
struct Member {
    team: Option<usize>,
    state: Option<usize>,
    age: Option<i64>,
}

fn member_strategy() -> impl Strategy<Value = Member> {
    (
        proptest::option::of(0..TEAMS.len()),
        proptest::option::of(0..STATES.len()),
        proptest::option::of(18i64..70),
    )
        .prop_map(|(team, state, age)| Member { team, state, age })
}

fn text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, Value::from)
}

fn participant_rows(members: &[Member]) -> Vec<Row> {
    members
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Row::new(vec![
                Value::Integer(i as i64 + 1),
                Value::from(format!("P{}", i + 1)),
                Value::Null,
                Value::Null,
                text(m.state.map(|s| STATES[s])),
                Value::Null,
                Value::Null,
                text(m.team.map(|t| TEAMS[t])),
                Value::Null,
                m.age.map_or(Value::Null, Value::Integer),
                Value::Null,
            ])
        })
        .collect()
}

/// Regions for the first `count` states.
fn region_rows(count: usize) -> Vec<Row> {
    STATES[..count]
        .iter()
        .map(|abbrev| {
            Row::new(vec![
                Value::from(format!("State {}", abbrev)),
                Value::from(*abbrev),
                Value::from("Somewhere"),
                Value::Null,
            ])
        })
        .collect()
}

fn catalog(members: &[Member], regions: usize) -> Catalog {
    Catalog::with_builtin(participant_rows(members), region_rows(regions)).unwrap()
}

fn truth_strategy() -> impl Strategy<Value = Option<bool>> {
    proptest::option::of(any::<bool>())
}

fn truth_literal(t: Option<bool>) -> BoundExpr {
    BoundExpr::Literal(t.map_or(Value::Null, Value::Boolean))
}

fn eval_truth(expr: &BoundExpr) -> Option<bool> {
    let catalog = Catalog::default();
    let ctx = Rc::new(ExecutionContext::new(&catalog, ExecutionConfig::default()));
    let evaluator = ExprEvaluator::new(ctx, Rc::from(Vec::new()));
    match evaluator.eval(expr, &[]).unwrap() {
        Value::Boolean(b) => Some(b),
        Value::Null => None,
        other => panic!("expected a truth value, got {:?}", other),
    }
}

/// Kleene conjunction.
fn kleene_and(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn kleene_or(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_three_valued_logic(a in truth_strategy(), b in truth_strategy()) {
        let (la, lb) = (truth_literal(a), truth_literal(b));

        let and = BoundExpr::binary(la.clone(), BinaryOp::And, lb.clone());
        prop_assert_eq!(eval_truth(&and), kleene_and(a, b));

        let or = BoundExpr::binary(la.clone(), BinaryOp::Or, lb.clone());
        prop_assert_eq!(eval_truth(&or), kleene_or(a, b));

        let not = BoundExpr::unary(UnaryOp::Not, la.clone());
        prop_assert_eq!(eval_truth(&not), a.map(|x| !x));

        let double_negation = BoundExpr::unary(UnaryOp::Not, not);
        prop_assert_eq!(eval_truth(&double_negation), a);

        // De Morgan holds under three-valued logic.
        let lhs = BoundExpr::unary(UnaryOp::Not, and);
        let rhs = BoundExpr::binary(
            BoundExpr::unary(UnaryOp::Not, la.clone()),
            BinaryOp::Or,
            BoundExpr::unary(UnaryOp::Not, lb),
        );
        prop_assert_eq!(eval_truth(&lhs), eval_truth(&rhs));

        let is_null = BoundExpr::unary(UnaryOp::IsNull, la);
        prop_assert_eq!(eval_truth(&is_null), Some(a.is_none()));
    }

    #[test]
    fn prop_left_join_keeps_every_left_row(
        members in prop::collection::vec(member_strategy(), 0..24),
        regions in 0..=STATES.len(),
    ) {
        let catalog = catalog(&members, regions);
        let plan = LogicalPlan::left_join(
            LogicalPlan::scan("regions"),
            LogicalPlan::scan("participants"),
            Expr::eq(
                Expr::column("regions", "state_abbrev"),
                Expr::column("participants", "state_code"),
            ),
        );
        let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();
        prop_assert!(result.len() >= regions);

        for abbrev in &STATES[..regions] {
            let matches = members
                .iter()
                .filter(|m| m.state.map(|s| STATES[s]) == Some(*abbrev))
                .count();
            let rows: Vec<&Row> = result
                .rows
                .iter()
                .filter(|r| r.get(1) == Some(&Value::from(*abbrev)))
                .collect();
            if matches == 0 {
                prop_assert_eq!(rows.len(), 1);
                prop_assert!(rows[0].values()[4..].iter().all(Value::is_null));
            } else {
                prop_assert_eq!(rows.len(), matches);
            }
        }
    }

    #[test]
    fn prop_self_join_pairs_are_unique(
        members in prop::collection::vec(member_strategy(), 0..20),
    ) {
        let catalog = catalog(&members, 0);
        let plan = LogicalPlan::project(
            LogicalPlan::inner_join(
                LogicalPlan::scan_as("participants", "p1"),
                LogicalPlan::scan_as("participants", "p2"),
                Expr::and(
                    Expr::eq(Expr::column("p1", "team"), Expr::column("p2", "team")),
                    Expr::lt(Expr::column("p1", "id_number"), Expr::column("p2", "id_number")),
                ),
            ),
            vec![
                Expr::column("p1", "id_number").into(),
                Expr::column("p2", "id_number").into(),
            ],
        );
        let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();

        let mut seen = HashSet::new();
        for row in &result.rows {
            let a = row.values()[0].as_i64().unwrap();
            let b = row.values()[1].as_i64().unwrap();
            prop_assert!(a < b);
            prop_assert!(seen.insert((a.min(b), a.max(b))));
        }

        let mut team_sizes: HashMap<usize, usize> = HashMap::new();
        for team in members.iter().filter_map(|m| m.team) {
            *team_sizes.entry(team).or_default() += 1;
        }
        let expected: usize = team_sizes.values().map(|n| n * (n - 1) / 2).sum();
        prop_assert_eq!(result.len(), expected);
    }

    #[test]
    fn prop_global_aggregate_yields_one_row(
        members in prop::collection::vec(member_strategy(), 0..24),
    ) {
        let catalog = catalog(&members, 0);
        let plan = LogicalPlan::aggregate(
            LogicalPlan::scan("participants"),
            vec![],
            vec![
                Expr::count_star().alias("n"),
                Expr::count(Expr::col("age")).alias("aged"),
                Expr::sum(Expr::col("age")).alias("total"),
            ],
        );
        let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();
        prop_assert_eq!(result.len(), 1);

        let aged: Vec<i64> = members.iter().filter_map(|m| m.age).collect();
        let n = Value::Integer(members.len() as i64);
        let aged_count = Value::Integer(aged.len() as i64);
        prop_assert_eq!(result.value(0, "n"), Some(&n));
        prop_assert_eq!(result.value(0, "aged"), Some(&aged_count));
        let total = if aged.is_empty() {
            Value::Null
        } else {
            Value::Integer(aged.iter().sum())
        };
        prop_assert_eq!(result.value(0, "total"), Some(&total));
    }

    #[test]
    fn prop_group_counts_partition_input(
        members in prop::collection::vec(member_strategy(), 0..24),
    ) {
        let catalog = catalog(&members, 0);
        let plan = LogicalPlan::aggregate(
            LogicalPlan::scan("participants"),
            vec![Expr::col("team").into()],
            vec![Expr::count_star().alias("n")],
        );
        let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();

        let distinct_teams: HashSet<Option<usize>> = members.iter().map(|m| m.team).collect();
        prop_assert_eq!(result.len(), distinct_teams.len());
        let total: i64 = result
            .column_values("n")
            .unwrap()
            .into_iter()
            .map(|v| v.as_i64().unwrap())
            .sum();
        prop_assert_eq!(total, members.len() as i64);
    }

    #[test]
    fn prop_sort_is_stable(
        members in prop::collection::vec(member_strategy(), 0..24),
        descending in any::<bool>(),
    ) {
        let catalog = catalog(&members, 0);
        let order = if descending { SortOrder::Desc } else { SortOrder::Asc };
        let plan = LogicalPlan::sort(
            LogicalPlan::scan("participants"),
            vec![(Expr::col("team"), order)],
        );
        let result = QueryExecutor::new(&catalog).execute(&plan).unwrap();
        prop_assert_eq!(result.len(), members.len());

        let team = result.column_index("team").unwrap();
        for pair in result.rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let ordering = a.values()[team].cmp(&b.values()[team]);
            if descending {
                prop_assert_ne!(ordering, std::cmp::Ordering::Less);
            } else {
                prop_assert_ne!(ordering, std::cmp::Ordering::Greater);
            }
            if ordering == std::cmp::Ordering::Equal {
                // Input is in id order, so equal keys keep ascending ids.
                prop_assert!(a.values()[0].as_i64() < b.values()[0].as_i64());
            }
        }
    }

    #[test]
    fn prop_limit_is_a_prefix(
        members in prop::collection::vec(member_strategy(), 0..24),
        limit in 0usize..30,
        offset in 0usize..30,
    ) {
        let catalog = catalog(&members, 0);
        let all = QueryExecutor::new(&catalog)
            .execute(&LogicalPlan::scan("participants"))
            .unwrap();
        let limited = QueryExecutor::new(&catalog)
            .execute(&LogicalPlan::limit(LogicalPlan::scan("participants"), limit, offset))
            .unwrap();
        let expected: Vec<Row> = all.rows.into_iter().skip(offset).take(limit).collect();
        prop_assert_eq!(limited.rows, expected);
    }
}
