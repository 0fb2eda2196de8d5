//! Schemas of the two built-in relations.

use super::column::Column;
use super::table::Table;
use crate::types::DataType;
use crate::value::Value;
use alloc::vec;

/// Name of the participants relation.
pub const PARTICIPANTS: &str = "participants";
/// Name of the regions relation.
pub const REGIONS: &str = "regions";

/// Schema of `participants`.
///
/// `id_number` is the unique, non-null key used for self-join tie-breaking.
/// `state_code` is a logical reference to `regions.state_abbrev` that is
/// never enforced.
pub fn participants() -> Table {
    Table::new(
        PARTICIPANTS,
        vec![
            Column::new("id_number", DataType::Integer).unique(true),
            Column::new("first_name", DataType::Text).nullable(true),
            Column::new("last_name", DataType::Text).nullable(true),
            Column::new("city", DataType::Text).nullable(true),
            Column::new("state_code", DataType::Text).nullable(true),
            Column::new("shirt_or_hat", DataType::Text)
                .nullable(true)
                .domain(vec![Value::from("shirt"), Value::from("hat")]),
            Column::new("quiz_points", DataType::Integer).nullable(true),
            Column::new("team", DataType::Text).nullable(true),
            Column::new("signup", DataType::Date).nullable(true),
            Column::new("age", DataType::Integer).nullable(true),
            Column::new("company", DataType::Text).nullable(true),
        ],
    )
}

/// Schema of `regions`, keyed by `state_abbrev`.
pub fn regions() -> Table {
    Table::new(
        REGIONS,
        vec![
            Column::new("state_name", DataType::Text),
            Column::new("state_abbrev", DataType::Text).unique(true),
            Column::new("region", DataType::Text).nullable(true),
            Column::new("division", DataType::Text).nullable(true),
        ],
    )
}
