//! The read-only catalog of relations.
//!
//! A `Catalog` is populated once through `CatalogBuilder`, which validates
//! every row against its schema. After `build()` there is no mutation entry
//! point: rows are shared behind `Arc`, so a catalog can be read from several
//! threads at once without locking.

use crate::error::{Error, Result};
use crate::row::Row;
use crate::schema::{builtin, Table};
use crate::types::DataType;
use crate::value::Value;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashSet;

/// A named, ordered, immutable sequence of rows sharing one schema.
#[derive(Clone, Debug)]
pub struct Relation {
    schema: Arc<Table>,
    rows: Arc<[Row]>,
}

impl Relation {
    /// Returns the relation name.
    #[inline]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the relation schema.
    #[inline]
    pub fn schema(&self) -> &Table {
        &self.schema
    }

    /// Returns the rows in load order.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns a shared handle to the rows.
    #[inline]
    pub fn shared_rows(&self) -> Arc<[Row]> {
        Arc::clone(&self.rows)
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the relation has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only collection of relations, looked up by name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    relations: BTreeMap<String, Relation>,
}

impl Catalog {
    /// Starts building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Builds a catalog holding the built-in `participants` and `regions`
    /// relations.
    pub fn with_builtin(participants: Vec<Row>, regions: Vec<Row>) -> Result<Self> {
        CatalogBuilder::new()
            .add_relation(builtin::participants(), participants)?
            .add_relation(builtin::regions(), regions)?
            .build()
    }

    /// Gets a relation by name.
    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Gets a relation by name, failing with `TableNotFound`.
    pub fn relation(&self, name: &str) -> Result<&Relation> {
        self.get(name).ok_or_else(|| Error::table_not_found(name))
    }

    /// Returns the number of relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Returns all relation names.
    pub fn relation_names(&self) -> Vec<&str> {
        self.relations.keys().map(|s| s.as_str()).collect()
    }
}

/// Builder that validates and loads relations into a `Catalog`.
#[derive(Default)]
pub struct CatalogBuilder {
    relations: BTreeMap<String, Relation>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            relations: BTreeMap::new(),
        }
    }

    /// Validates `rows` against `schema` and adds the relation.
    pub fn add_relation(mut self, schema: Table, rows: Vec<Row>) -> Result<Self> {
        let name = schema.name().to_string();
        if self.relations.contains_key(&name) {
            return Err(Error::invalid_schema(format!(
                "Relation already exists: {}",
                name
            )));
        }

        let rows = rows
            .into_iter()
            .map(|row| conform_row(&schema, row))
            .collect::<Result<Vec<Row>>>()?;
        check_unique(&schema, &rows)?;

        self.relations.insert(
            name,
            Relation {
                schema: Arc::new(schema),
                rows: rows.into(),
            },
        );
        Ok(self)
    }

    /// Finishes loading.
    pub fn build(self) -> Result<Catalog> {
        Ok(Catalog {
            relations: self.relations,
        })
    }
}

/// Checks a row against the schema, widening integers stored in real columns.
fn conform_row(schema: &Table, row: Row) -> Result<Row> {
    if row.len() != schema.arity() {
        return Err(Error::invalid_schema(format!(
            "Row for {} has {} values, expected {}",
            schema.name(),
            row.len(),
            schema.arity()
        )));
    }

    let values = row
        .into_values()
        .into_iter()
        .zip(schema.columns())
        .map(|(value, column)| {
            let value = match (value, column.data_type()) {
                (Value::Null, _) if !column.is_nullable() => {
                    return Err(Error::null_constraint(column.name()))
                }
                (Value::Integer(i), DataType::Real) => Value::Real(i as f64),
                (value, expected) => match value.data_type() {
                    Some(got) if got != expected => {
                        return Err(Error::type_mismatch(column.name(), expected, got))
                    }
                    _ => value,
                },
            };
            if let Some(domain) = column.get_domain() {
                if !value.is_null() && !domain.contains(&value) {
                    return Err(Error::domain_violation(column.name(), value));
                }
            }
            Ok(value)
        })
        .collect::<Result<Vec<Value>>>()?;

    Ok(Row::new(values))
}

fn check_unique(schema: &Table, rows: &[Row]) -> Result<()> {
    for column in schema.columns().iter().filter(|c| c.is_unique()) {
        let mut seen: HashSet<&Value> = HashSet::with_capacity(rows.len());
        for value in rows.iter().filter_map(|r| r.get(column.index())) {
            if !value.is_null() && !seen.insert(value) {
                return Err(Error::unique_constraint(column.name(), value.clone()));
            }
        }
    }
    Ok(())
}
