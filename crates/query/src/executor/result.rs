//! Query results.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use roster_core::{DataType, Row, Value};

/// Name and static type of one output column. The type is `None` when the
/// column can only ever hold null.
///
/// Columns passed through from a relation keep its alias as `qualifier`, so
/// the two sides of a self-join stay distinguishable in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: String,
    pub qualifier: Option<String>,
    pub data_type: Option<DataType>,
}

impl ResultColumn {
    /// Creates an unqualified result column.
    pub fn new(name: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            data_type,
        }
    }

    /// Attaches the relation alias the column came from.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Returns `alias.name`, or the bare name for unqualified columns.
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.name),
            None => self.name.clone(),
        }
    }

    fn matches(&self, qualifier: Option<&str>, name: &str) -> bool {
        self.name == name && qualifier.map_or(true, |q| self.qualifier.as_deref() == Some(q))
    }
}

/// A fully materialized query result.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Creates a result set.
    pub fn new(columns: Vec<ResultColumn>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were produced.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the output column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Finds a column by bare name or by `alias.name`.
    ///
    /// Returns `None` when nothing matches or when a bare name matches more
    /// than one column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.unique_index(None, name).or_else(|| {
            let (qualifier, column) = name.split_once('.')?;
            self.unique_index(Some(qualifier), column)
        })
    }

    fn unique_index(&self, qualifier: Option<&str>, name: &str) -> Option<usize> {
        let mut found = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(qualifier, name))
            .map(|(i, _)| i);
        match (found.next(), found.next()) {
            (Some(i), None) => Some(i),
            _ => None,
        }
    }

    /// Returns every value of the named column, or `None` if there is no
    /// such column.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Returns the value at (`row`, `column`).
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = alloc::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
