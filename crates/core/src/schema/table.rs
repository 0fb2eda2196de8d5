//! Relation schema definition.

use super::column::Column;
use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// The schema of a named relation.
#[derive(Clone, Debug)]
pub struct Table {
    /// Relation name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
}

impl Table {
    /// Creates a new table with the given name and columns.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();

        Self {
            name: name.into(),
            columns,
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of columns.
    #[inline]
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Gets a column by name, failing with `ColumnNotFound`.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get_column(name)
            .ok_or_else(|| Error::column_not_found(&self.name, name))
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Column> {
        match self.columns.iter_mut().find(|c| c.name() == name) {
            Some(col) => Ok(col),
            None => Err(Error::invalid_schema(format!("Column not found: {}", name))),
        }
    }

    /// Adds a non-nullable column to the table.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if !data_type.is_storable() {
            return Err(Error::invalid_schema(format!(
                "Column {} cannot be declared as {}",
                name, data_type
            )));
        }
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                name
            )));
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Result<Self> {
        for name in columns {
            let col = self.find_mut(name)?;
            *col = col.clone().nullable(true);
        }
        Ok(self)
    }

    /// Marks a column as a unique key.
    pub fn add_unique(mut self, column: &str) -> Result<Self> {
        let col = self.find_mut(column)?;
        *col = col.clone().unique(true);
        Ok(self)
    }

    /// Restricts a column to a closed set of values.
    pub fn add_domain(mut self, column: &str, values: Vec<Value>) -> Result<Self> {
        let col = self.find_mut(column)?;
        let data_type = col.data_type();
        if let Some(bad) = values
            .iter()
            .find(|v| v.data_type() != Some(data_type))
        {
            return Err(Error::invalid_schema(format!(
                "Domain value {} does not match column type {}",
                bad, data_type
            )));
        }
        *col = col.clone().domain(values);
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<Table> {
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table {} has no columns",
                self.name
            )));
        }
        Ok(Table::new(self.name, self.columns))
    }
}
