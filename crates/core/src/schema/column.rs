//! Column definition for Roster relation schemas.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;

/// A column definition in a relation schema.
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Data type of the column.
    data_type: DataType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Whether values in this column must be unique.
    unique: bool,
    /// Closed set of permitted non-null values, if any.
    domain: Option<Vec<Value>>,
    /// Column index in the relation (0-based).
    index: usize,
}

impl Column {
    /// Creates a new non-nullable column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            unique: false,
            domain: None,
            index: 0,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets whether this column has unique values.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Restricts the column to a closed set of values.
    pub fn domain(mut self, values: Vec<Value>) -> Self {
        self.domain = Some(values);
        self
    }

    /// Sets the column index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns whether this column has unique values.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns the permitted values, if the column is domain-restricted.
    pub fn get_domain(&self) -> Option<&[Value]> {
        self.domain.as_deref()
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}
