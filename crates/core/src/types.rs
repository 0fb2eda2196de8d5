//! Data type definitions for Roster.
//!
//! This module defines the value tags a column or an expression result can carry.

use core::fmt;

/// Supported data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Truth value produced by predicates. Never stored in a catalog column.
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point number
    Real,
    /// UTF-8 string
    Text,
    /// ISO-8601 calendar date
    Date,
}

impl DataType {
    /// Returns whether this type takes part in integer/real promotion.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Real)
    }

    /// Returns whether a catalog column may be declared with this type.
    pub fn is_storable(&self) -> bool {
        !matches!(self, DataType::Boolean)
    }

    /// Returns the common type two operands are promoted to for arithmetic,
    /// or None if the pair is not numeric.
    pub fn numeric_promotion(self, other: DataType) -> Option<DataType> {
        match (self, other) {
            (DataType::Integer, DataType::Integer) => Some(DataType::Integer),
            (a, b) if a.is_numeric() && b.is_numeric() => Some(DataType::Real),
            _ => None,
        }
    }

    /// Returns the display name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Real => "real",
            DataType::Text => "text",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
