//! Error types for Roster.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use core::fmt;

/// Result type alias for Roster core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for data-model and catalog operations.
#[derive(Clone, Debug)]
pub enum Error {
    /// A value does not match its column's declared type.
    TypeMismatch {
        column: String,
        expected: DataType,
        got: DataType,
    },
    /// Two operand types cannot be combined by an operation.
    IncompatibleTypes {
        operation: &'static str,
        left: Option<DataType>,
        right: Option<DataType>,
    },
    /// A literal could not be parsed as the given type.
    InvalidValue {
        data_type: DataType,
        input: String,
    },
    /// Null constraint violation.
    NullConstraint {
        column: String,
    },
    /// Unique constraint violation.
    UniqueConstraint {
        column: String,
        value: Value,
    },
    /// A value lies outside the column's permitted domain.
    DomainViolation {
        column: String,
        value: Value,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Column not found.
    ColumnNotFound {
        table: String,
        column: String,
    },
    /// Table not found.
    TableNotFound {
        name: String,
    },
}

fn type_name(t: &Option<DataType>) -> &'static str {
    t.as_ref().map(DataType::name).unwrap_or("null")
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch {
                column,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Type mismatch on column {}: expected {}, got {}",
                    column, expected, got
                )
            }
            Error::IncompatibleTypes {
                operation,
                left,
                right,
            } => {
                write!(
                    f,
                    "Cannot {} {} with {}",
                    operation,
                    type_name(left),
                    type_name(right)
                )
            }
            Error::InvalidValue { data_type, input } => {
                write!(f, "Invalid {} value: {}", data_type, input)
            }
            Error::NullConstraint { column } => {
                write!(f, "Null constraint violation on column: {}", column)
            }
            Error::UniqueConstraint { column, value } => {
                write!(
                    f,
                    "Unique constraint violation on column {}: {}",
                    column, value
                )
            }
            Error::DomainViolation { column, value } => {
                write!(f, "Value {} is outside the domain of column {}", value, column)
            }
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
            Error::ColumnNotFound { table, column } => {
                write!(f, "Column {} not found in table {}", column, table)
            }
            Error::TableNotFound { name } => {
                write!(f, "Table not found: {}", name)
            }
        }
    }
}

impl Error {
    /// Creates a column type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch {
            column: column.into(),
            expected,
            got,
        }
    }

    /// Creates an incompatible operand types error.
    pub fn incompatible_types(
        operation: &'static str,
        left: Option<DataType>,
        right: Option<DataType>,
    ) -> Self {
        Error::IncompatibleTypes {
            operation,
            left,
            right,
        }
    }

    /// Creates an invalid literal error.
    pub fn invalid_value(data_type: DataType, input: impl Into<String>) -> Self {
        Error::InvalidValue {
            data_type,
            input: input.into(),
        }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates a unique constraint error.
    pub fn unique_constraint(column: impl Into<String>, value: Value) -> Self {
        Error::UniqueConstraint {
            column: column.into(),
            value,
        }
    }

    /// Creates a domain violation error.
    pub fn domain_violation(column: impl Into<String>, value: Value) -> Self {
        Error::DomainViolation {
            column: column.into(),
            value,
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }
}
