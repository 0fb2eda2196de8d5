//! Roster Core - value, schema and catalog types for the Roster query engine.
//!
//! This crate provides the foundational types shared by the planner and the
//! executor:
//!
//! - `DataType`: Value tags (Boolean, Integer, Real, Text, Date)
//! - `Value`: Scalars with SQL comparison semantics and an explicit null
//! - `Row`: An immutable tuple of values
//! - `schema`: Column and table definitions, plus the built-in relations
//! - `Catalog`: The read-only set of relations a query runs against
//! - `Error`: Error types for data-model and catalog operations
//!
//! # Example
//!
//! ```rust
//! use roster_core::{Catalog, Row, Value};
//!
//! let regions = vec![Row::new(vec![
//!     Value::from("Oregon"),
//!     Value::from("OR"),
//!     Value::from("West"),
//!     Value::from("Pacific"),
//! ])];
//!
//! let catalog = Catalog::with_builtin(vec![], regions).unwrap();
//! let relation = catalog.relation("regions").unwrap();
//!
//! assert_eq!(relation.len(), 1);
//! assert_eq!(relation.rows()[0].get(1), Some(&Value::from("OR")));
//! ```

#![no_std]

extern crate alloc;

pub mod catalog;
mod error;
pub mod pattern_match;
mod row;
pub mod schema;
mod types;
mod value;

pub use catalog::{Catalog, CatalogBuilder, Relation};
pub use chrono::NaiveDate;
pub use error::{Error, Result};
pub use row::Row;
pub use types::DataType;
pub use value::Value;
