//! Schema module for Roster.
//!
//! This module contains relation schema definitions: columns, tables and the
//! two built-in relations.

pub mod builtin;
mod column;
mod table;

pub use column::Column;
pub use table::{Table, TableBuilder};
