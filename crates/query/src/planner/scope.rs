//! Name resolution scopes.

use crate::ast::ColumnRef;
use crate::executor::{ExecutionError, ExecutionResult};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use roster_core::schema::Table;
use roster_core::DataType;

/// A column visible to expressions at some point of a plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeColumn {
    /// Relation alias the column is reachable through, if any.
    pub qualifier: Option<String>,
    pub name: String,
    /// Statically inferred type; `None` when only null is known.
    pub data_type: Option<DataType>,
}

impl ScopeColumn {
    pub fn new(qualifier: Option<String>, name: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self {
            qualifier,
            name: name.into(),
            data_type,
        }
    }

    fn matches(&self, col: &ColumnRef) -> bool {
        self.name == col.column
            && match &col.qualifier {
                Some(q) => self.qualifier.as_deref() == Some(q.as_str()),
                None => true,
            }
    }
}

/// Ordered list of the columns a plan node produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    columns: Vec<ScopeColumn>,
}

impl Scope {
    pub fn new(columns: Vec<ScopeColumn>) -> Self {
        Self { columns }
    }

    /// The columns of a relation, all reachable through `qualifier`.
    pub fn from_table(table: &Table, qualifier: &str) -> Self {
        let columns = table
            .columns()
            .iter()
            .map(|c| ScopeColumn::new(Some(qualifier.to_string()), c.name(), Some(c.data_type())))
            .collect();
        Self { columns }
    }

    /// Concatenates two scopes for a join. Each qualifier may be bound by
    /// one side only.
    pub fn join(left: Scope, right: Scope) -> ExecutionResult<Self> {
        for alias in right.qualifiers() {
            if left.qualifiers().any(|q| q == alias) {
                return Err(ExecutionError::DuplicateAlias(alias.to_string()));
            }
        }
        let mut columns = left.columns;
        columns.extend(right.columns);
        Ok(Self { columns })
    }

    fn qualifiers(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        for q in self.columns.iter().filter_map(|c| c.qualifier.as_deref()) {
            if !seen.contains(&q) {
                seen.push(q);
            }
        }
        seen.into_iter()
    }

    /// Resolves a column reference to its position.
    pub fn resolve(&self, col: &ColumnRef) -> ExecutionResult<usize> {
        let mut found = None;
        for (i, c) in self.columns.iter().enumerate() {
            if c.matches(col) {
                if found.is_some() {
                    return Err(ExecutionError::AmbiguousColumn(col.normalized_name()));
                }
                found = Some(i);
            }
        }

        match (found, &col.qualifier) {
            (Some(i), _) => Ok(i),
            (None, Some(q)) if !self.qualifiers().any(|known| known == q) => {
                Err(ExecutionError::AliasNotFound(q.clone()))
            }
            (None, _) => Err(ExecutionError::ColumnNotFound {
                qualifier: col.qualifier.clone(),
                column: col.column.clone(),
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn columns(&self) -> &[ScopeColumn] {
        &self.columns
    }

    pub fn get(&self, index: usize) -> Option<&ScopeColumn> {
        self.columns.get(index)
    }
}
