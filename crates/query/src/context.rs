//! Execution configuration and per-query context.

use crate::planner::physical::BoundSubquery;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;
use roster_core::{Catalog, Row, Value};

/// Knobs for query execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Cache subquery results per correlation key for the duration of one
    /// execution.
    memoize_subqueries: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            memoize_subqueries: true,
        }
    }
}

impl ExecutionConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether subquery results are memoized.
    pub fn memoize_subqueries(mut self, enabled: bool) -> Self {
        self.memoize_subqueries = enabled;
        self
    }

    /// Returns whether subquery results are memoized.
    #[inline]
    pub fn is_memoizing(&self) -> bool {
        self.memoize_subqueries
    }
}

/// Memo key: subquery id plus the correlation values it ran with.
type SubqueryKey = (usize, Vec<Value>);

/// Counters collected during one execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Subquery results served from the memo cache.
    pub subquery_hits: usize,
    /// Subquery plans actually executed.
    pub subquery_runs: usize,
}

/// State owned by one query execution.
///
/// Holds the catalog being read and the subquery memo cache. A context is
/// created for every execution and dropped with it, so memoized results
/// never leak between runs.
pub struct ExecutionContext<'a> {
    catalog: &'a Catalog,
    config: ExecutionConfig,
    subquery_cache: RefCell<HashMap<SubqueryKey, Rc<[Row]>>>,
    stats: RefCell<ExecutionStats>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context over the given catalog.
    pub fn new(catalog: &'a Catalog, config: ExecutionConfig) -> Self {
        Self {
            catalog,
            config,
            subquery_cache: RefCell::new(HashMap::new()),
            stats: RefCell::new(ExecutionStats::default()),
        }
    }

    /// Returns the catalog.
    #[inline]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Returns a snapshot of the execution counters.
    pub fn stats(&self) -> ExecutionStats {
        *self.stats.borrow()
    }

    /// Looks up a memoized subquery result.
    pub(crate) fn cached_subquery(&self, subquery: &BoundSubquery, params: &[Value]) -> Option<Rc<[Row]>> {
        if !self.config.memoize_subqueries {
            return None;
        }
        let key = (subquery.id, params.to_vec());
        let hit = self.subquery_cache.borrow().get(&key).cloned();
        if hit.is_some() {
            self.stats.borrow_mut().subquery_hits += 1;
        }
        hit
    }

    /// Records a subquery result.
    pub(crate) fn store_subquery(&self, subquery: &BoundSubquery, params: Vec<Value>, rows: Rc<[Row]>) {
        self.stats.borrow_mut().subquery_runs += 1;
        if self.config.memoize_subqueries {
            self.subquery_cache
                .borrow_mut()
                .insert((subquery.id, params), rows);
        }
    }
}
