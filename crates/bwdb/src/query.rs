//! One-shot query helpers on [`Database`].
//!
//! Each helper prepares, binds, runs, and drops its statement before
//! returning, so the single-statement slot is free again afterwards.

use tracing::debug;

use crate::db::Database;
use crate::error::DbResult;
use crate::value::{Record, Value};

impl Database {
    /// Run a statement that returns no rows (DDL or DML) and return the
    /// number of rows it changed.
    pub fn do_query(&mut self, sql: &str, args: &[Value]) -> DbResult<usize> {
        let changed = self.prepare_query(sql, args)?.execute()?;
        debug!(sql, changed, "query executed");
        Ok(changed)
    }

    /// Run a SELECT and collect every row.
    ///
    /// Use [`prepare_query`](Self::prepare_query) to walk large result sets
    /// lazily instead.
    pub fn get_query(&mut self, sql: &str, args: &[Value]) -> DbResult<Vec<Record>> {
        let mut stmt = self.prepare_query(sql, args)?;
        let records = stmt.records().collect::<DbResult<Vec<_>>>()?;
        Ok(records)
    }

    /// First column of the first row, or `None` for an empty result.
    pub fn value_from_query(&mut self, sql: &str, args: &[Value]) -> DbResult<Option<Value>> {
        self.prepare_query(sql, args)?.value()
    }
}

// ── tests ────────────────────────────────────────────────────────────
