//! Statement binding.
//!
//! A query template is compiled once and its positional placeholders are
//! filled from an ordered `&[Value]`. Each argument binds according to its
//! own variant, so the SQL type of every slot is decided at the call site
//! rather than by a schema.

use tracing::debug;

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::rows::RecordCursor;
use crate::value::{Record, Value};

/// A compiled query with all placeholders bound.
///
/// It borrows its [`Database`] mutably, so no other query can start until
/// it is dropped. It runs at most once: after [`records`](Self::records)
/// has been called, later calls return an exhausted cursor.
pub struct PreparedStatement<'db> {
    conn: &'db rusqlite::Connection,
    stmt: rusqlite::Statement<'db>,
    started: bool,
}

impl Database {
    /// Compile `sql` and bind `args` to its placeholders in order.
    ///
    /// Fails with [`DbError::ArityMismatch`] unless there is exactly one
    /// argument per placeholder.
    pub fn prepare_query(&mut self, sql: &str, args: &[Value]) -> DbResult<PreparedStatement<'_>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        bind_all(&mut stmt, args)?;
        debug!(sql, args = args.len(), "statement prepared");
        Ok(PreparedStatement {
            conn,
            stmt,
            started: false,
        })
    }
}

fn bind_all(stmt: &mut rusqlite::Statement<'_>, args: &[Value]) -> DbResult<()> {
    let expected = stmt.parameter_count();
    if expected != args.len() {
        return Err(DbError::ArityMismatch {
            expected,
            given: args.len(),
        });
    }
    for (index, arg) in args.iter().enumerate() {
        stmt.raw_bind_parameter(index + 1, arg)?;
    }
    Ok(())
}

impl<'db> PreparedStatement<'db> {
    pub fn column_names(&self) -> Vec<&str> {
        self.stmt.column_names()
    }

    pub fn parameter_count(&self) -> usize {
        self.stmt.parameter_count()
    }

    /// Run a statement that returns no rows and report how many rows it
    /// changed. DDL and other statements that touch no rows report 0.
    pub fn execute(mut self) -> DbResult<usize> {
        // `changes()` is left over from the last DML statement unless this
        // one modified rows, which moves `total_changes()`.
        let before = self.conn.total_changes();
        let changed = self.stmt.raw_execute()?;
        if self.conn.total_changes() == before {
            return Ok(0);
        }
        Ok(changed)
    }

    /// Lazy, forward-only cursor over the result rows.
    pub fn records(&mut self) -> RecordCursor<'_> {
        let columns = self
            .stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        if self.started {
            return RecordCursor::exhausted(columns);
        }
        self.started = true;
        RecordCursor::new(columns, self.stmt.raw_query())
    }

    /// First row of the result, if any.
    pub fn row(&mut self) -> DbResult<Option<Record>> {
        let mut cursor = self.records();
        if !cursor.next_row()? {
            return Ok(None);
        }
        Ok(cursor.current_row().cloned())
    }

    /// First column of the first row, if any.
    pub fn value(&mut self) -> DbResult<Option<Value>> {
        let mut cursor = self.records();
        if !cursor.next_row()? {
            return Ok(None);
        }
        Ok(cursor.current_value().cloned())
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    fn setup_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.do_query(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL, data BLOB, note TEXT)",
            &[],
        )
        .unwrap();
        db
    }

    #[test]
    fn too_few_arguments_is_arity_mismatch() {
        let mut db = setup_db();
        let err = db
            .prepare_query("SELECT * FROM t WHERE id = ? AND name = ?", &args![1])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DbError::ArityMismatch {
                expected: 2,
                given: 1
            }
        ));
    }

    #[test]
    fn too_many_arguments_is_arity_mismatch() {
        let mut db = setup_db();
        let err = db
            .prepare_query("SELECT * FROM t", &args![1, "extra"])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DbError::ArityMismatch {
                expected: 0,
                given: 2
            }
        ));
    }

    #[test]
    fn each_argument_binds_by_its_own_type() {
        let mut db = setup_db();
        db.do_query(
            "INSERT INTO t (name, score, data, note) VALUES (?, ?, ?, ?)",
            &args!["alpha", 2.5, vec![0xde_u8, 0xad], Value::Null],
        )
        .unwrap();

        let row = db
            .prepare_query(
                "SELECT typeof(name), typeof(score), typeof(data), typeof(note) FROM t",
                &[],
            )
            .unwrap()
            .row()
            .unwrap()
            .unwrap();
        let types: Vec<&str> = row.values().filter_map(Value::as_str).collect();
        assert_eq!(types, vec!["text", "real", "blob", "null"]);
    }

    #[test]
    fn null_argument_reads_back_as_null() {
        let mut db = setup_db();
        db.do_query(
            "INSERT INTO t (name, note) VALUES (?, ?)",
            &args!["n", None::<String>],
        )
        .unwrap();
        let note = db.value_from_query("SELECT note FROM t", &[]).unwrap();
        assert_eq!(note, Some(Value::Null));
    }

    #[test]
    fn malformed_sql_surfaces_sqlite_message() {
        let mut db = setup_db();
        let err = db.prepare_query("SELEC nonsense", &[]).err().unwrap();
        match err {
            DbError::QueryExecutionFailed(e) => assert!(e.to_string().contains("syntax")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn closed_database_cannot_prepare() {
        let mut db = setup_db();
        db.close().unwrap();
        let err = db.prepare_query("SELECT 1", &[]).err().unwrap();
        assert!(matches!(err, DbError::NotOpen));
    }

    #[test]
    fn records_is_not_restartable() {
        let mut db = setup_db();
        for name in ["a", "b"] {
            db.do_query("INSERT INTO t (name) VALUES (?)", &args![name])
                .unwrap();
        }
        let mut stmt = db.prepare_query("SELECT name FROM t", &[]).unwrap();
        assert_eq!(stmt.records().count(), 2);
        assert_eq!(stmt.records().count(), 0);
    }
}
