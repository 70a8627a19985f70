//! Row mapping: result rows to [`Record`]s.

use std::iter::FusedIterator;

use crate::error::DbResult;
use crate::value::{Record, Value};

/// Forward-only cursor over a statement's result set.
///
/// Each step decodes every column of the new row by its storage class
/// into a [`Record`] keyed by the statement's column names. Once the rows
/// run out (or a step fails) the cursor stays exhausted; it never restarts
/// the underlying statement.
pub struct RecordCursor<'stmt> {
    columns: Vec<String>,
    rows: Option<rusqlite::Rows<'stmt>>,
    current: Option<Record>,
}

impl<'stmt> RecordCursor<'stmt> {
    pub(crate) fn new(columns: Vec<String>, rows: rusqlite::Rows<'stmt>) -> Self {
        Self {
            columns,
            rows: Some(rows),
            current: None,
        }
    }

    pub(crate) fn exhausted(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: None,
            current: None,
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Advance one row. Returns `false` once the result set is exhausted.
    pub fn next_row(&mut self) -> DbResult<bool> {
        let step = match self.rows.as_mut() {
            Some(rows) => rows
                .next()
                .and_then(|row| row.map(|row| map_row(&self.columns, row)).transpose()),
            None => Ok(None),
        };

        match step {
            Ok(Some(record)) => {
                self.current = Some(record);
                Ok(true)
            }
            Ok(None) => {
                self.finish();
                Ok(false)
            }
            Err(e) => {
                self.finish();
                Err(e.into())
            }
        }
    }

    /// The row the cursor is positioned on.
    pub fn current_row(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// First column of the current row.
    pub fn current_value(&self) -> Option<&Value> {
        self.column_value(0)
    }

    /// Column `index` of the current row.
    pub fn column_value(&self, index: usize) -> Option<&Value> {
        self.current.as_ref().and_then(|r| r.get_index(index))
    }

    fn finish(&mut self) {
        // Dropping `Rows` resets the statement.
        self.rows = None;
        self.current = None;
    }
}

fn map_row(columns: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    columns
        .iter()
        .enumerate()
        .map(|(index, name)| -> rusqlite::Result<(String, Value)> {
            Ok((name.clone(), Value::from(row.get_ref(index)?)))
        })
        .collect()
}

impl Iterator for RecordCursor<'_> {
    type Item = DbResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_row() {
            Ok(true) => self.current.clone().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for RecordCursor<'_> {}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::{Database, Value, args};

    fn setup_db(rows: i64) -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.do_query(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL, data BLOB)",
            &[],
        )
        .unwrap();
        for i in 1..=rows {
            db.do_query(
                "INSERT INTO t (name, score, data) VALUES (?, ?, ?)",
                &args![format!("row{i}"), i as f64 / 2.0, vec![i as u8]],
            )
            .unwrap();
        }
        db
    }

    #[test]
    fn enumerates_exactly_n_records_in_order() {
        let mut db = setup_db(5);
        let mut stmt = db
            .prepare_query("SELECT id, name FROM t ORDER BY id", &[])
            .unwrap();
        let ids: Vec<i64> = stmt
            .records()
            .map(|r| r.unwrap().get("id").and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn stays_exhausted_after_last_row() {
        let mut db = setup_db(2);
        let mut stmt = db.prepare_query("SELECT name FROM t", &[]).unwrap();
        let mut cursor = stmt.records();
        assert!(cursor.next_row().unwrap());
        assert!(cursor.next_row().unwrap());
        assert!(!cursor.next_row().unwrap());
        assert!(!cursor.next_row().unwrap());
        assert!(cursor.current_row().is_none());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn decodes_columns_by_storage_class() {
        let mut db = setup_db(1);
        let mut stmt = db
            .prepare_query("SELECT id, name, score, data, NULL AS missing FROM t", &[])
            .unwrap();
        let mut cursor = stmt.records();
        assert!(cursor.next_row().unwrap());
        let row = cursor.current_row().unwrap();
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("name"), Some(&Value::Text("row1".into())));
        assert_eq!(row.get("score"), Some(&Value::Real(0.5)));
        assert_eq!(row.get("data"), Some(&Value::Blob(vec![1])));
        assert_eq!(row.get("missing"), Some(&Value::Null));
        assert_eq!(cursor.column_value(1), Some(&Value::Text("row1".into())));
    }

    #[test]
    fn invalid_utf8_text_reads_as_blob() {
        let mut db = setup_db(0);
        let v = db
            .value_from_query("SELECT CAST(x'ff' AS TEXT)", &[])
            .unwrap();
        assert_eq!(v, Some(Value::Blob(vec![0xff])));
    }

    #[test]
    fn record_keys_follow_select_order() {
        let mut db = setup_db(1);
        let mut stmt = db.prepare_query("SELECT name, id FROM t", &[]).unwrap();
        let mut cursor = stmt.records();
        assert_eq!(cursor.column_names(), ["name", "id"]);
        let row = cursor.next().unwrap().unwrap();
        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["name", "id"]);
    }

    #[test]
    fn current_value_reads_first_column() {
        let mut db = setup_db(3);
        let mut stmt = db.prepare_query("SELECT count(*) FROM t", &[]).unwrap();
        let mut cursor = stmt.records();
        assert!(cursor.next_row().unwrap());
        assert_eq!(cursor.current_value(), Some(&Value::Integer(3)));
    }

    #[test]
    fn empty_result_set_yields_nothing() {
        let mut db = setup_db(0);
        let mut stmt = db.prepare_query("SELECT * FROM t", &[]).unwrap();
        assert_eq!(stmt.records().count(), 0);
    }
}
