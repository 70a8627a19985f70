//! Record-shaped CRUD against a single named table.
//!
//! Record keys are used as column names. Rows are addressed by the `id`
//! column, which tables are expected to declare as `INTEGER PRIMARY KEY`
//! so that it aliases SQLite's rowid.

use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::value::{Record, Value};

/// Column every CRUD table is keyed by.
pub const ID_COLUMN: &str = "id";

/// Store-assigned row identifier.
pub type RowId = i64;

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// CRUD handle scoped to one table.
pub struct Table<'db> {
    db: &'db mut Database,
    name: String,
}

impl Database {
    /// CRUD handle for `name`.
    pub fn table(&mut self, name: &str) -> Table<'_> {
        Table {
            db: self,
            name: name.to_string(),
        }
    }
}

impl Table<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert `record` and return the new row's id.
    #[instrument(skip(self, record), fields(table = %self.name))]
    pub fn insert_row(&mut self, record: &Record) -> DbResult<RowId> {
        let table = quote_ident(&self.name);
        let sql = if record.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let columns: Vec<String> = record.columns().map(quote_ident).collect();
            let placeholders = vec!["?"; record.len()].join(", ");
            format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders})",
                columns.join(", ")
            )
        };
        let args: Vec<Value> = record.values().cloned().collect();

        let inserted = self
            .db
            .do_query(&sql, &args)
            .and_then(|changed| {
                if changed == 1 {
                    self.db.last_insert_id()
                } else {
                    Err(DbError::InvalidArgument(format!(
                        "insert changed {changed} rows"
                    )))
                }
            })
            .map_err(|e| DbError::InsertFailed {
                table: self.name.clone(),
                message: e.to_string(),
            })?;

        debug!(row_id = inserted, "row inserted");
        Ok(inserted)
    }

    /// Set every column in `record` on row `id`. A missing row, or an
    /// empty record, leaves the table unchanged.
    #[instrument(skip(self, record), fields(table = %self.name))]
    pub fn update_row(&mut self, record: &Record, id: RowId) -> DbResult<()> {
        if record.is_empty() {
            debug!("empty record, nothing to update");
            return Ok(());
        }
        let assignments: Vec<String> = record
            .columns()
            .map(|c| format!("{} = ?", quote_ident(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {ID_COLUMN} = ?",
            quote_ident(&self.name),
            assignments.join(", ")
        );
        let mut args: Vec<Value> = record.values().cloned().collect();
        args.push(Value::Integer(id));

        let changed = self.db.do_query(&sql, &args)?;
        debug!(changed, "row updated");
        Ok(())
    }

    /// Delete row `id`. Deleting a missing row is not an error.
    #[instrument(skip(self), fields(table = %self.name))]
    pub fn delete_row(&mut self, id: RowId) -> DbResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {ID_COLUMN} = ?",
            quote_ident(&self.name)
        );
        let changed = self.db.do_query(&sql, &[Value::Integer(id)])?;
        debug!(changed, "row deleted");
        Ok(())
    }

    /// Fetch row `id`, or `None` if there is no such row.
    pub fn get_row(&mut self, id: RowId) -> DbResult<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {ID_COLUMN} = ?",
            quote_ident(&self.name)
        );
        self.db.prepare_query(&sql, &[Value::Integer(id)])?.row()
    }

    /// Number of rows in the table.
    pub fn count_rows(&mut self) -> DbResult<i64> {
        let sql = format!("SELECT count(*) FROM {}", quote_ident(&self.name));
        let count = self.db.value_from_query(&sql, &[])?;
        Ok(count.as_ref().and_then(Value::as_i64).unwrap_or(0))
    }

    /// Indexed read; same as [`get_row`](Self::get_row).
    pub fn get(&mut self, id: RowId) -> DbResult<Option<Record>> {
        self.get_row(id)
    }

    /// Indexed write; same as [`update_row`](Self::update_row). Never
    /// creates a row.
    pub fn set(&mut self, id: RowId, record: &Record) -> DbResult<()> {
        self.update_row(record, id)
    }
}

// ── tests ────────────────────────────────────────────────────────────
