//! Connection management for the single backing SQLite file.
//!
//! A [`Database`] starts closed, opens lazily through [`Database::open`],
//! and owns at most one `rusqlite::Connection`. Statements prepared from it
//! borrow it mutably, so only one statement can be in flight at a time.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

/// Path SQLite interprets as a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

/// Owner of the one connection to a backing file.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Database {
    /// Create a closed handle for the database at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: None,
        }
    }

    /// Create a handle for `path` and open it.
    pub fn connect(path: impl AsRef<Path>) -> DbResult<Self> {
        let mut db = Self::new(path);
        db.open()?;
        Ok(db)
    }

    /// Open a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::connect(IN_MEMORY_PATH)
    }

    /// Version of the access layer.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the backing file, creating it if absent. Does nothing when the
    /// database is already open.
    pub fn open(&mut self) -> DbResult<()> {
        if self.conn.is_some() {
            debug!(path = %self.path.display(), "database already open");
            return Ok(());
        }

        info!(path = %self.path.display(), "opening database");
        let conn = Connection::open(&self.path).map_err(|e| self.unavailable(e))?;
        // A file that is not a database only fails once SQLite reads the
        // header, which the first pragma does.
        Self::apply_pragmas(&conn).map_err(|e| self.unavailable(e))?;

        self.conn = Some(conn);
        Ok(())
    }

    /// Release the connection. Safe to call on a closed database.
    pub fn close(&mut self) -> DbResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        info!(path = %self.path.display(), "closing database");
        conn.close().map_err(|(_, e)| {
            warn!(path = %self.path.display(), error = %e, "close reported an error");
            DbError::QueryExecutionFailed(e)
        })
    }

    /// Row id assigned by the most recent successful INSERT.
    pub fn last_insert_id(&self) -> DbResult<i64> {
        Ok(self.conn()?.last_insert_rowid())
    }

    /// The open connection, or [`DbError::NotOpen`].
    pub(crate) fn conn(&self) -> DbResult<&Connection> {
        self.conn.as_ref().ok_or(DbError::NotOpen)
    }

    fn unavailable(&self, err: rusqlite::Error) -> DbError {
        DbError::StorageUnavailable {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    // ── pragmas ──────────────────────────────────────────────────────

    fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
        // In-memory databases answer "memory" here.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;

        debug!(journal_mode = %mode, "database pragmas applied");
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
