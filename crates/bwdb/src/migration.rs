//! Schema migration runner.
//!
//! Callers supply their migrations as an ordered slice. The highest applied
//! version is tracked in a `_migrations` table, so running the same list
//! again only applies what is new.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{DbError, DbResult};

/// A single migration definition.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Monotonically increasing version number (1, 2, 3, ...).
    pub version: u32,
    /// Human-readable description.
    pub description: &'static str,
    /// Raw SQL to execute. May contain multiple statements separated by `;`.
    pub sql: String,
}

// ── public API ───────────────────────────────────────────────────────

/// Apply every migration in `migrations` newer than the recorded version.
pub fn run_all(db: &Database, migrations: &[Migration]) -> DbResult<()> {
    if let Some(window) = migrations.windows(2).find(|w| w[1].version <= w[0].version) {
        return Err(DbError::InvalidArgument(format!(
            "migration versions must be strictly increasing: {} then {}",
            window[0].version, window[1].version
        )));
    }

    let conn = db.conn()?;
    ensure_migrations_table(conn)?;

    let current = read_version(conn)?;
    let pending: Vec<&Migration> = migrations.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        debug!(current_version = current, "database schema is up to date");
        return Ok(());
    }

    info!(
        current_version = current,
        pending = pending.len(),
        "running pending migrations"
    );

    for migration in pending {
        apply(conn, migration)?;
    }

    info!(
        new_version = migrations.last().map(|m| m.version).unwrap_or(0),
        "all migrations applied"
    );
    Ok(())
}

/// Return the latest applied migration version, or 0 if none.
pub fn current_version(db: &Database) -> DbResult<u32> {
    let conn = db.conn()?;
    ensure_migrations_table(conn)?;
    read_version(conn)
}

// ── internals ────────────────────────────────────────────────────────

impl Migration {
    fn failed(&self, stage: &str, err: rusqlite::Error) -> DbError {
        DbError::Migration {
            version: self.version,
            message: format!("{stage}: {err}"),
        }
    }
}

/// Errors touching `_migrations` itself belong to no migration.
fn bookkeeping_failed(stage: &str, err: rusqlite::Error) -> DbError {
    DbError::Migration {
        version: 0,
        message: format!("{stage}: {err}"),
    }
}

fn read_version(conn: &Connection) -> DbResult<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
        row.get(0)
    })
    .map_err(|e| bookkeeping_failed("reading schema version", e))
}

fn ensure_migrations_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version     INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  INTEGER NOT NULL
        );",
    )
    .map_err(|e| bookkeeping_failed("creating _migrations", e))
}

/// Run one migration and record it, both inside a single immediate
/// transaction. Dropping the transaction uncommitted rolls it back.
fn apply(conn: &Connection, migration: &Migration) -> DbResult<()> {
    info!(
        version = migration.version,
        description = migration.description,
        "applying migration"
    );

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| migration.failed("begin", e))?;

    let applied = tx.execute_batch(&migration.sql).and_then(|()| {
        tx.execute(
            "INSERT INTO _migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                migration.description,
                chrono::Utc::now().timestamp()
            ],
        )
    });
    if let Err(e) = applied {
        warn!(version = migration.version, error = %e, "migration failed, rolling back");
        return Err(migration.failed("apply", e));
    }

    tx.commit().map_err(|e| migration.failed("commit", e))?;
    info!(version = migration.version, "migration applied");
    Ok(())
}

// ── tests ────────────────────────────────────────────────────────────
