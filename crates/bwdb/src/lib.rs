//! # bwdb
//!
//! A small record-oriented access layer over a single SQLite file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Table        (insert / update / get)    │
//! ├─────────────────────────────────────────┤
//! │  Query helpers (do / get / value)        │
//! ├──────────────────────┬──────────────────┤
//! │  PreparedStatement   │  RecordCursor     │
//! │  (typed binding)     │  (row → Record)   │
//! ├──────────────────────┴──────────────────┤
//! │  Database (one rusqlite connection)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Every statement borrows the [`Database`] mutably for as long as it is
//! alive, so at most one statement is ever in flight.
//!
//! ## Quick start
//!
//! ```
//! use bwdb::{args, Database, Record, Value};
//!
//! let mut db = Database::open_in_memory()?;
//! db.do_query("CREATE TABLE feeds (id INTEGER PRIMARY KEY, title TEXT)", &[])?;
//!
//! let id = db.table("feeds").insert_row(&Record::new().with("title", "A"))?;
//! let title = db.value_from_query("SELECT title FROM feeds WHERE id = ?", &args![id])?;
//! assert_eq!(title, Some(Value::Text("A".into())));
//! # Ok::<(), bwdb::DbError>(())
//! ```

pub mod db;
pub mod error;
pub mod migration;
pub mod query;
pub mod rows;
pub mod statement;
pub mod table;
pub mod value;

// ── re-exports ───────────────────────────────────────────────────────

pub use db::Database;
pub use error::{DbError, DbResult};
pub use migration::Migration;
pub use rows::RecordCursor;
pub use statement::PreparedStatement;
pub use table::{ID_COLUMN, RowId, Table, quote_ident};
pub use value::{Record, Value};
