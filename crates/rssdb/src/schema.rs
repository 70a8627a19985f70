//! Feed and item table layouts.
//!
//! Table names come from [`RssDbConfig`], so the migrations are built per
//! configuration rather than stored as static SQL.

use bwdb::{Migration, quote_ident};

use crate::config::RssDbConfig;

/// Column names shared by the feeds and items tables.
pub mod columns {
    /// Row id of a feed or item.
    pub const ID: &str = bwdb::ID_COLUMN;
    /// Owning feed of an item.
    pub const FEED_ID: &str = "feed_id";
    pub const URL: &str = "url";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const PUBDATE: &str = "pubdate";
}

/// Migrations creating the feeds and items tables named in `config`.
pub fn migrations(config: &RssDbConfig) -> Vec<Migration> {
    let feeds = quote_ident(&config.feeds_table);
    let items = quote_ident(&config.items_table);
    vec![Migration {
        version: 1,
        description: "initial schema: feeds and items",
        sql: format!(
            "CREATE TABLE {feeds} (
                id          INTEGER PRIMARY KEY,
                url         TEXT,
                title       TEXT,
                description TEXT,
                pubdate     TEXT
            );

            CREATE TABLE {items} (
                id          INTEGER PRIMARY KEY,
                feed_id     INTEGER NOT NULL,
                url         TEXT,
                title       TEXT,
                description TEXT,
                pubdate     TEXT
            );"
        ),
    }]
}

/// Statement creating the index behind per-feed item lookups and pruning.
pub fn item_index_sql(config: &RssDbConfig) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({}, {})",
        quote_ident(&format!("idx_{}_feed", config.items_table)),
        quote_ident(&config.items_table),
        columns::FEED_ID,
        columns::ID,
    )
}
