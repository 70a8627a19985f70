//! The feed/item store.
//!
//! [`RssDb`] owns one [`Database`], the two configured tables, and a cached
//! list of feed ids. Items are never pruned implicitly: callers run
//! [`RssDb::delete_old_items`] when they want the retention bound applied.

use std::path::Path;

use bwdb::{Database, Record, RowId, Value, args, migration, quote_ident};
use tracing::{debug, info, instrument};

use crate::config::RssDbConfig;
use crate::error::{RssError, RssResult};
use crate::schema::{self, columns};

/// Feed cache with bounded items per feed.
#[derive(Debug)]
pub struct RssDb {
    db: Database,
    config: RssDbConfig,
    feed_ids: Vec<RowId>,
}

impl RssDb {
    /// Open (or create) the store described by `config`, apply pending
    /// migrations, and load the feed id list.
    pub fn open(config: RssDbConfig) -> RssResult<Self> {
        config.validate()?;

        let db = Database::connect(&config.path)?;
        migration::run_all(&db, &schema::migrations(&config))?;

        let mut store = Self {
            db,
            config,
            feed_ids: Vec::new(),
        };
        store.refresh_feed_ids()?;
        info!(
            path = %store.path().display(),
            feeds = store.feed_ids.len(),
            max_items_per_feed = store.config.max_items_per_feed,
            "feed store opened"
        );
        Ok(store)
    }

    /// Version of the feed store.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    pub fn config(&self) -> &RssDbConfig {
        &self.config
    }

    pub fn max_items_per_feed(&self) -> u32 {
        self.config.max_items_per_feed
    }

    /// The underlying access layer, for ad-hoc queries.
    pub fn database(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn is_open(&self) -> bool {
        self.db.is_open()
    }

    pub fn close(&mut self) -> RssResult<()> {
        Ok(self.db.close()?)
    }

    // ── feeds ────────────────────────────────────────────────────────

    /// Insert a feed. The cached id list is not updated; call
    /// [`refresh_feed_ids`](Self::refresh_feed_ids) afterwards.
    #[instrument(skip(self, feed))]
    pub fn add_feed(&mut self, feed: &Record) -> RssResult<RowId> {
        let id = self.db.table(&self.config.feeds_table).insert_row(feed)?;
        debug!(feed_id = id, "feed added");
        Ok(id)
    }

    /// Delete a feed row. Its items are left in place.
    #[instrument(skip(self))]
    pub fn delete_feed(&mut self, id: RowId) -> RssResult<()> {
        Ok(self.db.table(&self.config.feeds_table).delete_row(id)?)
    }

    #[instrument(skip(self, feed))]
    pub fn update_feed(&mut self, feed: &Record, id: RowId) -> RssResult<()> {
        Ok(self.db.table(&self.config.feeds_table).update_row(feed, id)?)
    }

    pub fn get_feed(&mut self, id: RowId) -> RssResult<Option<Record>> {
        Ok(self.db.table(&self.config.feeds_table).get_row(id)?)
    }

    pub fn count_feeds(&mut self) -> RssResult<i64> {
        Ok(self.db.table(&self.config.feeds_table).count_rows()?)
    }

    /// Feed ids as of the last refresh.
    pub fn get_feed_ids(&self) -> &[RowId] {
        &self.feed_ids
    }

    /// Reload the feed id list from the feeds table, in id order.
    pub fn refresh_feed_ids(&mut self) -> RssResult<&[RowId]> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            columns::ID,
            quote_ident(&self.config.feeds_table),
            columns::ID
        );
        self.feed_ids = self.collect_ids(&sql, &[])?;
        debug!(feeds = self.feed_ids.len(), "feed id list refreshed");
        Ok(&self.feed_ids)
    }

    // ── items ────────────────────────────────────────────────────────

    /// Insert an item. It must carry the integer id of an existing feed
    /// in its `feed_id` column.
    #[instrument(skip(self, item))]
    pub fn add_item(&mut self, item: &Record) -> RssResult<RowId> {
        let feed_id = item
            .get(columns::FEED_ID)
            .and_then(Value::as_i64)
            .ok_or(RssError::MissingFeedReference)?;
        if self.get_feed(feed_id)?.is_none() {
            return Err(RssError::UnknownFeed { feed_id });
        }

        let id = self.db.table(&self.config.items_table).insert_row(item)?;
        debug!(feed_id, item_id = id, "item added");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn delete_item(&mut self, id: RowId) -> RssResult<()> {
        Ok(self.db.table(&self.config.items_table).delete_row(id)?)
    }

    pub fn get_item(&mut self, id: RowId) -> RssResult<Option<Record>> {
        Ok(self.db.table(&self.config.items_table).get_row(id)?)
    }

    /// Ids of the items belonging to `feed_id`, oldest first.
    pub fn get_item_ids(&mut self, feed_id: RowId) -> RssResult<Vec<RowId>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY {}",
            columns::ID,
            quote_ident(&self.config.items_table),
            columns::FEED_ID,
            columns::ID
        );
        self.collect_ids(&sql, &args![feed_id])
    }

    pub fn count_items(&mut self, feed_id: RowId) -> RssResult<i64> {
        let sql = format!(
            "SELECT count(*) FROM {} WHERE {} = ?",
            quote_ident(&self.config.items_table),
            columns::FEED_ID
        );
        let count = self.db.value_from_query(&sql, &args![feed_id])?;
        Ok(count.as_ref().and_then(Value::as_i64).unwrap_or(0))
    }

    /// Delete the oldest items of `feed_id` until no more than
    /// `max_items_per_feed` remain. Returns the number of items deleted.
    #[instrument(skip(self))]
    pub fn delete_old_items(&mut self, feed_id: RowId) -> RssResult<usize> {
        let max = i64::from(self.config.max_items_per_feed);
        let count = self.count_items(feed_id)?;
        if count <= max {
            debug!(count, max, "feed within retention bound");
            return Ok(0);
        }

        let excess = count - max;
        let items = quote_ident(&self.config.items_table);
        let sql = format!(
            "DELETE FROM {items} WHERE {id} IN (\
                SELECT {id} FROM {items} WHERE {feed} = ? ORDER BY {id} ASC LIMIT ?\
             )",
            id = columns::ID,
            feed = columns::FEED_ID,
        );
        let deleted = self.db.do_query(&sql, &args![feed_id, excess])?;
        info!(count, deleted, max, "old items pruned");
        Ok(deleted)
    }

    /// Create the `(feed_id, id)` index on the items table if it is missing.
    #[instrument(skip(self))]
    pub fn add_new_index(&mut self) -> RssResult<()> {
        self.db.do_query(&schema::item_index_sql(&self.config), &[])?;
        debug!(table = %self.config.items_table, "item index ensured");
        Ok(())
    }

    // ── internals ────────────────────────────────────────────────────

    /// Walk a single-column id query row by row.
    fn collect_ids(&mut self, sql: &str, args: &[Value]) -> RssResult<Vec<RowId>> {
        let mut stmt = self.db.prepare_query(sql, args)?;
        let mut cursor = stmt.records();
        let mut ids = Vec::new();
        while cursor.next_row()? {
            if let Some(id) = cursor.current_value().and_then(Value::as_i64) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

// ── tests ────────────────────────────────────────────────────────────
