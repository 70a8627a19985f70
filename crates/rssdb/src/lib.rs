//! # rssdb
//!
//! An RSS feed cache on top of [`bwdb`]: a feeds table, an items table
//! whose rows point at their feed, and a retention bound on items per feed.
//!
//! ## Quick start
//!
//! ```
//! use bwdb::Record;
//! use rssdb::{RssDb, RssDbConfig, columns};
//!
//! let mut store = RssDb::open(RssDbConfig::in_memory().with_max_items_per_feed(2))?;
//! let feed = store.add_feed(
//!     &Record::new().with(columns::TITLE, "A").with(columns::URL, "http://a"),
//! )?;
//! store.refresh_feed_ids()?;
//!
//! for n in 0..3 {
//!     store.add_item(&Record::new().with(columns::FEED_ID, feed).with(columns::TITLE, n))?;
//! }
//! assert_eq!(store.delete_old_items(feed)?, 1);
//! assert_eq!(store.count_items(feed)?, 2);
//! # Ok::<(), rssdb::RssError>(())
//! ```

pub mod config;
pub mod error;
pub mod schema;
pub mod shared;
pub mod store;

// ── re-exports ───────────────────────────────────────────────────────

pub use config::{DEFAULT_MAX_ITEMS_PER_FEED, RssDbConfig};
pub use error::{RssError, RssResult};
pub use schema::columns;
pub use shared::SharedRssDb;
pub use store::RssDb;
