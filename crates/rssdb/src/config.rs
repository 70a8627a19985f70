//! Store configuration.
//!
//! [`RssDbConfig`] names the backing file and the two tables and sets the
//! per-feed retention bound. Sensible defaults come from the [`Default`]
//! implementation; a builder-style API customises individual fields, and
//! [`RssDbConfig::load`] reads TOML (or JSON, by extension) from disk.
//! The configuration is fixed once a store has been opened with it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RssError, RssResult};

/// Items kept per feed when the configuration does not say otherwise.
pub const DEFAULT_MAX_ITEMS_PER_FEED: u32 = 50;

/// Backing file and schema settings for an [`RssDb`](crate::RssDb).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RssDbConfig {
    /// Path of the SQLite file. `:memory:` opens a private in-memory store.
    ///
    /// Default: **rssdb.db**.
    pub path: PathBuf,

    /// Name of the feeds table.
    ///
    /// Default: **feeds**.
    pub feeds_table: String,

    /// Name of the items table.
    ///
    /// Default: **items**.
    pub items_table: String,

    /// Retention bound enforced by `delete_old_items`.
    ///
    /// Default: **50**.
    pub max_items_per_feed: u32,
}

impl Default for RssDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rssdb.db"),
            feeds_table: "feeds".to_string(),
            items_table: "items".to_string(),
            max_items_per_feed: DEFAULT_MAX_ITEMS_PER_FEED,
        }
    }
}

impl RssDbConfig {
    /// Default configuration backed by the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Default configuration backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    pub fn with_feeds_table(mut self, name: impl Into<String>) -> Self {
        self.feeds_table = name.into();
        self
    }

    pub fn with_items_table(mut self, name: impl Into<String>) -> Self {
        self.items_table = name.into();
        self
    }

    pub fn with_max_items_per_feed(mut self, max: u32) -> Self {
        self.max_items_per_feed = max;
        self
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> RssResult<Self> {
        toml::from_str(content).map_err(|e| RssError::Config {
            reason: format!("failed to parse TOML config: {e}"),
        })
    }

    /// Load from a `.json` or TOML file.
    pub fn load(path: impl AsRef<Path>) -> RssResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RssError::Config {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|e| RssError::Config {
                reason: format!("failed to parse JSON config: {e}"),
            })?
        } else {
            Self::from_toml_str(&content)?
        };

        info!(path = %path.display(), "configuration loaded from file");
        Ok(config)
    }

    /// Reject configurations no store can be opened with.
    pub fn validate(&self) -> RssResult<()> {
        for (what, name) in [("feeds", &self.feeds_table), ("items", &self.items_table)] {
            if name.trim().is_empty() {
                return Err(RssError::Config {
                    reason: format!("{what} table name is empty"),
                });
            }
            if name.to_ascii_lowercase().starts_with("sqlite_") || name.starts_with('_') {
                return Err(RssError::Config {
                    reason: format!("{what} table name {name:?} is reserved"),
                });
            }
        }
        if self.feeds_table == self.items_table {
            return Err(RssError::Config {
                reason: "feeds and items must be different tables".to_string(),
            });
        }
        if self.max_items_per_feed == 0 {
            return Err(RssError::Config {
                reason: "max_items_per_feed must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
