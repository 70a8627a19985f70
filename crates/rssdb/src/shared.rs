//! Thread-safe handle to an [`RssDb`].
//!
//! The store itself is synchronous and single-connection. [`SharedRssDb`]
//! puts the whole store (connection and statement state together) behind
//! one `Arc<Mutex<>>` and runs each call on the blocking pool via
//! `tokio::task::spawn_blocking`, so async tasks on any thread can share it.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::RssDbConfig;
use crate::error::{RssError, RssResult};
use crate::store::RssDb;

/// Cloneable, `Send + Sync` handle to one [`RssDb`].
#[derive(Clone)]
pub struct SharedRssDb {
    inner: Arc<Mutex<RssDb>>,
}

impl SharedRssDb {
    /// Wrap an already opened store.
    pub fn new(store: RssDb) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Open the store on the blocking pool.
    pub async fn open(config: RssDbConfig) -> RssResult<Self> {
        let store = tokio::task::spawn_blocking(move || RssDb::open(config)).await??;
        Ok(Self::new(store))
    }

    /// Run `f` against the store on the blocking pool.
    ///
    /// Every call holds the lock for its full duration, so a closure may
    /// prepare and walk a statement without another caller interleaving.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let count = shared.execute(move |db| db.count_items(feed_id)).await?;
    /// ```
    pub async fn execute<F, T>(&self, f: F) -> RssResult<T>
    where
        F: FnOnce(&mut RssDb) -> RssResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut store = inner
                .lock()
                .map_err(|e| RssError::TaskJoin(format!("mutex poisoned: {e}")))?;
            f(&mut store)
        })
        .await?
    }

    /// Prune every known feed. Returns the total number of items deleted.
    pub async fn prune_all(&self) -> RssResult<usize> {
        self.execute(|db| {
            let ids = db.refresh_feed_ids()?.to_vec();
            let mut deleted = 0;
            for id in ids {
                deleted += db.delete_old_items(id)?;
            }
            debug!(deleted, "all feeds pruned");
            Ok(deleted)
        })
        .await
    }
}

// ── tests ────────────────────────────────────────────────────────────
