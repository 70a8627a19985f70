//! Error types for the rssdb crate.

use bwdb::{DbError, RowId};
use thiserror::Error;

/// Alias for `Result<T, RssError>`.
pub type RssResult<T> = Result<T, RssError>;

/// Errors raised by the feed/item store.
#[derive(Debug, Error)]
pub enum RssError {
    /// The access layer failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The configuration could not be loaded or is invalid.
    #[error("config error: {reason}")]
    Config { reason: String },

    /// An item was added without an integer `feed_id`.
    #[error("item has no integer feed_id")]
    MissingFeedReference,

    /// An item referenced a feed that is not in the feeds table.
    #[error("feed {feed_id} does not exist")]
    UnknownFeed { feed_id: RowId },

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for RssError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
