//! Durable per-user, per-item review progress.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::state::Answer;
use crate::state::ItemKey;
use crate::state::ReviewState;
use crate::stats::ProgressStats;
use thiserror::Error;
use time::OffsetDateTime;

/// Incremented on every successful write of an item's progress.
pub type Version = u64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress for {0} was changed by another writer")]
    Conflict(ItemKey),

    #[error("no progress recorded for {0}")]
    NotFound(ItemKey),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid timestamp in stored progress: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
}

/// A state as it was read, with the version a subsequent write must match.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored {
    pub state: ReviewState,
    pub version: Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueQuery {
    /// Selects the maintenance queue of already mastered items instead of the learning queue.
    pub mastered: bool,
    /// Items at or above this mastery level belong to the maintenance queue.
    pub mastery_threshold: u8,
    pub as_of: OffsetDateTime,
    pub limit: u32,
}

pub trait ProgressStore {
    /// Returns `None` when the user has never reviewed the item.
    fn get(&self, key: &ItemKey) -> Result<Option<Stored>, StoreError>;

    /// Writes `state` if the stored version still equals `expected`, where `None` expects no
    /// row at all. Returns the new version, or [`StoreError::Conflict`] when someone else
    /// wrote in between.
    fn put(
        &mut self,
        key: &ItemKey,
        state: &ReviewState,
        expected: Option<Version>,
    ) -> Result<Version, StoreError>;

    /// Items due at `query.as_of`, most overdue first.
    fn query_due(
        &self,
        user_id: &str,
        query: &DueQuery,
    ) -> Result<Vec<(String, ReviewState)>, StoreError>;

    fn record_answer(&mut self, key: &ItemKey, answer: &Answer) -> Result<(), StoreError>;

    /// Forgets an item's progress and answer history.
    fn remove(&mut self, key: &ItemKey) -> Result<(), StoreError>;

    /// Counts items as mastered when their level is at least `mastery_threshold`.
    fn stats(
        &self,
        user_id: &str,
        now: OffsetDateTime,
        mastery_threshold: u8,
    ) -> Result<ProgressStats, StoreError>;
}
