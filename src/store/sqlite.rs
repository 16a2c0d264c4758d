use super::DueQuery;
use super::ProgressStore;
use super::StoreError;
use super::Stored;
use super::Version;
use crate::state::Answer;
use crate::state::ItemKey;
use crate::state::ReviewState;
use crate::stats::ProgressStats;
use crate::timestamp::from_millis;
use crate::timestamp::to_millis;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::config::DbConfig;
use rusqlite::named_params;
use rusqlite::params;
use std::path::Path;
use time::Duration;
use time::OffsetDateTime;
use tracing::info;

const ACCURACY_WINDOW_DAYS: i64 = 30;

const STATE_COLUMNS: &str = "masteryLevel, timesSeen, timesCorrect, intervalDays, easeFactor, \
    nextReviewTimestamp, isMastered, lastSeenTimestamp";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::with_connection(Connection::open_in_memory()?)?;
        store.init()?;

        Ok(store)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;

        Ok(Self { conn })
    }

    /// Creates the tables if they don't exist yet.
    pub fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("../schema.sql"))?;

        info!("initialized progress schema");

        Ok(())
    }
}

/// A `Progress` row as stored, before timestamps are validated.
///
/// Integer counters are read at full width and saturated into range, so that a hand-edited or
/// corrupted row still loads and is then clamped by the scheduler.
struct ProgressRow {
    mastery_level: i64,
    times_seen: i64,
    times_correct: i64,
    interval_days: f64,
    ease_factor: f64,
    next_review_timestamp: i64,
    is_mastered: bool,
    last_seen_timestamp: Option<i64>,
}

impl ProgressRow {
    /// Reads the [`STATE_COLUMNS`] starting at column `first`.
    fn read(row: &Row, first: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            mastery_level: row.get(first)?,
            times_seen: row.get(first + 1)?,
            times_correct: row.get(first + 2)?,
            interval_days: row.get(first + 3)?,
            ease_factor: row.get(first + 4)?,
            next_review_timestamp: row.get(first + 5)?,
            is_mastered: row.get(first + 6)?,
            last_seen_timestamp: row.get(first + 7)?,
        })
    }

    fn into_state(self) -> Result<ReviewState, StoreError> {
        Ok(ReviewState {
            mastery_level: self.mastery_level.clamp(0, u8::MAX.into()) as u8,
            times_seen: self.times_seen.clamp(0, u32::MAX.into()) as u32,
            times_correct: self.times_correct.clamp(0, u32::MAX.into()) as u32,
            interval_days: self.interval_days,
            ease_factor: self.ease_factor,
            next_review_at: from_millis(self.next_review_timestamp)?,
            is_mastered: self.is_mastered,
            last_seen_at: self.last_seen_timestamp.map(from_millis).transpose()?,
        })
    }
}

impl ProgressStore for SqliteStore {
    fn get(&self, key: &ItemKey) -> Result<Option<Stored>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {STATE_COLUMNS}, version FROM Progress WHERE userId = ? AND itemId = ?"
                ),
                params![key.user_id, key.item_id],
                |row| Ok((ProgressRow::read(row, 0)?, row.get::<_, Version>(8)?)),
            )
            .optional()?;

        match row {
            Some((row, version)) => Ok(Some(Stored {
                state: row.into_state()?,
                version,
            })),
            None => Ok(None),
        }
    }

    fn put(
        &mut self,
        key: &ItemKey,
        state: &ReviewState,
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        let next_review = to_millis(state.next_review_at);
        let last_seen = state.last_seen_at.map(to_millis);

        let changed = match expected {
            None => self.conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO Progress(userId, itemId, {STATE_COLUMNS}, version)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
                ),
                params![
                    key.user_id,
                    key.item_id,
                    state.mastery_level,
                    state.times_seen,
                    state.times_correct,
                    state.interval_days,
                    state.ease_factor,
                    next_review,
                    state.is_mastered,
                    last_seen,
                ],
            )?,
            Some(version) => self.conn.execute(
                "
                UPDATE Progress
                SET masteryLevel = ?, timesSeen = ?, timesCorrect = ?, intervalDays = ?,
                    easeFactor = ?, nextReviewTimestamp = ?, isMastered = ?,
                    lastSeenTimestamp = ?, version = version + 1
                WHERE userId = ? AND itemId = ? AND version = ?
                ",
                params![
                    state.mastery_level,
                    state.times_seen,
                    state.times_correct,
                    state.interval_days,
                    state.ease_factor,
                    next_review,
                    state.is_mastered,
                    last_seen,
                    key.user_id,
                    key.item_id,
                    version,
                ],
            )?,
        };

        if changed == 0 {
            return Err(StoreError::Conflict(key.clone()));
        }

        Ok(expected.map_or(1, |version| version + 1))
    }

    fn query_due(
        &self,
        user_id: &str,
        query: &DueQuery,
    ) -> Result<Vec<(String, ReviewState)>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT itemId, {STATE_COLUMNS}
            FROM Progress
            WHERE userId = ? AND (masteryLevel >= ?) = ? AND nextReviewTimestamp <= ?
            ORDER BY nextReviewTimestamp, itemId
            LIMIT ?
            "
        ))?;

        let iter = stmt.query_map(
            params![
                user_id,
                query.mastery_threshold,
                query.mastered,
                to_millis(query.as_of),
                query.limit
            ],
            |row| Ok((row.get::<_, String>(0)?, ProgressRow::read(row, 1)?)),
        )?;

        let mut due = vec![];
        for row in iter {
            let (item_id, row) = row?;
            due.push((item_id, row.into_state()?));
        }

        Ok(due)
    }

    fn record_answer(&mut self, key: &ItemKey, answer: &Answer) -> Result<(), StoreError> {
        self.conn.execute(
            "
            INSERT INTO Answer(userId, itemId, isCorrect, quality, responseTimeMs, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                key.user_id,
                key.item_id,
                answer.is_correct,
                answer.quality,
                answer.response_time_ms,
                to_millis(answer.answered_at),
            ],
        )?;

        Ok(())
    }

    fn remove(&mut self, key: &ItemKey) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM Answer WHERE userId = ? AND itemId = ?",
            params![key.user_id, key.item_id],
        )?;

        let removed = tx.execute(
            "DELETE FROM Progress WHERE userId = ? AND itemId = ?",
            params![key.user_id, key.item_id],
        )?;

        if removed == 0 {
            return Err(StoreError::NotFound(key.clone()));
        }

        tx.commit()?;

        info!(%key, "removed item progress");

        Ok(())
    }

    fn stats(
        &self,
        user_id: &str,
        now: OffsetDateTime,
        mastery_threshold: u8,
    ) -> Result<ProgressStats, StoreError> {
        let accuracy_since = now - Duration::days(ACCURACY_WINDOW_DAYS);

        Ok(self.conn.query_row(
            "
            SELECT
                (SELECT COUNT(*) FROM Progress WHERE userId = :user) AS total,

                (SELECT COUNT(*) FROM Progress
                WHERE userId = :user AND masteryLevel >= :threshold) AS mastered,

                (SELECT COUNT(*) FROM Progress
                WHERE userId = :user AND masteryLevel < :threshold) AS learning,

                (SELECT COUNT(*) FROM Progress
                WHERE userId = :user AND masteryLevel < :threshold
                    AND nextReviewTimestamp <= :now) AS dueNow,

                (SELECT COUNT(*) FROM Answer
                WHERE userId = :user AND isCorrect = 1 AND timestamp > :since) AS correct,

                (SELECT COUNT(*) FROM Answer
                WHERE userId = :user AND isCorrect = 0 AND timestamp > :since) AS wrong
            ",
            named_params! {
                ":user": user_id,
                ":threshold": mastery_threshold,
                ":now": to_millis(now),
                ":since": to_millis(accuracy_since),
            },
            |row| {
                Ok(ProgressStats {
                    total: row.get(0)?,
                    mastered: row.get(1)?,
                    learning: row.get(2)?,
                    due_now: row.get(3)?,
                    correct: row.get(4)?,
                    wrong: row.get(5)?,
                })
            },
        )?)
    }
}
