use crate::clock::Clock;
use crate::jitter::Jitter;
use crate::schedule::Scheduler;
use crate::schedule::quality;
use crate::state::Answer;
use crate::state::ItemKey;
use crate::state::Outcome;
use crate::state::ReviewState;
use crate::stats::ProgressStats;
use crate::store::DueQuery;
use crate::store::ProgressStore;
use crate::store::StoreError;
use crate::store::Stored;
use tracing::debug;
use tracing::warn;

pub const DEFAULT_PUT_ATTEMPTS: u32 = 3;

/// Records answers against a [`ProgressStore`], rescheduling each item as it is answered.
pub struct Reviewer<S, C, J> {
    store: S,
    scheduler: Scheduler,
    clock: C,
    jitter: J,
    put_attempts: u32,
}

impl<S: ProgressStore, C: Clock, J: Jitter> Reviewer<S, C, J> {
    pub fn new(store: S, scheduler: Scheduler, clock: C, jitter: J) -> Self {
        Self {
            store,
            scheduler,
            clock,
            jitter,
            put_attempts: DEFAULT_PUT_ATTEMPTS,
        }
    }

    /// How many times an answer is recomputed when another writer got there first.
    pub fn with_put_attempts(mut self, attempts: u32) -> Self {
        self.put_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Applies an answer to the item's stored progress and returns the new state. Items seen
    /// for the first time start from [`ReviewState::new`].
    pub fn answer(&mut self, key: &ItemKey, outcome: &Outcome) -> Result<ReviewState, StoreError> {
        let now = self.clock.now();

        for attempt in 1..=self.put_attempts {
            let (previous, expected) = match self.store.get(key)? {
                Some(Stored { state, version }) => (state, Some(version)),
                None => (ReviewState::new(now), None),
            };

            let next = self
                .scheduler
                .review(&previous, outcome, now, &mut self.jitter);

            match self.store.put(key, &next, expected) {
                Ok(version) => {
                    self.store.record_answer(
                        key,
                        &Answer {
                            is_correct: outcome.is_correct,
                            quality: quality(outcome),
                            response_time_ms: outcome.response_time_ms,
                            answered_at: now,
                        },
                    )?;

                    debug!(%key, version, "recorded answer");

                    return Ok(next);
                }
                Err(StoreError::Conflict(_)) if attempt < self.put_attempts => {
                    warn!(%key, attempt, "progress changed during review, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::Conflict(key.clone()))
    }

    pub fn state(&self, key: &ItemKey) -> Result<ReviewState, StoreError> {
        self.store
            .get(key)?
            .map(|stored| stored.state)
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    /// Items due now. `mastered` selects the maintenance queue instead of the learning queue.
    pub fn due(
        &self,
        user_id: &str,
        mastered: bool,
        limit: u32,
    ) -> Result<Vec<(String, ReviewState)>, StoreError> {
        self.store.query_due(
            user_id,
            &DueQuery {
                mastered,
                mastery_threshold: self.scheduler.mastery_threshold(),
                as_of: self.clock.now(),
                limit,
            },
        )
    }

    pub fn remove(&mut self, key: &ItemKey) -> Result<(), StoreError> {
        self.store.remove(key)
    }

    pub fn stats(&self, user_id: &str) -> Result<ProgressStats, StoreError> {
        self.store
            .stats(user_id, self.clock.now(), self.scheduler.mastery_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::jitter::NoJitter;
    use crate::store::SqliteStore;
    use time::Duration;
    use time::OffsetDateTime;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn reviewer<S: ProgressStore>(store: S) -> Reviewer<S, FixedClock, NoJitter> {
        Reviewer::new(store, Scheduler::default(), FixedClock(now()), NoJitter)
    }

    fn key() -> ItemKey {
        ItemKey::new("ana", "ubiquitous")
    }

    /// Lets another session review the item right before each of the first `interfere`
    /// writes.
    struct Interfering {
        inner: SqliteStore,
        interfere: u32,
        puts: u32,
    }

    impl Interfering {
        fn new(interfere: u32) -> Self {
            Self {
                inner: SqliteStore::open_in_memory().unwrap(),
                interfere,
                puts: 0,
            }
        }
    }

    impl ProgressStore for Interfering {
        fn get(&self, key: &ItemKey) -> Result<Option<Stored>, StoreError> {
            self.inner.get(key)
        }

        fn put(
            &mut self,
            key: &ItemKey,
            state: &ReviewState,
            expected: Option<u64>,
        ) -> Result<u64, StoreError> {
            self.puts += 1;

            if self.interfere > 0 {
                self.interfere -= 1;

                let current = self.inner.get(key)?;
                let mut competing = current
                    .as_ref()
                    .map_or_else(|| ReviewState::new(now()), |s| s.state.clone());
                competing.times_seen += 1;

                self.inner
                    .put(key, &competing, current.map(|s| s.version))?;
            }

            self.inner.put(key, state, expected)
        }

        fn query_due(
            &self,
            user_id: &str,
            query: &DueQuery,
        ) -> Result<Vec<(String, ReviewState)>, StoreError> {
            self.inner.query_due(user_id, query)
        }

        fn record_answer(&mut self, key: &ItemKey, answer: &Answer) -> Result<(), StoreError> {
            self.inner.record_answer(key, answer)
        }

        fn remove(&mut self, key: &ItemKey) -> Result<(), StoreError> {
            self.inner.remove(key)
        }

        fn stats(
            &self,
            user_id: &str,
            now: OffsetDateTime,
            mastery_threshold: u8,
        ) -> Result<ProgressStats, StoreError> {
            self.inner.stats(user_id, now, mastery_threshold)
        }
    }

    #[test]
    fn first_answer_creates_progress() {
        let mut reviewer = reviewer(SqliteStore::open_in_memory().unwrap());

        let next = reviewer
            .answer(&key(), &Outcome::correct().with_response_time(2000))
            .unwrap();

        assert_eq!(next.mastery_level, 1);
        assert_eq!(next.times_seen, 1);
        assert_eq!(reviewer.state(&key()).unwrap(), next);

        let stats = reviewer.stats("ana").unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.wrong, 0);
    }

    #[test]
    fn answers_build_on_stored_progress() {
        let mut reviewer = reviewer(SqliteStore::open_in_memory().unwrap());
        let fast = Outcome::correct().with_response_time(1000);

        reviewer.answer(&key(), &fast).unwrap();
        reviewer.answer(&key(), &fast).unwrap();
        let third = reviewer.answer(&key(), &fast).unwrap();

        assert_eq!(third.mastery_level, 3);
        assert_eq!(third.interval_days, 15.0);
        assert_eq!(third.times_seen, 3);
        assert_eq!(third.next_review_at, now() + Duration::days(15));
    }

    #[test]
    fn retries_after_conflict() {
        let mut reviewer = reviewer(Interfering::new(1));

        let next = reviewer.answer(&key(), &Outcome::correct()).unwrap();

        // The competing review is kept, not overwritten
        assert_eq!(next.times_seen, 2);
        assert_eq!(reviewer.store().puts, 2);
        assert_eq!(reviewer.state(&key()).unwrap(), next);
    }

    #[test]
    fn gives_up_after_attempts() {
        let mut reviewer = reviewer(Interfering::new(u32::MAX)).with_put_attempts(4);

        let err = reviewer.answer(&key(), &Outcome::wrong()).unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(reviewer.store().puts, 4);
        assert_eq!(reviewer.stats("ana").unwrap().wrong, 0);
    }

    #[test]
    fn due_uses_clock() {
        let mut reviewer = reviewer(SqliteStore::open_in_memory().unwrap());

        reviewer.answer(&key(), &Outcome::wrong()).unwrap();

        assert!(reviewer.due("ana", false, 10).unwrap().is_empty());

        let later = Reviewer::new(
            reviewer.store,
            Scheduler::default(),
            FixedClock(now() + Duration::days(1)),
            NoJitter,
        );
        let due = later.due("ana", false, 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, "ubiquitous");
        assert!(later.due("ana", true, 10).unwrap().is_empty());
    }

    #[test]
    fn queues_follow_scheduler_threshold() {
        let mut reviewer = reviewer(SqliteStore::open_in_memory().unwrap());
        let fast = Outcome::correct().with_response_time(1000);

        for _ in 0..3 {
            reviewer.answer(&key(), &fast).unwrap();
        }

        let month_later = FixedClock(now() + Duration::days(30));
        let strict = Reviewer::new(reviewer.store, Scheduler::default(), month_later, NoJitter);
        assert_eq!(strict.due("ana", false, 10).unwrap().len(), 1);
        assert!(strict.due("ana", true, 10).unwrap().is_empty());
        assert_eq!(strict.stats("ana").unwrap().mastered, 0);

        let lenient = Reviewer::new(strict.store, Scheduler::new(5, 3), month_later, NoJitter);
        assert!(lenient.due("ana", false, 10).unwrap().is_empty());
        assert_eq!(lenient.due("ana", true, 10).unwrap().len(), 1);
        assert_eq!(lenient.stats("ana").unwrap().mastered, 1);
    }

    #[test]
    fn unknown_item() {
        let mut reviewer = reviewer(SqliteStore::open_in_memory().unwrap());

        assert!(matches!(
            reviewer.state(&key()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            reviewer.remove(&key()),
            Err(StoreError::NotFound(_))
        ));
    }
}
