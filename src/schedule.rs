//! SM-2 style scheduling of vocabulary reviews.
//!
//! Each answer is turned into a recall quality between 0 and 5. Passing answers (quality 3 or
//! more) raise the mastery level and grow the interval, first to 1 day, then 6 days, then by
//! the ease factor. Failing answers drop the mastery level and reset the interval to a day.

use crate::jitter::Jitter;
use crate::jitter::MAX_JITTER;
use crate::jitter::MIN_JITTER;
use crate::state::Difficulty;
use crate::state::MAX_EASE_FACTOR;
use crate::state::MIN_EASE_FACTOR;
use crate::state::Outcome;
use crate::state::ReviewState;
use time::Duration;
use time::OffsetDateTime;
use tracing::debug;

pub const DEFAULT_MAX_LEVEL: u8 = 5;
pub const DEFAULT_MASTERY_THRESHOLD: u8 = 4;

const PASSING_QUALITY: u8 = 3;
const WRONG_ANSWER_EASE_PENALTY: f64 = 0.2;
const FAST_ANSWER_MS: u32 = 3000;
const NORMAL_ANSWER_MS: u32 = 8000;
const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;
// Keeps due dates representable however long an item keeps being answered correctly.
const MAX_INTERVAL_DAYS: f64 = 36_500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    max_level: u8,
    mastery_threshold: u8,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
        }
    }
}

impl Scheduler {
    /// The threshold is capped at `max_level` so that mastery stays reachable.
    pub fn new(max_level: u8, mastery_threshold: u8) -> Self {
        Self {
            max_level,
            mastery_threshold: mastery_threshold.min(max_level),
        }
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn mastery_threshold(&self) -> u8 {
        self.mastery_threshold
    }

    /// Computes the state that follows `previous` after an answer given at `now`.
    pub fn review<J: Jitter + ?Sized>(
        &self,
        previous: &ReviewState,
        outcome: &Outcome,
        now: OffsetDateTime,
        jitter: &mut J,
    ) -> ReviewState {
        let previous = self.clamp(previous);
        let q = quality(outcome);
        let passed = q >= PASSING_QUALITY;

        let (mastery_level, interval_days, ease_factor) = if passed {
            let level = previous.mastery_level.saturating_add(1).min(self.max_level);

            // Keyed on the level before this answer so that the interval keeps compounding
            // once the level saturates at `max_level`.
            let interval = match previous.mastery_level {
                0 => 1.0,
                1 => 6.0,
                _ => (previous.interval_days * previous.ease_factor).round(),
            };

            let q = f64::from(q);
            let ease = previous.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));

            (level, interval.clamp(1.0, MAX_INTERVAL_DAYS), clamp_ease(ease))
        } else {
            (
                previous.mastery_level.saturating_sub(1),
                1.0,
                clamp_ease(previous.ease_factor - WRONG_ANSWER_EASE_PENALTY),
            )
        };

        let factor = jitter.factor().clamp(MIN_JITTER, MAX_JITTER);
        let next_review_at = now + Duration::seconds_f64(interval_days * factor * SECONDS_PER_DAY);

        debug!(
            quality = q,
            passed,
            mastery_level,
            interval_days,
            ease_factor,
            jitter = factor,
            "scheduled next review"
        );

        ReviewState {
            mastery_level,
            times_seen: previous.times_seen.saturating_add(1),
            times_correct: previous
                .times_correct
                .saturating_add(u32::from(outcome.is_correct)),
            interval_days,
            ease_factor,
            next_review_at,
            is_mastered: mastery_level >= self.mastery_threshold,
            last_seen_at: Some(now),
        }
    }

    /// Brings a stored state back into the valid range. Stored rows can drift when the
    /// configuration changes or a row was edited by hand.
    pub fn clamp(&self, state: &ReviewState) -> ReviewState {
        let mastery_level = state.mastery_level.min(self.max_level);

        let interval_days = if state.interval_days.is_finite() && state.interval_days >= 1.0 {
            state.interval_days.min(MAX_INTERVAL_DAYS)
        } else {
            1.0
        };

        ReviewState {
            mastery_level,
            times_seen: state.times_seen,
            times_correct: state.times_correct.min(state.times_seen),
            interval_days,
            ease_factor: clamp_ease(state.ease_factor),
            next_review_at: state.next_review_at,
            is_mastered: mastery_level >= self.mastery_threshold,
            last_seen_at: state.last_seen_at,
        }
    }
}

/// Maps an answer onto the 0-5 recall quality scale.
pub fn quality(outcome: &Outcome) -> u8 {
    let mut q: u8 = if !outcome.is_correct {
        1
    } else {
        match outcome.response_time_ms {
            None => 4,
            Some(ms) if ms < FAST_ANSWER_MS => 5,
            Some(ms) if ms < NORMAL_ANSWER_MS => 4,
            Some(_) => 3,
        }
    };

    match outcome.difficulty {
        Some(Difficulty::Easy) if outcome.is_correct => q = (q + 1).min(5),
        Some(Difficulty::Hard) => q = q.saturating_sub(1).max(1),
        _ => {}
    }

    q
}

fn clamp_ease(ease: f64) -> f64 {
    if ease.is_nan() {
        MAX_EASE_FACTOR
    } else {
        ease.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
    }
}
