use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;

/// Identifies one learning item in one user's deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub user_id: String,
    pub item_id: String,
}

impl ItemKey {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.item_id)
    }
}

/// Scheduling state of a single item for a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    pub mastery_level: u8,
    pub times_seen: u32,
    pub times_correct: u32,
    pub interval_days: f64,
    pub ease_factor: f64,
    pub next_review_at: OffsetDateTime,
    pub is_mastered: bool,
    pub last_seen_at: Option<OffsetDateTime>,
}

impl ReviewState {
    /// State of an item the user has never reviewed. It's due immediately.
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            mastery_level: 0,
            times_seen: 0,
            times_correct: 0,
            interval_days: 1.0,
            ease_factor: MAX_EASE_FACTOR,
            next_review_at: now,
            is_mastered: false,
            last_seen_at: None,
        }
    }

    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        self.next_review_at <= now
    }
}

/// How hard the user says an item felt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            _ => Err(format!("unknown difficulty '{s}', expected easy, medium or hard")),
        }
    }
}

/// The result of one review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub is_correct: bool,
    pub response_time_ms: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

impl Outcome {
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            response_time_ms: None,
            difficulty: None,
        }
    }

    pub fn wrong() -> Self {
        Self {
            is_correct: false,
            ..Self::correct()
        }
    }

    pub fn with_response_time(mut self, ms: u32) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// One entry of an item's answer history.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub is_correct: bool,
    pub quality: u8,
    pub response_time_ms: Option<u32>,
    pub answered_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_due_immediately() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let state = ReviewState::new(now);

        assert!(state.is_due(now));
        assert_eq!(state.mastery_level, 0);
        assert_eq!(state.interval_days, 1.0);
        assert_eq!(state.ease_factor, 2.5);
        assert!(!state.is_mastered);
        assert_eq!(state.last_seen_at, None);
    }

    #[test]
    fn parse_difficulty() {
        assert_eq!("easy".parse(), Ok(Difficulty::Easy));
        assert_eq!("M".parse(), Ok(Difficulty::Medium));
        assert_eq!("hard".parse(), Ok(Difficulty::Hard));
        assert!("trivial".parse::<Difficulty>().is_err());
    }
}
